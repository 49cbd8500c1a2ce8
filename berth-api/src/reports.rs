use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Router,
};
use berth_core::{CruiseNumber, Reservation, ReservationStatus, ShipRepairCount};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct FreeSeatsResponse {
    pub cruise_number: CruiseNumber,
    pub free_seats: u32,
}

#[derive(Debug, Deserialize)]
pub struct PassengerQuery {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PassengerCountResponse {
    pub cruise_number: CruiseNumber,
    pub status: ReservationStatus,
    pub count: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cruises/{number}/seats", get(free_seats))
        .route("/v1/cruises/{number}/passengers", get(passenger_count))
        .route("/v1/cruises/{number}/waitlist", get(waitlist))
        .route("/v1/reports/repairs", get(repairs_per_ship))
}

async fn free_seats(
    State(state): State<AppState>,
    Path(cruise_number): Path<CruiseNumber>,
) -> Result<Json<FreeSeatsResponse>, AppError> {
    let free_seats = state.reports.free_seats(cruise_number).await?;
    Ok(Json(FreeSeatsResponse { cruise_number, free_seats }))
}

async fn passenger_count(
    State(state): State<AppState>,
    Path(cruise_number): Path<CruiseNumber>,
    Query(query): Query<PassengerQuery>,
) -> Result<Json<PassengerCountResponse>, AppError> {
    let status: ReservationStatus = query
        .status
        .parse()
        .map_err(|_| AppError::ValidationError(format!("unknown reservation status '{}'", query.status)))?;

    let count = state
        .reports
        .passenger_count_by_status(cruise_number, status)
        .await?;

    Ok(Json(PassengerCountResponse { cruise_number, status, count }))
}

async fn waitlist(
    State(state): State<AppState>,
    Path(cruise_number): Path<CruiseNumber>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    Ok(Json(state.reports.waitlist(cruise_number).await?))
}

async fn repairs_per_ship(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShipRepairCount>>, AppError> {
    Ok(Json(state.reports.repairs_per_ship().await?))
}
