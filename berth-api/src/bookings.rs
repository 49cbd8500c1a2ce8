use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{delete, post},
    Router,
};
use berth_core::{CruiseNumber, CustomerId, Reservation, ReservationId, ReservationStatus};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub customer_id: CustomerId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub cruise_number: CruiseNumber,
    pub reservation_id: ReservationId,
    pub status: ReservationStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cruises/{number}/bookings", post(book_seat))
        .route("/v1/reservations/{id}", delete(cancel_reservation))
}

async fn book_seat(
    State(state): State<AppState>,
    Path(cruise_number): Path<CruiseNumber>,
    Json(req): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let allocation = state.allocator.book(cruise_number, req.customer_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            cruise_number,
            reservation_id: allocation.reservation_id,
            status: allocation.status,
        }),
    ))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<ReservationId>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state.allocator.cancel(reservation_id).await?;
    Ok(Json(reservation))
}
