use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::post,
    Router,
};
use berth_core::{Captain, Cruise, Customer, Repair, Ship};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Fleet registration
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/ships", post(add_ship))
        .route("/v1/captains", post(add_captain))
        .route("/v1/cruises", post(add_cruise))
        .route("/v1/customers", post(add_customer))
        .route("/v1/repairs", post(add_repair))
}

async fn add_ship(
    State(state): State<AppState>,
    Json(ship): Json<Ship>,
) -> Result<(StatusCode, Json<Ship>), AppError> {
    state.fleet.add_ship(&ship).await?;
    Ok((StatusCode::CREATED, Json(ship)))
}

async fn add_captain(
    State(state): State<AppState>,
    Json(captain): Json<Captain>,
) -> Result<(StatusCode, Json<Captain>), AppError> {
    state.fleet.add_captain(&captain).await?;
    Ok((StatusCode::CREATED, Json(captain)))
}

async fn add_cruise(
    State(state): State<AppState>,
    Json(cruise): Json<Cruise>,
) -> Result<(StatusCode, Json<Cruise>), AppError> {
    if cruise.arrival_date < cruise.departure_date {
        return Err(AppError::ValidationError(format!(
            "cruise {} arrives before it departs",
            cruise.number
        )));
    }
    state.fleet.add_cruise(&cruise).await?;
    Ok((StatusCode::CREATED, Json(cruise)))
}

async fn add_customer(
    State(state): State<AppState>,
    Json(customer): Json<Customer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    state.fleet.add_customer(&customer).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn add_repair(
    State(state): State<AppState>,
    Json(repair): Json<Repair>,
) -> Result<(StatusCode, Json<Repair>), AppError> {
    state.fleet.add_repair(&repair).await?;
    Ok((StatusCode::CREATED, Json(repair)))
}
