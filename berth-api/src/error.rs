use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use berth_core::{AdminError, AllocationError, ReportError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    UnavailableError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnavailableError(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Storage temporarily unavailable".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::UnknownCruise(_)
            | AllocationError::UnknownShip(_)
            | AllocationError::UnknownCustomer(_)
            | AllocationError::UnknownReservation(_) => AppError::NotFoundError(err.to_string()),
            AllocationError::InvalidTransition { .. } => AppError::ConflictError(err.to_string()),
            AllocationError::StorageFailure { ref source, .. } if source.is_transient() => {
                AppError::UnavailableError(err.to_string())
            }
            AllocationError::StorageFailure { .. } | AllocationError::InvariantViolation { .. } => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UnknownCruise(_) | ReportError::UnknownShip(_) => {
                AppError::NotFoundError(err.to_string())
            }
            ReportError::Storage(ref source) if source.is_transient() => {
                AppError::UnavailableError(err.to_string())
            }
            ReportError::Storage(_) | ReportError::InvariantViolation { .. } => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Duplicate { .. } => AppError::ConflictError(err.to_string()),
            AdminError::UnknownShip(_) | AdminError::UnknownCaptain(_) => {
                AppError::NotFoundError(err.to_string())
            }
            AdminError::Validation(msg) => AppError::ValidationError(msg),
            AdminError::Storage(ref source) if source.is_transient() => {
                AppError::UnavailableError(err.to_string())
            }
            AdminError::Storage(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}
