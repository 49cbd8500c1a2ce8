use crate::models::{CaptainId, CruiseNumber, CustomerId, ReservationId, ReservationStatus, ShipId};

/// Failures raised by a storage backend (ledger, registries, id sequence).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Concurrent booking conflict on cruise {0}")]
    Conflict(CruiseNumber),

    #[error("Duplicate reservation id: {0}")]
    DuplicateReservation(ReservationId),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Whether retrying the whole operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_) | StorageError::Conflict(_))
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown ship: {0}")]
    UnknownShip(ShipId),

    #[error("Unknown cruise: {0}")]
    UnknownCruise(CruiseNumber),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Unknown cruise: {0}")]
    UnknownCruise(CruiseNumber),

    #[error("Unknown ship: {0}")]
    UnknownShip(ShipId),

    #[error("Unknown customer: {0}")]
    UnknownCustomer(CustomerId),

    #[error("Unknown reservation: {0}")]
    UnknownReservation(ReservationId),

    #[error("Invalid reservation transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Storage failure after {attempts} attempt(s): {source}")]
    StorageFailure {
        attempts: usize,
        #[source]
        source: StorageError,
    },

    #[error("Capacity invariant violated on cruise {cruise}: {confirmed} confirmed of {capacity} seats")]
    InvariantViolation {
        cruise: CruiseNumber,
        confirmed: u32,
        capacity: u32,
    },
}

impl From<RegistryError> for AllocationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownShip(id) => AllocationError::UnknownShip(id),
            RegistryError::UnknownCruise(number) => AllocationError::UnknownCruise(number),
            RegistryError::Storage(source) => AllocationError::StorageFailure { attempts: 1, source },
        }
    }
}

/// Errors from the ledger's cancellation path.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CancelError {
    #[error("Unknown reservation: {0}")]
    UnknownReservation(ReservationId),

    #[error("Invalid reservation transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("Unknown cruise: {0}")]
    UnknownCruise(CruiseNumber),

    #[error("Unknown ship: {0}")]
    UnknownShip(ShipId),

    #[error("Capacity invariant violated on cruise {cruise}: {confirmed} confirmed of {capacity} seats")]
    InvariantViolation {
        cruise: CruiseNumber,
        confirmed: u32,
        capacity: u32,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<RegistryError> for ReportError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownShip(id) => ReportError::UnknownShip(id),
            RegistryError::UnknownCruise(number) => ReportError::UnknownCruise(number),
            RegistryError::Storage(e) => ReportError::Storage(e),
        }
    }
}

/// Errors from fleet registration.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("{kind} {id} already exists")]
    Duplicate { kind: &'static str, id: i64 },

    #[error("Unknown ship: {0}")]
    UnknownShip(ShipId),

    #[error("Unknown captain: {0}")]
    UnknownCaptain(CaptainId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
