pub mod models;
pub mod error;
pub mod repository;

pub use error::{
    AdminError, AllocationError, CancelError, RegistryError, ReportError, StorageError,
};
pub use models::{
    Allocation, Captain, CaptainId, Cruise, CruiseNumber, Customer, CustomerId, Repair, RepairId,
    Reservation, ReservationId, ReservationStatus, Ship, ShipId, ShipRepairCount,
};
pub use repository::{
    CruiseRegistry, CustomerDirectory, FleetAdmin, RepairLog, ReservationIdGenerator,
    ReservationLedger, ShipRegistry,
};
