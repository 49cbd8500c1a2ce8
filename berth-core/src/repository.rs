use async_trait::async_trait;

use crate::error::{AdminError, CancelError, RegistryError, StorageError};
use crate::models::{
    Captain, Cruise, CruiseNumber, Customer, CustomerId, Repair, Reservation, ReservationId,
    ReservationStatus, Ship, ShipId, ShipRepairCount,
};

/// Read-only ship lookups
#[async_trait]
pub trait ShipRegistry: Send + Sync {
    async fn seat_capacity(&self, ship_id: ShipId) -> Result<u32, RegistryError>;
}

/// Read-only cruise lookups
#[async_trait]
pub trait CruiseRegistry: Send + Sync {
    async fn ship_of(&self, cruise_number: CruiseNumber) -> Result<ShipId, RegistryError>;
}

/// Optional customer validation hook used by the allocator
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn exists(&self, customer_id: CustomerId) -> Result<bool, StorageError>;
}

/// Source of per-ship repair totals. Ordering of the result is unspecified.
#[async_trait]
pub trait RepairLog: Send + Sync {
    async fn repair_counts(&self) -> Result<Vec<ShipRepairCount>, StorageError>;
}

/// Unique reservation id source
#[async_trait]
pub trait ReservationIdGenerator: Send + Sync {
    async fn next_id(&self) -> Result<ReservationId, StorageError>;
}

/// Append-only reservation store.
///
/// Every `append` is atomic on its own. Deciding *which* status to append is the
/// allocator's job; the ledger never rewrites a row except through `cancel`.
#[async_trait]
pub trait ReservationLedger: Send + Sync {
    async fn append(&self, reservation: &Reservation) -> Result<(), StorageError>;

    async fn find(&self, reservation_id: ReservationId) -> Result<Option<Reservation>, StorageError>;

    async fn count_confirmed(&self, cruise_number: CruiseNumber) -> Result<u32, StorageError>;

    async fn count_by_status(
        &self,
        cruise_number: CruiseNumber,
        status: ReservationStatus,
    ) -> Result<u64, StorageError>;

    /// Reservations for a cruise in insertion order.
    async fn list_by_cruise(
        &self,
        cruise_number: CruiseNumber,
    ) -> Result<Vec<Reservation>, StorageError>;

    async fn cancel(&self, reservation_id: ReservationId) -> Result<Reservation, CancelError>;
}

/// Registration of fleet records
#[async_trait]
pub trait FleetAdmin: Send + Sync {
    async fn add_ship(&self, ship: &Ship) -> Result<(), AdminError>;

    async fn add_captain(&self, captain: &Captain) -> Result<(), AdminError>;

    async fn add_cruise(&self, cruise: &Cruise) -> Result<(), AdminError>;

    async fn add_customer(&self, customer: &Customer) -> Result<(), AdminError>;

    async fn add_repair(&self, repair: &Repair) -> Result<(), AdminError>;
}
