use std::sync::Arc;

use berth_core::{
    Allocation, AllocationError, CancelError, CruiseNumber, CruiseRegistry, CustomerDirectory,
    CustomerId, RegistryError, Reservation, ReservationId, ReservationIdGenerator,
    ReservationLedger, ReservationStatus, ShipRegistry, StorageError,
};
use tracing::{error, info};

use crate::locks::CruiseLocks;
use crate::retry::{retry_with_backoff, AttemptError, RetryError, RetryPolicy};

/// Decides and records reserve-or-waitlist for booking requests.
///
/// For each cruise, bookings are serialized by a per-cruise lock held across
/// "count confirmed, decide, append", so the confirmed count can never exceed the
/// ship's seat capacity. Requests for different cruises proceed independently.
#[derive(Clone)]
pub struct SeatAllocator {
    ships: Arc<dyn ShipRegistry>,
    cruises: Arc<dyn CruiseRegistry>,
    ledger: Arc<dyn ReservationLedger>,
    ids: Arc<dyn ReservationIdGenerator>,
    customers: Option<Arc<dyn CustomerDirectory>>,
    locks: Arc<CruiseLocks>,
    retry: RetryPolicy,
}

impl SeatAllocator {
    pub fn new(
        ships: Arc<dyn ShipRegistry>,
        cruises: Arc<dyn CruiseRegistry>,
        ledger: Arc<dyn ReservationLedger>,
        ids: Arc<dyn ReservationIdGenerator>,
    ) -> Self {
        Self {
            ships,
            cruises,
            ledger,
            ids,
            customers: None,
            locks: Arc::new(CruiseLocks::new()),
            retry: RetryPolicy::default(),
        }
    }

    /// Reject bookings for customers the directory does not know. Without a
    /// directory the caller is trusted to have validated the customer.
    pub fn with_customer_directory(mut self, customers: Arc<dyn CustomerDirectory>) -> Self {
        self.customers = Some(customers);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Book a seat on `cruise_number` for `customer_id`.
    ///
    /// Returns `Reserved` while confirmed reservations are below capacity and
    /// `Waitlisted` otherwise. Exactly one ledger row is appended on success and
    /// none on error.
    ///
    /// Dropping the returned future before the cruise lock is acquired has no effect.
    /// Once the lock is held the decision runs to completion on its own task.
    pub async fn book(
        &self,
        cruise_number: CruiseNumber,
        customer_id: CustomerId,
    ) -> Result<Allocation, AllocationError> {
        let capacity = self.capacity_of(cruise_number).await?;
        self.verify_customer(customer_id).await?;

        let guard = self.locks.acquire(cruise_number).await;
        let allocator = self.clone();
        let decision = tokio::spawn(async move {
            let _guard = guard;
            allocator
                .allocate_locked(cruise_number, customer_id, capacity)
                .await
        });

        match decision.await {
            Ok(result) => result,
            Err(e) => {
                error!("Booking task for cruise {} aborted: {}", cruise_number, e);
                Err(AllocationError::StorageFailure {
                    attempts: 1,
                    source: StorageError::Backend(format!("booking task aborted: {}", e)),
                })
            }
        }
    }

    /// Cancel a reserved or waitlisted reservation. Waitlisted reservations are
    /// never promoted as a side effect.
    pub async fn cancel(&self, reservation_id: ReservationId) -> Result<Reservation, AllocationError> {
        let reservation = self.ledger.cancel(reservation_id).await.map_err(|e| match e {
            CancelError::UnknownReservation(id) => AllocationError::UnknownReservation(id),
            CancelError::InvalidTransition { from, to } => {
                AllocationError::InvalidTransition { from, to }
            }
            CancelError::Storage(source) => AllocationError::StorageFailure { attempts: 1, source },
        })?;

        info!(
            "Reservation cancelled: {} on cruise {}",
            reservation.id, reservation.cruise_number
        );
        Ok(reservation)
    }

    async fn allocate_locked(
        &self,
        cruise_number: CruiseNumber,
        customer_id: CustomerId,
        capacity: u32,
    ) -> Result<Allocation, AllocationError> {
        let reservation_id = finish(
            retry_with_backoff(&self.retry, "reservation id", || async {
                self.ids.next_id().await.map_err(AttemptError::Storage)
            })
            .await,
        )?;

        let label = format!("booking on cruise {}", cruise_number);
        let result = retry_with_backoff(&self.retry, &label, || {
            self.attempt(reservation_id, cruise_number, customer_id, capacity)
        })
        .await;

        let reservation = finish(result)?;
        info!(
            "Reservation {} for customer {} on cruise {}: {}",
            reservation.id, customer_id, cruise_number, reservation.status
        );
        Ok(Allocation::from(&reservation))
    }

    /// One read-decide-append pass. Every retry of a request reuses `reservation_id`,
    /// so an append that landed before its reply was lost is found instead of repeated.
    async fn attempt(
        &self,
        reservation_id: ReservationId,
        cruise_number: CruiseNumber,
        customer_id: CustomerId,
        capacity: u32,
    ) -> Result<Reservation, AttemptError<AllocationError>> {
        let confirmed = self.ledger.count_confirmed(cruise_number).await?;

        if confirmed > capacity {
            error!(
                "Capacity invariant violated on cruise {}: {} confirmed, {} seats",
                cruise_number, confirmed, capacity
            );
            return Err(AttemptError::Fatal(AllocationError::InvariantViolation {
                cruise: cruise_number,
                confirmed,
                capacity,
            }));
        }

        let status = if confirmed < capacity {
            ReservationStatus::Reserved
        } else {
            ReservationStatus::Waitlisted
        };

        let reservation = Reservation {
            id: reservation_id,
            cruise_number,
            customer_id,
            status,
        };

        match self.ledger.append(&reservation).await {
            Ok(()) => Ok(reservation),
            Err(StorageError::DuplicateReservation(id)) if id == reservation_id => {
                self.recover_appended(&reservation).await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The row for this request is already in the ledger; report what was stored.
    async fn recover_appended(
        &self,
        attempted: &Reservation,
    ) -> Result<Reservation, AttemptError<AllocationError>> {
        match self.ledger.find(attempted.id).await? {
            Some(stored)
                if stored.cruise_number == attempted.cruise_number
                    && stored.customer_id == attempted.customer_id =>
            {
                info!(
                    "Reservation {} was already recorded as {} on an earlier attempt",
                    stored.id, stored.status
                );
                Ok(stored)
            }
            _ => Err(StorageError::DuplicateReservation(attempted.id).into()),
        }
    }

    async fn capacity_of(&self, cruise_number: CruiseNumber) -> Result<u32, AllocationError> {
        let result = retry_with_backoff(&self.retry, "capacity lookup", || async {
            let ship_id = self.cruises.ship_of(cruise_number).await.map_err(lookup_failure)?;
            self.ships.seat_capacity(ship_id).await.map_err(lookup_failure)
        })
        .await;

        finish(result)
    }

    async fn verify_customer(&self, customer_id: CustomerId) -> Result<(), AllocationError> {
        let Some(directory) = &self.customers else {
            return Ok(());
        };

        let known = finish(
            retry_with_backoff(&self.retry, "customer lookup", || async {
                directory.exists(customer_id).await.map_err(AttemptError::Storage)
            })
            .await,
        )?;

        if known {
            Ok(())
        } else {
            Err(AllocationError::UnknownCustomer(customer_id))
        }
    }

    #[cfg(test)]
    pub(crate) fn locks(&self) -> &CruiseLocks {
        &self.locks
    }
}

fn lookup_failure(err: RegistryError) -> AttemptError<AllocationError> {
    match err {
        RegistryError::Storage(e) => AttemptError::Storage(e),
        other => AttemptError::Fatal(other.into()),
    }
}

fn finish<T>(result: Result<T, RetryError<AllocationError>>) -> Result<T, AllocationError> {
    result.map_err(|e| match e {
        RetryError::Fatal(err) => err,
        RetryError::Exhausted { attempts, last } => {
            error!("Giving up after {} attempt(s): {}", attempts, last);
            AllocationError::StorageFailure { attempts, source: last }
        }
    })
}
