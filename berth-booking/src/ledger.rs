use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use berth_core::{
    CancelError, CruiseNumber, Reservation, ReservationId, ReservationIdGenerator,
    ReservationLedger, ReservationStatus, StorageError,
};

#[derive(Default)]
struct LedgerState {
    rows: Vec<Reservation>,
    by_id: HashMap<ReservationId, usize>,
    by_cruise: HashMap<CruiseNumber, CruiseRows>,
}

#[derive(Default)]
struct CruiseRows {
    positions: Vec<usize>,
    confirmed: u32,
}

/// In-memory reservation ledger with an O(1) confirmed-count per cruise.
#[derive(Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across all cruises.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, StorageError> {
        self.state
            .read()
            .map_err(|_| StorageError::Backend("ledger lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, StorageError> {
        self.state
            .write()
            .map_err(|_| StorageError::Backend("ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl ReservationLedger for InMemoryLedger {
    async fn append(&self, reservation: &Reservation) -> Result<(), StorageError> {
        let mut state = self.write()?;

        if state.by_id.contains_key(&reservation.id) {
            return Err(StorageError::DuplicateReservation(reservation.id));
        }

        let position = state.rows.len();
        state.rows.push(reservation.clone());
        state.by_id.insert(reservation.id, position);

        let cruise = state.by_cruise.entry(reservation.cruise_number).or_default();
        cruise.positions.push(position);
        if reservation.status == ReservationStatus::Reserved {
            cruise.confirmed += 1;
        }

        Ok(())
    }

    async fn find(&self, reservation_id: ReservationId) -> Result<Option<Reservation>, StorageError> {
        let state = self.read()?;
        Ok(state.by_id.get(&reservation_id).map(|&pos| state.rows[pos].clone()))
    }

    async fn count_confirmed(&self, cruise_number: CruiseNumber) -> Result<u32, StorageError> {
        let state = self.read()?;
        Ok(state
            .by_cruise
            .get(&cruise_number)
            .map(|c| c.confirmed)
            .unwrap_or(0))
    }

    async fn count_by_status(
        &self,
        cruise_number: CruiseNumber,
        status: ReservationStatus,
    ) -> Result<u64, StorageError> {
        let state = self.read()?;
        let count = state
            .by_cruise
            .get(&cruise_number)
            .map(|c| {
                c.positions
                    .iter()
                    .filter(|&&pos| state.rows[pos].status == status)
                    .count()
            })
            .unwrap_or(0);

        Ok(count as u64)
    }

    async fn list_by_cruise(
        &self,
        cruise_number: CruiseNumber,
    ) -> Result<Vec<Reservation>, StorageError> {
        let state = self.read()?;
        Ok(state
            .by_cruise
            .get(&cruise_number)
            .map(|c| c.positions.iter().map(|&pos| state.rows[pos].clone()).collect())
            .unwrap_or_default())
    }

    async fn cancel(&self, reservation_id: ReservationId) -> Result<Reservation, CancelError> {
        let mut state = self.write()?;

        let position = *state
            .by_id
            .get(&reservation_id)
            .ok_or(CancelError::UnknownReservation(reservation_id))?;

        let current = state.rows[position].status;
        if !current.can_transition_to(ReservationStatus::Cancelled) {
            return Err(CancelError::InvalidTransition {
                from: current,
                to: ReservationStatus::Cancelled,
            });
        }

        let cruise_number = state.rows[position].cruise_number;
        state.rows[position].status = ReservationStatus::Cancelled;
        if current == ReservationStatus::Reserved {
            if let Some(cruise) = state.by_cruise.get_mut(&cruise_number) {
                cruise.confirmed = cruise.confirmed.saturating_sub(1);
            }
        }

        Ok(state.rows[position].clone())
    }
}

/// Monotonic in-process reservation ids.
pub struct SequenceIdGenerator {
    next: AtomicI64,
}

impl SequenceIdGenerator {
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// First id handed out is `last + 1`.
    pub fn starting_after(last: ReservationId) -> Self {
        Self {
            next: AtomicI64::new(last + 1),
        }
    }
}

impl Default for SequenceIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationIdGenerator for SequenceIdGenerator {
    async fn next_id(&self) -> Result<ReservationId, StorageError> {
        Ok(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
