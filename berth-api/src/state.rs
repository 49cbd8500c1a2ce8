use std::sync::Arc;

use berth_booking::{InMemoryFleet, InMemoryLedger, Reports, RetryPolicy, SeatAllocator, SequenceIdGenerator};
use berth_core::FleetAdmin;
use berth_store::app_config::BookingRules;
use berth_store::{DbClient, PostgresFleetRepository, PostgresReservationIds, PostgresReservationLedger};

#[derive(Clone)]
pub struct AppState {
    pub allocator: SeatAllocator,
    pub reports: Reports,
    pub fleet: Arc<dyn FleetAdmin>,
}

impl AppState {
    /// Process-local fleet and ledger; everything is lost on shutdown.
    pub fn in_memory(rules: &BookingRules) -> Self {
        let fleet = Arc::new(InMemoryFleet::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let ids = Arc::new(SequenceIdGenerator::new());

        let mut allocator = SeatAllocator::new(fleet.clone(), fleet.clone(), ledger.clone(), ids)
            .with_retry_policy(retry_policy(rules));
        if rules.verify_customers {
            allocator = allocator.with_customer_directory(fleet.clone());
        }

        Self {
            allocator,
            reports: Reports::new(fleet.clone(), fleet.clone(), ledger, fleet.clone()),
            fleet,
        }
    }

    pub fn postgres(db: &DbClient, rules: &BookingRules) -> Self {
        let fleet = Arc::new(PostgresFleetRepository::new(db.pool.clone()));
        let ledger = Arc::new(PostgresReservationLedger::new(db.pool.clone()));
        let ids = Arc::new(PostgresReservationIds::new(db.pool.clone()));

        let mut allocator = SeatAllocator::new(fleet.clone(), fleet.clone(), ledger.clone(), ids)
            .with_retry_policy(retry_policy(rules));
        if rules.verify_customers {
            allocator = allocator.with_customer_directory(fleet.clone());
        }

        Self {
            allocator,
            reports: Reports::new(fleet.clone(), fleet.clone(), ledger, fleet.clone()),
            fleet,
        }
    }
}

pub fn retry_policy(rules: &BookingRules) -> RetryPolicy {
    RetryPolicy::new(rules.max_retries, rules.initial_backoff(), rules.max_backoff())
}
