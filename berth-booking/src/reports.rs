use std::sync::Arc;

use berth_core::{
    CruiseNumber, CruiseRegistry, RepairLog, ReportError, Reservation, ReservationLedger,
    ReservationStatus, ShipRegistry, ShipRepairCount,
};

/// Side-effect-free read projections over the fleet and the reservation ledger.
///
/// None of these take a cruise lock; each reads whatever the ledger has committed.
#[derive(Clone)]
pub struct Reports {
    ships: Arc<dyn ShipRegistry>,
    cruises: Arc<dyn CruiseRegistry>,
    ledger: Arc<dyn ReservationLedger>,
    repairs: Arc<dyn RepairLog>,
}

impl Reports {
    pub fn new(
        ships: Arc<dyn ShipRegistry>,
        cruises: Arc<dyn CruiseRegistry>,
        ledger: Arc<dyn ReservationLedger>,
        repairs: Arc<dyn RepairLog>,
    ) -> Self {
        Self { ships, cruises, ledger, repairs }
    }

    /// Seats still open for confirmed reservations: capacity minus confirmed count.
    pub async fn free_seats(&self, cruise_number: CruiseNumber) -> Result<u32, ReportError> {
        let ship_id = self.cruises.ship_of(cruise_number).await?;
        let capacity = self.ships.seat_capacity(ship_id).await?;
        let confirmed = self.ledger.count_confirmed(cruise_number).await?;

        capacity.checked_sub(confirmed).ok_or_else(|| {
            tracing::error!(
                "Capacity invariant violated on cruise {}: {} confirmed, {} seats",
                cruise_number,
                confirmed,
                capacity
            );
            ReportError::InvariantViolation {
                cruise: cruise_number,
                confirmed,
                capacity,
            }
        })
    }

    /// Ships ranked by repair count, most repaired first; equal counts by ascending ship id.
    pub async fn repairs_per_ship(&self) -> Result<Vec<ShipRepairCount>, ReportError> {
        let mut counts = self.repairs.repair_counts().await?;
        counts.sort_by(|a, b| {
            b.repair_count
                .cmp(&a.repair_count)
                .then(a.ship_id.cmp(&b.ship_id))
        });
        Ok(counts)
    }

    pub async fn passenger_count_by_status(
        &self,
        cruise_number: CruiseNumber,
        status: ReservationStatus,
    ) -> Result<u64, ReportError> {
        self.cruises.ship_of(cruise_number).await?;
        Ok(self.ledger.count_by_status(cruise_number, status).await?)
    }

    /// Waitlisted reservations in the order they were booked.
    pub async fn waitlist(&self, cruise_number: CruiseNumber) -> Result<Vec<Reservation>, ReportError> {
        self.cruises.ship_of(cruise_number).await?;
        Ok(self
            .ledger
            .list_by_cruise(cruise_number)
            .await?
            .into_iter()
            .filter(|r| r.status == ReservationStatus::Waitlisted)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SeatAllocator;
    use crate::fleet::InMemoryFleet;
    use crate::ledger::{InMemoryLedger, SequenceIdGenerator};
    use crate::testing::{cruise, repair, ship};
    use berth_core::FleetAdmin;

    async fn setup(capacity: u32) -> (Arc<InMemoryFleet>, Arc<InMemoryLedger>, SeatAllocator, Reports) {
        let fleet = Arc::new(InMemoryFleet::new());
        fleet.add_ship(&ship(1, capacity)).await.unwrap();
        fleet.add_cruise(&cruise(100, 1)).await.unwrap();

        let ledger = Arc::new(InMemoryLedger::new());
        let allocator = SeatAllocator::new(
            fleet.clone(),
            fleet.clone(),
            ledger.clone(),
            Arc::new(SequenceIdGenerator::new()),
        );
        let reports = Reports::new(fleet.clone(), fleet.clone(), ledger.clone(), fleet.clone());

        (fleet, ledger, allocator, reports)
    }

    #[tokio::test]
    async fn test_free_seats_track_bookings() {
        let (_, ledger, allocator, reports) = setup(3).await;
        assert_eq!(reports.free_seats(100).await.unwrap(), 3);

        for customer in 1..=5 {
            allocator.book(100, customer).await.unwrap();
            let free = reports.free_seats(100).await.unwrap();
            let confirmed = ledger.count_confirmed(100).await.unwrap();
            assert_eq!(free + confirmed, 3);
        }

        assert_eq!(reports.free_seats(100).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_capacity_two_scenario() {
        let (_, _, allocator, reports) = setup(2).await;
        for customer in [1, 2, 3] {
            allocator.book(100, customer).await.unwrap();
        }

        assert_eq!(reports.free_seats(100).await.unwrap(), 0);
        assert_eq!(
            reports.passenger_count_by_status(100, ReservationStatus::Waitlisted).await.unwrap(),
            1
        );
        assert_eq!(
            reports.passenger_count_by_status(100, ReservationStatus::Reserved).await.unwrap(),
            2
        );
        assert_eq!(
            reports.passenger_count_by_status(100, ReservationStatus::Cancelled).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_waitlist_in_booking_order() {
        let (_, _, allocator, reports) = setup(1).await;
        for customer in [7, 3, 5] {
            allocator.book(100, customer).await.unwrap();
        }

        let waitlist: Vec<_> = reports
            .waitlist(100)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.customer_id)
            .collect();
        assert_eq!(waitlist, vec![3, 5]);
    }

    #[tokio::test]
    async fn test_unknown_cruise_reports() {
        let (_, _, _, reports) = setup(1).await;

        assert_eq!(reports.free_seats(5).await.unwrap_err(), ReportError::UnknownCruise(5));
        assert_eq!(
            reports
                .passenger_count_by_status(5, ReservationStatus::Reserved)
                .await
                .unwrap_err(),
            ReportError::UnknownCruise(5)
        );
    }

    #[tokio::test]
    async fn test_overbooked_cruise_is_flagged() {
        let (_, ledger, _, reports) = setup(1).await;
        for id in [1, 2] {
            ledger
                .append(&Reservation {
                    id,
                    cruise_number: 100,
                    customer_id: 1,
                    status: ReservationStatus::Reserved,
                })
                .await
                .unwrap();
        }

        assert_eq!(
            reports.free_seats(100).await.unwrap_err(),
            ReportError::InvariantViolation { cruise: 100, confirmed: 2, capacity: 1 }
        );
    }

    #[tokio::test]
    async fn test_repairs_ranked_with_ship_id_tie_break() {
        let (fleet, _, _, reports) = setup(1).await;
        for id in [9, 4, 6, 2] {
            fleet.add_ship(&ship(id, 10)).await.unwrap();
        }

        // ship 4: 3 repairs, ships 9 and 2: 2 each, ship 6: 1, ship 1: none
        let plan = [(1, 4), (2, 4), (3, 4), (4, 9), (5, 9), (6, 2), (7, 2), (8, 6)];
        for (repair_id, ship_id) in plan {
            fleet.add_repair(&repair(repair_id, ship_id)).await.unwrap();
        }

        let expected = vec![
            ShipRepairCount { ship_id: 4, repair_count: 3 },
            ShipRepairCount { ship_id: 2, repair_count: 2 },
            ShipRepairCount { ship_id: 9, repair_count: 2 },
            ShipRepairCount { ship_id: 6, repair_count: 1 },
        ];
        for _ in 0..5 {
            assert_eq!(reports.repairs_per_ship().await.unwrap(), expected);
        }
    }
}
