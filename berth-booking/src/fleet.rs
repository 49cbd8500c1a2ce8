use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use berth_core::{
    AdminError, Captain, CaptainId, Cruise, CruiseNumber, CruiseRegistry, Customer,
    CustomerDirectory, CustomerId, FleetAdmin, RegistryError, Repair, RepairId, RepairLog, Ship,
    ShipId, ShipRegistry, ShipRepairCount, StorageError,
};

#[derive(Default)]
struct FleetState {
    ships: HashMap<ShipId, Ship>,
    captains: HashMap<CaptainId, Captain>,
    cruises: HashMap<CruiseNumber, Cruise>,
    customers: HashMap<CustomerId, Customer>,
    repairs: HashMap<RepairId, Repair>,
}

/// In-memory ship/cruise/customer/repair registry.
///
/// Registered records are never modified, so the allocator may cache lookups freely.
#[derive(Default)]
pub struct InMemoryFleet {
    state: RwLock<FleetState>,
}

impl InMemoryFleet {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, FleetState>, StorageError> {
        self.state
            .read()
            .map_err(|_| StorageError::Backend("fleet lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, FleetState>, StorageError> {
        self.state
            .write()
            .map_err(|_| StorageError::Backend("fleet lock poisoned".to_string()))
    }
}

#[async_trait]
impl ShipRegistry for InMemoryFleet {
    async fn seat_capacity(&self, ship_id: ShipId) -> Result<u32, RegistryError> {
        self.read()?
            .ships
            .get(&ship_id)
            .map(|ship| ship.seat_capacity)
            .ok_or(RegistryError::UnknownShip(ship_id))
    }
}

#[async_trait]
impl CruiseRegistry for InMemoryFleet {
    async fn ship_of(&self, cruise_number: CruiseNumber) -> Result<ShipId, RegistryError> {
        self.read()?
            .cruises
            .get(&cruise_number)
            .map(|cruise| cruise.ship_id)
            .ok_or(RegistryError::UnknownCruise(cruise_number))
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryFleet {
    async fn exists(&self, customer_id: CustomerId) -> Result<bool, StorageError> {
        Ok(self.read()?.customers.contains_key(&customer_id))
    }
}

#[async_trait]
impl RepairLog for InMemoryFleet {
    async fn repair_counts(&self) -> Result<Vec<ShipRepairCount>, StorageError> {
        let state = self.read()?;
        let mut counts: HashMap<ShipId, u64> = HashMap::new();
        for repair in state.repairs.values() {
            *counts.entry(repair.ship_id).or_insert(0) += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(ship_id, repair_count)| ShipRepairCount { ship_id, repair_count })
            .collect())
    }
}

#[async_trait]
impl FleetAdmin for InMemoryFleet {
    async fn add_ship(&self, ship: &Ship) -> Result<(), AdminError> {
        if ship.age < 0 {
            return Err(AdminError::Validation(format!("ship age must not be negative: {}", ship.age)));
        }

        let mut state = self.write()?;
        if state.ships.contains_key(&ship.id) {
            return Err(AdminError::Duplicate { kind: "Ship", id: ship.id.into() });
        }
        state.ships.insert(ship.id, ship.clone());
        tracing::info!("Ship registered: {} ({} seats)", ship.id, ship.seat_capacity);
        Ok(())
    }

    async fn add_captain(&self, captain: &Captain) -> Result<(), AdminError> {
        let mut state = self.write()?;
        if state.captains.contains_key(&captain.id) {
            return Err(AdminError::Duplicate { kind: "Captain", id: captain.id.into() });
        }
        state.captains.insert(captain.id, captain.clone());
        tracing::info!("Captain registered: {}", captain.id);
        Ok(())
    }

    async fn add_cruise(&self, cruise: &Cruise) -> Result<(), AdminError> {
        if cruise.num_stops < 0 || cruise.ticket_cost_cents < 0 {
            return Err(AdminError::Validation(
                "stops and ticket cost must not be negative".to_string(),
            ));
        }

        let mut state = self.write()?;
        if state.cruises.contains_key(&cruise.number) {
            return Err(AdminError::Duplicate { kind: "Cruise", id: cruise.number.into() });
        }
        if !state.ships.contains_key(&cruise.ship_id) {
            return Err(AdminError::UnknownShip(cruise.ship_id));
        }
        if let Some(captain_id) = cruise.captain_id {
            if !state.captains.contains_key(&captain_id) {
                return Err(AdminError::UnknownCaptain(captain_id));
            }
        }
        state.cruises.insert(cruise.number, cruise.clone());
        tracing::info!("Cruise registered: {} on ship {}", cruise.number, cruise.ship_id);
        Ok(())
    }

    async fn add_customer(&self, customer: &Customer) -> Result<(), AdminError> {
        let mut state = self.write()?;
        if state.customers.contains_key(&customer.id) {
            return Err(AdminError::Duplicate { kind: "Customer", id: customer.id.into() });
        }
        state.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn add_repair(&self, repair: &Repair) -> Result<(), AdminError> {
        let mut state = self.write()?;
        if state.repairs.contains_key(&repair.id) {
            return Err(AdminError::Duplicate { kind: "Repair", id: repair.id.into() });
        }
        if !state.ships.contains_key(&repair.ship_id) {
            return Err(AdminError::UnknownShip(repair.ship_id));
        }
        state.repairs.insert(repair.id, repair.clone());
        Ok(())
    }
}
