use async_trait::async_trait;
use sqlx::PgPool;

use berth_core::{
    AdminError, Captain, Cruise, CruiseNumber, CruiseRegistry, Customer, CustomerDirectory,
    CustomerId, FleetAdmin, RegistryError, Repair, RepairLog, Ship, ShipId, ShipRegistry,
    ShipRepairCount, StorageError,
};

use crate::database::{storage_error, violation, FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION};

/// Ship, captain, cruise, customer and repair tables.
pub struct PostgresFleetRepository {
    pool: PgPool,
}

impl PostgresFleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RepairCountRow {
    ship_id: i32,
    repair_count: i64,
}

/// Map an insert failure onto the registration error taxonomy.
fn admin_error(err: sqlx::Error, kind: &'static str, id: i64, refs: &[(&str, i32)]) -> AdminError {
    match violation(&err) {
        Some((code, _)) if code == UNIQUE_VIOLATION => AdminError::Duplicate { kind, id },
        Some((code, constraint)) if code == FOREIGN_KEY_VIOLATION => {
            let constraint = constraint.unwrap_or_default();
            let captain_ref = refs.iter().find(|(name, _)| *name == "captain_id");
            let ship_ref = refs.iter().find(|(name, _)| *name == "ship_id");
            match (captain_ref, ship_ref) {
                (Some((_, captain_id)), _) if constraint.contains("captain") => {
                    AdminError::UnknownCaptain(*captain_id)
                }
                (_, Some((_, ship_id))) => AdminError::UnknownShip(*ship_id),
                _ => AdminError::Storage(storage_error(err)),
            }
        }
        _ => AdminError::Storage(storage_error(err)),
    }
}

#[async_trait]
impl ShipRegistry for PostgresFleetRepository {
    async fn seat_capacity(&self, ship_id: ShipId) -> Result<u32, RegistryError> {
        let seats: Option<i32> = sqlx::query_scalar("SELECT seats FROM ship WHERE id = $1")
            .bind(ship_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        let seats = seats.ok_or(RegistryError::UnknownShip(ship_id))?;
        u32::try_from(seats).map_err(|_| {
            StorageError::Backend(format!("ship {} has negative capacity {}", ship_id, seats)).into()
        })
    }
}

#[async_trait]
impl CruiseRegistry for PostgresFleetRepository {
    async fn ship_of(&self, cruise_number: CruiseNumber) -> Result<ShipId, RegistryError> {
        let ship_id: Option<i32> = sqlx::query_scalar("SELECT ship_id FROM cruise WHERE cnum = $1")
            .bind(cruise_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        ship_id.ok_or(RegistryError::UnknownCruise(cruise_number))
    }
}

#[async_trait]
impl CustomerDirectory for PostgresFleetRepository {
    async fn exists(&self, customer_id: CustomerId) -> Result<bool, StorageError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM customer WHERE id = $1)")
            .bind(customer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }
}

#[async_trait]
impl RepairLog for PostgresFleetRepository {
    async fn repair_counts(&self) -> Result<Vec<ShipRepairCount>, StorageError> {
        let rows: Vec<RepairCountRow> = sqlx::query_as(
            r#"
            SELECT ship_id, COUNT(rid) AS repair_count
            FROM repairs
            GROUP BY ship_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ShipRepairCount {
                ship_id: row.ship_id,
                repair_count: row.repair_count.max(0) as u64,
            })
            .collect())
    }
}

#[async_trait]
impl FleetAdmin for PostgresFleetRepository {
    async fn add_ship(&self, ship: &Ship) -> Result<(), AdminError> {
        let seats = i32::try_from(ship.seat_capacity)
            .map_err(|_| AdminError::Validation(format!("seat capacity too large: {}", ship.seat_capacity)))?;
        if ship.age < 0 {
            return Err(AdminError::Validation(format!("ship age must not be negative: {}", ship.age)));
        }

        sqlx::query("INSERT INTO ship (id, make, model, age, seats) VALUES ($1, $2, $3, $4, $5)")
            .bind(ship.id)
            .bind(&ship.make)
            .bind(&ship.model)
            .bind(ship.age)
            .bind(seats)
            .execute(&self.pool)
            .await
            .map_err(|e| admin_error(e, "Ship", ship.id.into(), &[]))?;

        tracing::info!("Ship registered: {} ({} seats)", ship.id, ship.seat_capacity);
        Ok(())
    }

    async fn add_captain(&self, captain: &Captain) -> Result<(), AdminError> {
        sqlx::query("INSERT INTO captain (id, fullname, nationality) VALUES ($1, $2, $3)")
            .bind(captain.id)
            .bind(&captain.name)
            .bind(&captain.nationality)
            .execute(&self.pool)
            .await
            .map_err(|e| admin_error(e, "Captain", captain.id.into(), &[]))?;

        tracing::info!("Captain registered: {}", captain.id);
        Ok(())
    }

    async fn add_cruise(&self, cruise: &Cruise) -> Result<(), AdminError> {
        if cruise.num_stops < 0 || cruise.ticket_cost_cents < 0 {
            return Err(AdminError::Validation(
                "stops and ticket cost must not be negative".to_string(),
            ));
        }

        let mut refs = vec![("ship_id", cruise.ship_id)];
        if let Some(captain_id) = cruise.captain_id {
            refs.push(("captain_id", captain_id));
        }

        sqlx::query(
            r#"
            INSERT INTO cruise (cnum, ship_id, captain_id, destination, departure_date, departure_time,
                                arrival_date, arrival_time, num_stops, cost_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(cruise.number)
        .bind(cruise.ship_id)
        .bind(cruise.captain_id)
        .bind(&cruise.destination)
        .bind(cruise.departure_date)
        .bind(cruise.departure_time)
        .bind(cruise.arrival_date)
        .bind(cruise.arrival_time)
        .bind(cruise.num_stops)
        .bind(cruise.ticket_cost_cents)
        .execute(&self.pool)
        .await
        .map_err(|e| admin_error(e, "Cruise", cruise.number.into(), &refs))?;

        tracing::info!("Cruise registered: {} on ship {}", cruise.number, cruise.ship_id);
        Ok(())
    }

    async fn add_customer(&self, customer: &Customer) -> Result<(), AdminError> {
        sqlx::query("INSERT INTO customer (id, fname, lname) VALUES ($1, $2, $3)")
            .bind(customer.id)
            .bind(&customer.first_name)
            .bind(&customer.last_name)
            .execute(&self.pool)
            .await
            .map_err(|e| admin_error(e, "Customer", customer.id.into(), &[]))?;

        Ok(())
    }

    async fn add_repair(&self, repair: &Repair) -> Result<(), AdminError> {
        let mut refs = vec![("ship_id", repair.ship_id)];
        if let Some(captain_id) = repair.captain_id {
            refs.push(("captain_id", captain_id));
        }

        sqlx::query(
            "INSERT INTO repairs (rid, repair_date, repair_code, captain_id, ship_id) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(repair.id)
        .bind(repair.repair_date)
        .bind(&repair.repair_code)
        .bind(repair.captain_id)
        .bind(repair.ship_id)
        .execute(&self.pool)
        .await
        .map_err(|e| admin_error(e, "Repair", repair.id.into(), &refs))?;

        Ok(())
    }
}
