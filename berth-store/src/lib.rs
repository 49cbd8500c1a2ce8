pub mod app_config;
pub mod database;
pub mod fleet_repo;
pub mod reservation_repo;

pub use database::DbClient;
pub use fleet_repo::PostgresFleetRepository;
pub use reservation_repo::{PostgresReservationIds, PostgresReservationLedger};
