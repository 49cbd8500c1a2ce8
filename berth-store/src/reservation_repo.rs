use async_trait::async_trait;
use sqlx::PgPool;

use berth_core::{
    CancelError, CruiseNumber, Reservation, ReservationId, ReservationIdGenerator,
    ReservationLedger, ReservationStatus, StorageError,
};

use crate::database::{storage_error, violation, UNIQUE_VIOLATION};

/// Reservation ledger on the `reservation` table.
///
/// `append` serializes writers per cruise with a transaction-scoped advisory lock and
/// inserts a `R` row only while the cruise still has a free seat. A writer in another
/// process that filled the last seat first turns the insert into a no-op, reported as
/// `StorageError::Conflict` so the allocator re-decides.
pub struct PostgresReservationLedger {
    pool: PgPool,
}

impl PostgresReservationLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    rnum: i64,
    cid: i32,
    ccid: i32,
    status: String,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StorageError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        Ok(Reservation {
            id: row.rnum,
            cruise_number: row.cid,
            customer_id: row.ccid,
            status: parse_status(&row.status)?,
        })
    }
}

fn parse_status(code: &str) -> Result<ReservationStatus, StorageError> {
    code.parse()
        .map_err(|_| StorageError::Backend(format!("unexpected reservation status '{}'", code)))
}

fn status_code(status: ReservationStatus) -> String {
    status.code().to_string()
}

#[async_trait]
impl ReservationLedger for PostgresReservationLedger {
    async fn append(&self, reservation: &Reservation) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(i64::from(reservation.cruise_number))
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO reservation (rnum, ccid, cid, status)
            SELECT $1, $2, $3, $4
            WHERE $4 <> 'R'
               OR (SELECT COUNT(*) FROM reservation WHERE cid = $3 AND status = 'R')
                  < (SELECT s.seats FROM cruise c JOIN ship s ON s.id = c.ship_id WHERE c.cnum = $3)
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.customer_id)
        .bind(reservation.cruise_number)
        .bind(status_code(reservation.status))
        .execute(&mut *tx)
        .await
        .map_err(|e| match violation(&e) {
            Some((code, _)) if code == UNIQUE_VIOLATION => {
                StorageError::DuplicateReservation(reservation.id)
            }
            _ => storage_error(e),
        })?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await.map_err(storage_error)?;
            tracing::warn!(
                "Reservation {} lost the last seat on cruise {} to another writer",
                reservation.id,
                reservation.cruise_number
            );
            return Err(StorageError::Conflict(reservation.cruise_number));
        }

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn find(&self, reservation_id: ReservationId) -> Result<Option<Reservation>, StorageError> {
        let row: Option<ReservationRow> =
            sqlx::query_as("SELECT rnum, cid, ccid, status FROM reservation WHERE rnum = $1")
                .bind(reservation_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn count_confirmed(&self, cruise_number: CruiseNumber) -> Result<u32, StorageError> {
        let count = self
            .count_by_status(cruise_number, ReservationStatus::Reserved)
            .await?;
        u32::try_from(count)
            .map_err(|_| StorageError::Backend(format!("confirmed count out of range: {}", count)))
    }

    async fn count_by_status(
        &self,
        cruise_number: CruiseNumber,
        status: ReservationStatus,
    ) -> Result<u64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(rnum) FROM reservation WHERE cid = $1 AND status = $2")
                .bind(cruise_number)
                .bind(status_code(status))
                .fetch_one(&self.pool)
                .await
                .map_err(storage_error)?;

        Ok(count.max(0) as u64)
    }

    async fn list_by_cruise(
        &self,
        cruise_number: CruiseNumber,
    ) -> Result<Vec<Reservation>, StorageError> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            "SELECT rnum, cid, ccid, status FROM reservation WHERE cid = $1 ORDER BY position",
        )
        .bind(cruise_number)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn cancel(&self, reservation_id: ReservationId) -> Result<Reservation, CancelError> {
        let updated: Option<ReservationRow> = sqlx::query_as(
            r#"
            UPDATE reservation
            SET status = 'C'
            WHERE rnum = $1 AND status IN ('R', 'W')
            RETURNING rnum, cid, ccid, status
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        if let Some(row) = updated {
            return Ok(Reservation::try_from(row)?);
        }

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM reservation WHERE rnum = $1")
                .bind(reservation_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        match current {
            None => Err(CancelError::UnknownReservation(reservation_id)),
            Some(code) => Err(CancelError::InvalidTransition {
                from: parse_status(&code)?,
                to: ReservationStatus::Cancelled,
            }),
        }
    }
}

/// Reservation ids drawn from `reservation_rnum_seq`.
pub struct PostgresReservationIds {
    pool: PgPool,
}

impl PostgresReservationIds {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationIdGenerator for PostgresReservationIds {
    async fn next_id(&self) -> Result<ReservationId, StorageError> {
        sqlx::query_scalar("SELECT nextval('reservation_rnum_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }
}
