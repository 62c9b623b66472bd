use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use turnstile_core::model::Attendee;
use turnstile_core::repository::{AttendeeRepository, RegisterOutcome};

pub struct StoreAttendeeRepository {
    pool: PgPool,
}

impl StoreAttendeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AttendeeRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    email: String,
    scan_token: String,
    checked_in: bool,
    checked_in_at: Option<i64>,
    created_at: i64,
}

impl From<AttendeeRow> for Attendee {
    fn from(row: AttendeeRow) -> Self {
        Attendee {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            email: row.email,
            scan_token: row.scan_token,
            checked_in: row.checked_in,
            checked_in_at: row.checked_in_at,
            created_at: row.created_at,
        }
    }
}

async fn insert_row<'e, E>(executor: E, attendee: &Attendee) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    sqlx::query(
        "INSERT INTO attendees (id, event_id, name, email, scan_token, checked_in, checked_in_at, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(attendee.id)
    .bind(attendee.event_id)
    .bind(&attendee.name)
    .bind(&attendee.email)
    .bind(&attendee.scan_token)
    .bind(attendee.checked_in)
    .bind(attendee.checked_in_at)
    .bind(attendee.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl AttendeeRepository for StoreAttendeeRepository {
    async fn insert(
        &self,
        attendee: &Attendee,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        insert_row(&self.pool, attendee).await?;
        Ok(())
    }

    async fn insert_within_capacity(
        &self,
        attendee: &Attendee,
    ) -> Result<RegisterOutcome, Box<dyn std::error::Error + Send + Sync>> {
        // The row lock on the event serializes concurrent registrations for
        // the same event, so the count below stays valid until commit.
        let mut tx = self.pool.begin().await?;

        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(attendee.event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(capacity) = capacity else {
            return Ok(RegisterOutcome::UnknownEvent);
        };

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendees WHERE event_id = $1")
                .bind(attendee.event_id)
                .fetch_one(&mut *tx)
                .await?;
        if count >= capacity as i64 {
            return Ok(RegisterOutcome::CapacityExceeded);
        }

        insert_row(&mut *tx, attendee).await?;
        tx.commit().await?;
        Ok(RegisterOutcome::Inserted)
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            "SELECT id, event_id, name, email, scan_token, checked_in, checked_in_at, created_at \
             FROM attendees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Attendee::from))
    }

    async fn find_by_scan_token(
        &self,
        token: &str,
    ) -> Result<Option<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, AttendeeRow>(
            "SELECT id, event_id, name, email, scan_token, checked_in, checked_in_at, created_at \
             FROM attendees WHERE scan_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Attendee::from))
    }

    async fn list_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, AttendeeRow>(
            "SELECT id, event_id, name, email, scan_token, checked_in, checked_in_at, created_at \
             FROM attendees WHERE event_id = $1 ORDER BY created_at, id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Attendee::from).collect())
    }

    async fn count_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attendees WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn mark_checked_in(
        &self,
        id: Uuid,
        at: i64,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // Conditional update: only the first scan for an attendee writes a
        // timestamp; later scans affect zero rows.
        let result = sqlx::query(
            "UPDATE attendees SET checked_in = TRUE, checked_in_at = $2 \
             WHERE id = $1 AND checked_in = FALSE",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list(
        &self,
    ) -> Result<Vec<Attendee>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, AttendeeRow>(
            "SELECT id, event_id, name, email, scan_token, checked_in, checked_in_at, created_at \
             FROM attendees ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Attendee::from).collect())
    }
}
