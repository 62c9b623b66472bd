use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Row from the legacy `event-checkin_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyEvent {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

/// Row from the legacy `event-checkin_attendees` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyAttendee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub event_id: String,
    pub qr_code: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Read access to the legacy store. The pipeline never writes to it.
#[async_trait]
pub trait LegacySource: Send + Sync {
    async fn events(
        &self,
    ) -> Result<Vec<LegacyEvent>, Box<dyn std::error::Error + Send + Sync>>;

    async fn attendees(
        &self,
    ) -> Result<Vec<LegacyAttendee>, Box<dyn std::error::Error + Send + Sync>>;
}

pub struct PgLegacySource {
    pool: PgPool,
}

impl PgLegacySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LegacySource for PgLegacySource {
    async fn events(
        &self,
    ) -> Result<Vec<LegacyEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, LegacyEvent>(
            r#"SELECT id, name, date, capacity, created_at
               FROM "event-checkin_events" ORDER BY created_at, id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn attendees(
        &self,
    ) -> Result<Vec<LegacyAttendee>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, LegacyAttendee>(
            r#"SELECT id, name, email, event_id, qr_code, checked_in, checked_in_at, created_at
               FROM "event-checkin_attendees" ORDER BY created_at, id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
