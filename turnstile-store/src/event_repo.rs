use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use turnstile_core::model::Event;
use turnstile_core::repository::EventRepository;

pub struct StoreEventRepository {
    pool: PgPool,
}

impl StoreEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    date: i64,
    capacity: i32,
    created_at: i64,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            name: row.name,
            date: row.date,
            capacity: row.capacity,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl EventRepository for StoreEventRepository {
    async fn insert(
        &self,
        event: &Event,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            "INSERT INTO events (id, name, date, capacity, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(event.date)
        .bind(event.capacity)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Event>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, name, date, capacity, created_at FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Event::from))
    }

    async fn list(
        &self,
    ) -> Result<Vec<Event>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, name, date, capacity, created_at FROM events ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }
}
