mod legacy;
mod pipeline;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use legacy::PgLegacySource;
use turnstile_store::{DbClient, StoreAttendeeRepository, StoreEventRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnstile_migrate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        tracing::error!("Migration failed: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = turnstile_store::Config::load()?;

    tracing::info!("Starting legacy store migration");

    let legacy_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.migration.legacy_database_url)
        .await?;
    let source = PgLegacySource::new(legacy_pool);

    let db = DbClient::new(&config.database.url).await?;
    db.migrate().await?;

    let events = StoreEventRepository::new(db.pool.clone());
    let attendees = StoreAttendeeRepository::new(db.pool.clone());

    let report = pipeline::run(&source, &events, &attendees).await?;

    tracing::info!(
        "Migration completed: {} events, {} attendees",
        report.events,
        report.attendees
    );
    tracing::info!("Keep the legacy database available for rollback for a few days before decommissioning it");
    Ok(())
}
