use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnstile_api::{app, AppState};
use turnstile_store::{DbClient, StoreAttendeeRepository, StoreEventRepository};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnstile_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = turnstile_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Turnstile API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let state = AppState::new(
        Arc::new(StoreEventRepository::new(db.pool.clone())),
        Arc::new(StoreAttendeeRepository::new(db.pool.clone())),
        config.checkin.base_url.clone(),
    );

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
