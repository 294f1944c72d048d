use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use salon_bookings::config::AppConfig;
use salon_bookings::handlers;
use salon_bookings::services::BookingService;
use salon_bookings::state::AppState;
use salon_bookings::store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    let catalog = Arc::new(config.load_catalog()?);
    let store = store::open_store(&config).await?;

    let state = Arc::new(AppState {
        bookings: BookingService::new(store, catalog),
        config: config.clone(),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
