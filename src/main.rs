use std::{net::SocketAddr, sync::Arc, time::Duration};

use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing_subscriber::EnvFilter;

use sports_booking_api::{auth_routes, config::AppConfig, create_router, db, AppState};

/// Expired refresh tokens are purged on this interval
const TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Sports Booking API - Starting...");

    if let Err(e) = run().await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    let addr = config.bind_addr();
    let state = AppState::new(pool, config);
    spawn_token_purge(state.clone());

    // Login and registration are limited per client IP
    let governor = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .finish()
            .ok_or("invalid rate limit configuration")?,
    );
    let auth = auth_routes().layer(GovernorLayer { config: governor });
    let app = create_router(state, auth);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Sports Booking API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn spawn_token_purge(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TOKEN_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match state.auth_service.purge_expired_tokens().await {
                Ok(0) => {}
                Ok(count) => tracing::info!("Purged {} expired refresh tokens", count),
                Err(e) => tracing::warn!("Failed to purge expired tokens: {}", e),
            }
        }
    });
}
