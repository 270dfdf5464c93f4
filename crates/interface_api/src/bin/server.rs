//! Rural Producers - API Server Binary
//!
//! This binary starts the HTTP API server for rural producer management.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin rural-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin rural-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - Token signing secret (required in production)
//! * `API_ACCESS_TOKEN_TTL_SECS` - Access token lifetime (default: 300)
//! * `API_REFRESH_TOKEN_TTL_SECS` - Refresh token lifetime (default: 86400)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `API_DATABASE_ACQUIRE_TIMEOUT_SECS` - Wait for a pooled connection (default: 30)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_BCRYPT_COST` - bcrypt work factor (default: 12)
//! * `API_ADMIN_EMAIL` / `API_ADMIN_PASSWORD` - Admin account created at startup

use std::net::SocketAddr;

use infra_db::{create_pool, run_migrations};
use interface_api::{config::ApiConfig, create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - A migration fails
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let (config, config_error) = match ApiConfig::from_env() {
        Ok(config) => (config, None),
        Err(e) => (ApiConfig::default(), Some(e)),
    };

    init_tracing(&config.log_level);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Invalid environment configuration, using defaults");
    }

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Rural Producers API Server"
    );

    let pool = create_pool(config.database_config()).await?;
    run_migrations(&pool).await?;

    let state = AppState::postgres(pool, config.clone());
    bootstrap_admin(&state).await?;

    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Creates the configured admin account unless it already exists
async fn bootstrap_admin(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let Some((email, password)) = state.config.admin_credentials() else {
        return Ok(());
    };

    match state.users.ensure_superuser(email, "Admin", password).await? {
        Some(user) => tracing::info!(user_id = %user.id, "Admin account created"),
        None => tracing::debug!("Admin account already present"),
    }
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
