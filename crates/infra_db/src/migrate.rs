//! Schema migrations
//!
//! The SQL files under the workspace `migrations/` directory are embedded at
//! compile time and applied in order on startup.

use sqlx::PgPool;
use tracing::info;

use crate::error::DatabaseError;

/// Embedded migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Applies pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseError> {
    info!(count = MIGRATOR.iter().count(), "Running database migrations");
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
