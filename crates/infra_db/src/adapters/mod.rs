//! Domain Adapters
//!
//! Adapter implementations for the domain ports, connecting them to the
//! PostgreSQL repositories.
//!
//! Each adapter:
//! - implements its domain's port trait
//! - translates between domain models and row types
//! - converts `DatabaseError` into `PortError`
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresProducerAdapter;
//! use domain_rural::ProducerPort;
//!
//! let adapter = PostgresProducerAdapter::new(pool);
//! let producer = adapter.get_producer(producer_id).await?;
//! ```

pub mod producer;
pub mod user;

pub use producer::PostgresProducerAdapter;
pub use user::{PostgresTokenBlacklist, PostgresUserAdapter};

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` and reports the outcome under the adapter's id
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await;

    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Healthy,
            latency_ms,
            message: None,
            checked_at: Utc::now(),
        },
        Err(e) => HealthCheckResult {
            adapter_id: adapter_id.to_string(),
            status: AdapterHealth::Unhealthy,
            latency_ms,
            message: Some(format!("Database error: {}", e)),
            checked_at: Utc::now(),
        },
    }
}
