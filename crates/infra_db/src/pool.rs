//! Connection pool for the producer database

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::error::DatabaseError;

/// Pool settings read from the API configuration
///
/// # Example
///
/// ```rust
/// use infra_db::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("postgres://rural:secret@db/rural_producers")
///     .max_connections(20)
///     .acquire_timeout(Duration::from_secs(5));
/// assert_eq!(config.redacted_url(), "postgres://rural:***@db/rural_producers");
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Connection URL with the password masked, safe to log
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((credentials, host)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };
        match credentials.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => self.url.clone(),
        }
    }
}

/// Opens the pool and waits for the first connection
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` when the database cannot be reached
/// within the acquire timeout.
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, DatabaseError> {
    info!(
        url = %config.redacted_url(),
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "Connecting to producer database"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = DatabaseConfig::new("postgres://localhost/rural_producers");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));

        let config = config.max_connections(3).acquire_timeout(Duration::from_secs(2));
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.acquire_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_redacted_url_masks_password_only() {
        let config = DatabaseConfig::new("postgres://rural:p@ss@db:5432/rural_producers");
        assert_eq!(config.redacted_url(), "postgres://rural:***@db:5432/rural_producers");

        let config = DatabaseConfig::new("postgres://rural@db/rural_producers");
        assert_eq!(config.redacted_url(), "postgres://rural@db/rural_producers");

        let config = DatabaseConfig::new("postgres://localhost/rural_producers");
        assert_eq!(config.redacted_url(), "postgres://localhost/rural_producers");
    }
}
