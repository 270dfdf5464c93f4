//! API configuration

use std::time::Duration;

use infra_db::DatabaseConfig;
use serde::Deserialize;

/// API configuration
///
/// Every field can be overridden by an `API_`-prefixed environment variable,
/// e.g. `API_PORT=9000` or `API_ACCESS_TOKEN_TTL_SECS=600`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Secret used to sign access and refresh tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Maximum pool size
    pub database_max_connections: u32,
    /// Seconds a request waits for a pooled connection
    pub database_acquire_timeout_secs: u64,
    /// Log level
    pub log_level: String,
    /// bcrypt work factor for new passwords
    pub bcrypt_cost: u32,
    /// Admin account created at startup when both fields are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            access_token_ttl_secs: 300,
            refresh_token_ttl_secs: 86_400,
            database_url: "postgres://localhost/rural_producers".to_string(),
            database_max_connections: 10,
            database_acquire_timeout_secs: 30,
            log_level: "info".to_string(),
            bcrypt_cost: 12,
            admin_email: None,
            admin_password: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings for the producer database
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.database_max_connections)
            .acquire_timeout(Duration::from_secs(self.database_acquire_timeout_secs))
    }

    /// Admin credentials, when both are configured
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) if !email.trim().is_empty() => {
                Some((email.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert_eq!(config.access_token_ttl_secs, 300);
        assert_eq!(config.refresh_token_ttl_secs, 86_400);
        assert!(config.admin_credentials().is_none());
    }

    #[test]
    fn test_database_config_follows_api_settings() {
        let config = ApiConfig {
            database_url: "postgres://db/rural".to_string(),
            database_max_connections: 4,
            database_acquire_timeout_secs: 5,
            ..ApiConfig::default()
        };

        let database = config.database_config();

        assert_eq!(database.url, "postgres://db/rural");
        assert_eq!(database.max_connections, 4);
        assert_eq!(database.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_admin_credentials_need_both_fields() {
        let config = ApiConfig {
            admin_email: Some("admin@exemplo.com".to_string()),
            ..ApiConfig::default()
        };
        assert!(config.admin_credentials().is_none());

        let config = ApiConfig {
            admin_password: Some("secret".to_string()),
            ..config
        };
        assert_eq!(config.admin_credentials(), Some(("admin@exemplo.com", "secret")));
    }
}
