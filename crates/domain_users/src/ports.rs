//! User Domain Ports
//!
//! [`UserPort`] stores accounts; [`TokenBlacklistPort`] remembers refresh
//! tokens revoked on logout. Both are implemented by `infra_db` for
//! PostgreSQL and by the in-memory adapters below for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{DomainPort, HealthCheckable, PortError, UserId};

use crate::user::{NewUser, User};

/// Storage operations for user accounts
#[async_trait]
pub trait UserPort: DomainPort + HealthCheckable {
    /// Finds a user by normalized email
    ///
    /// # Returns
    ///
    /// `None` when no account uses the email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError>;

    /// Retrieves a user by id, or `PortError::NotFound`
    async fn get_user(&self, id: UserId) -> Result<User, PortError>;

    /// Inserts a user
    ///
    /// A duplicate email is reported as `PortError::Conflict`.
    async fn insert_user(&self, user: NewUser) -> Result<User, PortError>;
}

/// Storage for revoked refresh tokens
#[async_trait]
pub trait TokenBlacklistPort: DomainPort {
    /// Revokes a token id until it expires; revoking twice is not an error
    ///
    /// # Arguments
    ///
    /// * `jti` - The `jti` claim of the refresh token
    /// * `expires_at` - When the token expires, after which the entry may be purged
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), PortError>;

    /// Returns true if the token id was revoked
    async fn is_revoked(&self, jti: &str) -> Result<bool, PortError>;

    /// Forgets revocations whose token has expired anyway
    ///
    /// # Returns
    ///
    /// The number of entries removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, PortError>;
}

/// In-memory implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    /// In-memory mock implementation of UserPort
    #[derive(Debug, Clone, Default)]
    pub struct MockUserPort {
        users: Arc<RwLock<HashMap<UserId, User>>>,
    }

    impl MockUserPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Activates or deactivates a stored user
        pub async fn set_active(&self, id: UserId, is_active: bool) {
            if let Some(user) = self.users.write().await.get_mut(&id) {
                user.is_active = is_active;
            }
        }
    }

    impl DomainPort for MockUserPort {}

    #[async_trait]
    impl HealthCheckable for MockUserPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-user-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl UserPort for MockUserPort {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
            Ok(self
                .users
                .read()
                .await
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn insert_user(&self, user: NewUser) -> Result<User, PortError> {
            let mut users = self.users.write().await;
            if users.values().any(|u| u.email == user.email) {
                return Err(PortError::conflict(format!(
                    "user with email {} already exists",
                    user.email
                )));
            }
            let stored = User {
                id: UserId::new(users.len() as i64 + 1),
                email: user.email,
                name: user.name,
                password_hash: user.password_hash,
                registered_at: Utc::now(),
                is_active: user.is_active,
                is_admin: user.is_admin,
            };
            users.insert(stored.id, stored.clone());
            Ok(stored)
        }
    }

    /// In-memory mock implementation of TokenBlacklistPort
    #[derive(Debug, Clone, Default)]
    pub struct MockTokenBlacklist {
        revoked: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    }

    impl MockTokenBlacklist {
        /// Creates an empty blacklist
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockTokenBlacklist {}

    #[async_trait]
    impl TokenBlacklistPort for MockTokenBlacklist {
        async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), PortError> {
            self.revoked
                .write()
                .await
                .insert(jti.to_string(), expires_at);
            Ok(())
        }

        async fn is_revoked(&self, jti: &str) -> Result<bool, PortError> {
            Ok(self.revoked.read().await.contains_key(jti))
        }

        async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, PortError> {
            let mut revoked = self.revoked.write().await;
            let before = revoked.len();
            revoked.retain(|_, expires_at| *expires_at > now);
            Ok((before - revoked.len()) as u64)
        }
    }
}
