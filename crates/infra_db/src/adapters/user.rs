//! PostgreSQL user and token blacklist adapters

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_users::{NewUser, TokenBlacklistPort, User, UserPort};

use crate::repositories::user::{NewUserRow, UserRow};
use crate::repositories::{RevokedTokenRepository, UserRepository};

/// PostgreSQL-backed implementation of the UserPort trait
#[derive(Debug, Clone)]
pub struct PostgresUserAdapter {
    repository: UserRepository,
    pool: PgPool,
}

impl PostgresUserAdapter {
    /// Creates a new PostgreSQL user adapter
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresUserAdapter {}

#[async_trait]
impl HealthCheckable for PostgresUserAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-user-adapter").await
    }
}

#[async_trait]
impl UserPort for PostgresUserAdapter {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
        Ok(self.repository.find_by_email(email).await?.map(row_to_user))
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: UserId) -> Result<User, PortError> {
        debug!("Fetching user by ID");
        let row = self.repository.get_by_id(id.get()).await.map_err(|e| {
            if e.is_not_found() {
                PortError::not_found("User", id)
            } else {
                e.into()
            }
        })?;
        Ok(row_to_user(row))
    }

    #[instrument(skip(self, user), fields(is_admin = user.is_admin))]
    async fn insert_user(&self, user: NewUser) -> Result<User, PortError> {
        let row = self
            .repository
            .insert(&NewUserRow {
                email: user.email,
                name: user.name,
                password_hash: user.password_hash,
                is_active: user.is_active,
                is_admin: user.is_admin,
            })
            .await?;
        info!(user_id = row.id, "User row inserted");
        Ok(row_to_user(row))
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: UserId::new(row.id),
        email: row.email,
        name: row.name,
        password_hash: row.password_hash,
        registered_at: row.registered_at,
        is_active: row.is_active,
        is_admin: row.is_admin,
    }
}

/// PostgreSQL-backed implementation of the TokenBlacklistPort trait
#[derive(Debug, Clone)]
pub struct PostgresTokenBlacklist {
    repository: RevokedTokenRepository,
}

impl PostgresTokenBlacklist {
    /// Creates a new PostgreSQL token blacklist
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RevokedTokenRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresTokenBlacklist {}

#[async_trait]
impl TokenBlacklistPort for PostgresTokenBlacklist {
    #[instrument(skip(self, jti))]
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), PortError> {
        self.repository.revoke(jti, expires_at).await?;
        debug!(%expires_at, "Refresh token revoked");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, PortError> {
        Ok(self.repository.is_revoked(jti).await?)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, PortError> {
        let purged = self.repository.purge_expired(now).await?;
        if purged > 0 {
            info!(purged, "Expired revocations purged");
        }
        Ok(purged)
    }
}
