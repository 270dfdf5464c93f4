//! User account services

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::UserId;

use crate::error::UserError;
use crate::password::{hash_password_async, verify_password_async};
use crate::ports::UserPort;
use crate::user::{normalize_email, NewUser, User};

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Creates and authenticates user accounts
#[derive(Clone)]
pub struct UserService {
    port: Arc<dyn UserPort>,
    bcrypt_cost: u32,
}

impl UserService {
    /// Creates a service using the default bcrypt cost
    pub fn new(port: Arc<dyn UserPort>) -> Self {
        Self {
            port,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Overrides the bcrypt cost; tests use the minimum of 4
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Creates a regular, active account
    ///
    /// # Arguments
    ///
    /// * `email` - Normalized before it is stored
    /// * `name` - Display name
    /// * `password` - Plain password, hashed with bcrypt off the async runtime
    ///
    /// # Errors
    ///
    /// - `UserError::EmailRequired` for a blank email
    /// - `UserError::InvalidEmail` when the address has no local part or domain
    /// - `UserError::EmailTaken` when the email is registered
    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, UserError> {
        self.insert(email, name, password, false).await
    }

    /// Creates an active admin account
    pub async fn create_superuser(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, UserError> {
        let user = self.insert(email, name, password, true).await?;
        if !user.is_admin {
            return Err(UserError::SuperuserNotAdmin);
        }
        Ok(user)
    }

    /// Creates the admin account unless the email is already registered
    ///
    /// Returns `None` when the account existed.
    pub async fn ensure_superuser(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Option<User>, UserError> {
        let normalized = normalize_email(email)?;
        if self.port.find_by_email(&normalized).await?.is_some() {
            return Ok(None);
        }
        self.create_superuser(&normalized, name, password).await.map(Some)
    }

    /// Checks an email and password pair
    ///
    /// Unknown emails, wrong passwords and inactive accounts all fail with
    /// the same [`UserError::InvalidCredentials`].
    ///
    /// # Returns
    ///
    /// The active user owning the credentials
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let email = normalize_email(email).map_err(|_| UserError::InvalidCredentials)?;
        let Some(user) = self.port.find_by_email(&email).await? else {
            warn!("Login attempt for unknown account");
            return Err(UserError::InvalidCredentials);
        };

        let matches = verify_password_async(password.to_string(), user.password_hash.clone()).await;
        if !matches || !user.is_active {
            warn!(user_id = %user.id, "Login rejected");
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Loads a user that may still use the API
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` for an unknown id and
    /// `UserError::Inactive` for a deactivated account
    pub async fn get_active(&self, id: UserId) -> Result<User, UserError> {
        let user = self.port.get_user(id).await.map_err(|e| {
            if e.is_not_found() {
                UserError::NotFound(id)
            } else {
                UserError::Storage(e)
            }
        })?;
        if !user.is_active {
            return Err(UserError::Inactive(id));
        }
        Ok(user)
    }

    async fn insert(
        &self,
        email: &str,
        name: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, UserError> {
        let email = normalize_email(email)?;
        let password_hash = hash_password_async(password.to_string(), self.bcrypt_cost).await?;

        let user = self
            .port
            .insert_user(NewUser {
                email: email.clone(),
                name: name.trim().to_string(),
                password_hash,
                is_active: true,
                is_admin,
            })
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    UserError::EmailTaken(email)
                } else {
                    UserError::Storage(e)
                }
            })?;

        info!(user_id = %user.id, is_admin = user.is_admin, "User created");
        Ok(user)
    }
}
