//! User entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::UserId;

use crate::error::UserError;

/// An API account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_admin: bool,
}

impl User {
    /// Admins are staff
    pub fn is_staff(&self) -> bool {
        self.is_admin
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Data for inserting a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
}

/// Normalizes an email address by lowercasing its domain part
///
/// The local part is kept as given. An empty address is rejected.
pub fn normalize_email(raw: &str) -> Result<String, UserError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(UserError::EmailRequired);
    }
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(format!("{}@{}", local, domain.to_lowercase()))
        }
        _ => Err(UserError::InvalidEmail(email.to_string())),
    }
}
