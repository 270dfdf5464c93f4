//! User domain errors

use thiserror::Error;

use core_kernel::{PortError, UserId};

/// Errors returned by the user services
#[derive(Debug, Error)]
pub enum UserError {
    #[error("E-mail é obrigatório")]
    EmailRequired,

    #[error("Invalid e-mail address: {0}")]
    InvalidEmail(String),

    #[error("A user with e-mail {0} already exists")]
    EmailTaken(String),

    #[error("Superuser must have is_admin=true")]
    SuperuserNotAdmin,

    /// Unknown email, wrong password or inactive account
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    NotFound(UserId),

    #[error("User is inactive: {0}")]
    Inactive(UserId),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage error: {0}")]
    Storage(#[source] PortError),
}

impl From<PortError> for UserError {
    fn from(error: PortError) -> Self {
        UserError::Storage(error)
    }
}

impl From<bcrypt::BcryptError> for UserError {
    fn from(error: bcrypt::BcryptError) -> Self {
        UserError::Hashing(error.to_string())
    }
}
