//! User Accounts Domain
//!
//! API clients authenticate with an email and a password. Passwords are
//! stored as bcrypt hashes; refresh tokens revoked on logout are remembered
//! by their `jti` until they expire.

pub mod error;
pub mod password;
pub mod user;
pub mod ports;
pub mod services;

pub use error::UserError;
pub use user::{normalize_email, NewUser, User};
pub use ports::{TokenBlacklistPort, UserPort};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockTokenBlacklist, MockUserPort};
pub use services::UserService;
