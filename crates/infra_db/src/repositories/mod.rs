//! Repository implementations
//!
//! Repositories own the SQL and map rows to plain row structs. Translation to
//! domain types happens in the adapters.
//!
//! Queries are built with `sqlx::query_as` against `FromRow` structs and are
//! checked at runtime, so the crate builds without a live database.

pub mod producer;
pub mod reference;
pub mod user;
pub mod revoked_token;

pub use producer::ProducerRepository;
pub use reference::ReferenceRepository;
pub use user::UserRepository;
pub use revoked_token::RevokedTokenRepository;
