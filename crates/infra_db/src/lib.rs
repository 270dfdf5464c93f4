//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the rural producers API, using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. Repositories own the SQL and
//! return row structs; adapters implement the domain ports
//! (`ProducerPort`, `UserPort`, `TokenBlacklistPort`) on top of them and
//! translate `DatabaseError` into `PortError`.
//!
//! The schema lives in the workspace `migrations/` directory and is applied
//! by [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresProducerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/rural_producers")).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresProducerAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod migrate;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use migrate::run_migrations;
pub use adapters::{PostgresProducerAdapter, PostgresTokenBlacklist, PostgresUserAdapter};
