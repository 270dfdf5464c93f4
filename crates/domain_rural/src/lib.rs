//! Rural Producer Domain
//!
//! This crate holds the business rules for rural producers, the farm each
//! producer owns and the crops planted on it.
//!
//! # Identity Rule
//!
//! A producer is either a natural person identified by a CPF or a company
//! identified by a CNPJ, never both and never neither. Both identifiers are
//! checksum-validated and unique across producers.
//!
//! # Area Invariant
//!
//! The arable and vegetation areas of a farm may not add up to more than its
//! total area. On partial updates the invariant is checked against the merged
//! view of submitted and stored values.
//!
//! # Examples
//!
//! ```rust
//! use domain_rural::farm::exceeds_total;
//! use domain_rural::tax_id::{validate_individual_id, validate_company_id};
//! use rust_decimal::Decimal;
//!
//! assert!(validate_individual_id("123.456.789-09").is_ok());
//! assert!(validate_company_id("40.993.392/0001-51").is_ok());
//! assert!(!exceeds_total(Decimal::from(80), Decimal::from(20), Decimal::from(100)));
//! ```

pub mod tax_id;
pub mod location;
pub mod crop;
pub mod farm;
pub mod producer;
pub mod error;
pub mod request;
pub mod merge;
pub mod statistics;
pub mod ports;
pub mod services;

pub use tax_id::{TaxIdError, TaxIdKind};
pub use location::{City, State};
pub use crop::Crop;
pub use farm::{Farm, FarmAreas, FarmField, NewFarm};
pub use producer::{NewProducer, Producer, ProducerField};
pub use error::{ErrorLocation, RuralError, ValidationError, ValidationErrors};
pub use request::{FarmInput, ProducerInput, WriteMode};
pub use merge::{ChangeSet, FarmChanges, ProducerChanges};
pub use statistics::{FarmStatistics, NamedCount};
pub use ports::ProducerPort;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockProducerPort;
pub use services::ProducerService;
