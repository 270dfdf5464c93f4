//! Core Kernel - Foundational types shared by every crate of the rural producers system
//!
//! This crate provides the small set of building blocks used across the domain,
//! infrastructure and interface layers:
//! - Strongly-typed identifiers for persisted entities
//! - The port error type and marker traits of the ports-and-adapters architecture

pub mod identifiers;
pub mod ports;

pub use identifiers::{CityId, CropId, FarmId, ProducerId, StateId, UserId};
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
