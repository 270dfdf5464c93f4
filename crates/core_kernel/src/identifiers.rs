//! Strongly-typed identifiers for domain entities
//!
//! Every persisted entity is keyed by a database-generated 64-bit integer.
//! Wrapping those integers in newtypes prevents handing a city id to a
//! function that expects a crop id.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database key
            pub const fn get(self) -> i64 {
                self.0
            }

            /// Returns the entity name used in log lines and error messages
            pub fn entity() -> &'static str {
                $entity
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Rural domain
define_id!(ProducerId, "Producer");
define_id!(FarmId, "Farm");
define_id!(CropId, "Crop");

// Location reference data
define_id!(StateId, "State");
define_id!(CityId, "City");

// Accounts
define_id!(UserId, "User");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_raw_key() {
        assert_eq!(ProducerId::new(42).to_string(), "42");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: CropId = " 7 ".parse().unwrap();
        assert_eq!(id, CropId::new(7));
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&CityId::new(3)).unwrap();
        assert_eq!(json, "3");

        let back: CityId = serde_json::from_str("3").unwrap();
        assert_eq!(back, CityId::new(3));
    }

    #[test]
    fn test_i64_conversion() {
        let raw: i64 = FarmId::from(11).into();
        assert_eq!(raw, 11);
        assert_eq!(FarmId::entity(), "Farm");
    }
}
