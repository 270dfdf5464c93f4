//! Location reference data
//!
//! Farms are located in a city, and every city belongs to a state. States are
//! looked up by their abbreviation (`SP`, `MG`, ...), which is unique.

use serde::{Deserialize, Serialize};

use core_kernel::{CityId, StateId};

/// A Brazilian federative unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
    /// Unique abbreviation, the natural key of a state
    pub code: String,
}

impl State {
    /// Returns the natural key used to look the state up
    pub fn natural_key(&self) -> &str {
        &self.code
    }
}

/// A city, the location granularity of a farm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub state_id: StateId,
}
