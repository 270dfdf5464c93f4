//! Dashboard statistics DTOs

use serde::{Deserialize, Serialize};

use domain_rural::{FarmStatistics, NamedCount};

use super::producer::format_hectares;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicsResponse {
    pub total_fazendas: i64,
    pub total_hectares: String,
    pub total_area_agricultavel: LandUseResponse,
    pub total_fazenda_culturas: Vec<NamedTotal>,
    pub total_fazendas_por_estado: Vec<StateTotal>,
}

/// Arable and vegetation area summed over all farms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandUseResponse {
    pub total_agricultavel: String,
    pub total_vegetacao: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTotal {
    pub nome: String,
    pub total: i64,
}

impl From<NamedCount> for NamedTotal {
    fn from(count: NamedCount) -> Self {
        NamedTotal {
            nome: count.name,
            total: count.total,
        }
    }
}

/// Farm count for one state, keyed by the state's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTotal {
    #[serde(rename = "cidade__estado__nome")]
    pub state_name: String,
    pub total: i64,
}

impl From<NamedCount> for StateTotal {
    fn from(count: NamedCount) -> Self {
        StateTotal {
            state_name: count.name,
            total: count.total,
        }
    }
}

impl From<FarmStatistics> for GraphicsResponse {
    fn from(stats: FarmStatistics) -> Self {
        GraphicsResponse {
            total_fazendas: stats.total_farms,
            total_hectares: format_hectares(stats.total_area),
            total_area_agricultavel: LandUseResponse {
                total_agricultavel: format_hectares(stats.total_arable),
                total_vegetacao: format_hectares(stats.total_vegetation),
            },
            total_fazenda_culturas: stats.crops.into_iter().map(NamedTotal::from).collect(),
            total_fazendas_por_estado: stats.states.into_iter().map(StateTotal::from).collect(),
        }
    }
}
