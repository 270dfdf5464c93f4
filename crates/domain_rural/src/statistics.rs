//! Dashboard statistics over all farms

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::crop::Crop;
use crate::farm::{to_hectares, Farm};
use crate::location::{City, State};

/// A name with the number of farms counted under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    pub name: String,
    pub total: i64,
}

impl NamedCount {
    pub fn new(name: impl Into<String>, total: i64) -> Self {
        Self {
            name: name.into(),
            total,
        }
    }
}

/// Aggregates shown on the dashboard
///
/// Every crop appears in `crops`, with a zero count when no farm grows it.
/// Only states that have at least one farm appear in `states`. Both lists
/// are ordered by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmStatistics {
    pub total_farms: i64,
    pub total_area: Decimal,
    pub total_arable: Decimal,
    pub total_vegetation: Decimal,
    pub crops: Vec<NamedCount>,
    pub states: Vec<NamedCount>,
}

impl Default for FarmStatistics {
    fn default() -> Self {
        Self {
            total_farms: 0,
            total_area: to_hectares(Decimal::ZERO),
            total_arable: to_hectares(Decimal::ZERO),
            total_vegetation: to_hectares(Decimal::ZERO),
            crops: Vec::new(),
            states: Vec::new(),
        }
    }
}

impl FarmStatistics {
    /// Computes the statistics from loaded entities
    ///
    /// Farms whose city is unknown still count towards the totals but not
    /// towards any state.
    pub fn from_farms<'a>(
        farms: impl IntoIterator<Item = &'a Farm>,
        crops: &[Crop],
        cities: &[City],
        states: &[State],
    ) -> Self {
        let state_by_city: HashMap<_, _> = cities.iter().map(|c| (c.id, c.state_id)).collect();
        let state_names: HashMap<_, _> = states.iter().map(|s| (s.id, s.name.as_str())).collect();

        let mut stats = Self::default();
        let mut crop_counts: HashMap<_, i64> = crops.iter().map(|c| (c.id, 0)).collect();
        let mut state_counts: BTreeMap<&str, i64> = BTreeMap::new();

        for farm in farms {
            stats.total_farms += 1;
            stats.total_area += farm.areas.total;
            stats.total_arable += farm.areas.arable;
            stats.total_vegetation += farm.areas.vegetation;

            for crop in &farm.crops {
                if let Some(count) = crop_counts.get_mut(crop) {
                    *count += 1;
                }
            }

            let state_name = state_by_city
                .get(&farm.city_id)
                .and_then(|state_id| state_names.get(state_id));
            if let Some(name) = state_name {
                *state_counts.entry(*name).or_insert(0) += 1;
            }
        }

        stats.total_area = to_hectares(stats.total_area);
        stats.total_arable = to_hectares(stats.total_arable);
        stats.total_vegetation = to_hectares(stats.total_vegetation);

        let mut crop_totals: Vec<_> = crops
            .iter()
            .map(|crop| NamedCount::new(&crop.name, crop_counts.get(&crop.id).copied().unwrap_or(0)))
            .collect();
        crop_totals.sort_by(|a, b| a.name.cmp(&b.name));
        stats.crops = crop_totals;

        stats.states = state_counts
            .into_iter()
            .map(|(name, total)| NamedCount::new(name, total))
            .collect();

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{CityId, CropId, FarmId, StateId};
    use rust_decimal_macros::dec;

    use crate::farm::FarmAreas;

    fn farm(id: i64, city: i64, areas: (Decimal, Decimal, Decimal), crops: &[i64]) -> Farm {
        Farm {
            id: FarmId::new(id),
            name: format!("Fazenda {id}"),
            city_id: CityId::new(city),
            areas: FarmAreas::new(areas.0, areas.1, areas.2),
            crops: crops.iter().map(|c| CropId::new(*c)).collect(),
        }
    }

    fn reference() -> (Vec<Crop>, Vec<City>, Vec<State>) {
        let crops = vec![
            Crop { id: CropId::new(1), name: "Soja".to_string() },
            Crop { id: CropId::new(2), name: "Milho".to_string() },
            Crop { id: CropId::new(3), name: "Café".to_string() },
        ];
        let states = vec![
            State { id: StateId::new(1), name: "São Paulo".to_string(), code: "SP".to_string() },
            State { id: StateId::new(2), name: "Goiás".to_string(), code: "GO".to_string() },
            State { id: StateId::new(3), name: "Bahia".to_string(), code: "BA".to_string() },
        ];
        let cities = vec![
            City { id: CityId::new(1), name: "Campinas".to_string(), state_id: StateId::new(1) },
            City { id: CityId::new(2), name: "Rio Verde".to_string(), state_id: StateId::new(2) },
        ];
        (crops, cities, states)
    }

    #[test]
    fn test_empty_statistics_are_zero() {
        let (crops, cities, states) = reference();
        let stats = FarmStatistics::from_farms(&Vec::<Farm>::new(), &crops, &cities, &states);

        assert_eq!(stats.total_farms, 0);
        assert_eq!(stats.total_area.to_string(), "0.00");
        assert!(stats.states.is_empty());
        assert!(stats.crops.iter().all(|c| c.total == 0));
        assert_eq!(stats.crops.len(), 3);
    }

    #[test]
    fn test_totals_and_groupings() {
        let (crops, cities, states) = reference();
        let farms = vec![
            farm(1, 1, (dec!(100), dec!(80), dec!(20)), &[1, 2]),
            farm(2, 2, (dec!(150), dec!(100), dec!(25.5)), &[1]),
            farm(3, 1, (dec!(10), dec!(5), dec!(5)), &[]),
        ];

        let stats = FarmStatistics::from_farms(&farms, &crops, &cities, &states);

        assert_eq!(stats.total_farms, 3);
        assert_eq!(stats.total_area, dec!(260.00));
        assert_eq!(stats.total_arable, dec!(185.00));
        assert_eq!(stats.total_vegetation.to_string(), "50.50");
        assert_eq!(
            stats.crops,
            vec![
                NamedCount::new("Café", 0),
                NamedCount::new("Milho", 1),
                NamedCount::new("Soja", 2),
            ]
        );
        assert_eq!(
            stats.states,
            vec![NamedCount::new("Goiás", 1), NamedCount::new("São Paulo", 2)]
        );
    }
}
