//! Field-by-field merge of cleaned changes into stored entities
//!
//! Updates never mutate the stored value in place. [`Farm::apply`] and
//! [`Producer::apply`] return the merged value together with the fields that
//! actually changed, and the storage port writes exactly those.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use core_kernel::{CityId, CropId};

use crate::error::ErrorLocation;
use crate::farm::{Farm, FarmAreas, FarmField, NewFarm};
use crate::producer::{NewProducer, Producer, ProducerField};

/// Cleaned farm values of a write request; `None` means "not supplied"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FarmChanges {
    pub name: Option<String>,
    pub city_id: Option<CityId>,
    pub total_area: Option<Decimal>,
    pub arable_area: Option<Decimal>,
    pub vegetation_area: Option<Decimal>,
    pub crops: Option<BTreeSet<CropId>>,
}

impl FarmChanges {
    /// The area triple, only when all three values were supplied
    pub fn complete_areas(&self) -> Option<FarmAreas> {
        match (self.total_area, self.arable_area, self.vegetation_area) {
            (Some(total), Some(arable), Some(vegetation)) => {
                Some(FarmAreas::new(total, arable, vegetation))
            }
            _ => None,
        }
    }

    /// Each supplied area value, else the stored one
    pub fn merged_areas(&self, stored: &FarmAreas) -> FarmAreas {
        FarmAreas::new(
            self.total_area.unwrap_or(stored.total),
            self.arable_area.unwrap_or(stored.arable),
            self.vegetation_area.unwrap_or(stored.vegetation),
        )
    }

    /// Builds an insertable farm, or names the first missing field
    pub fn into_new_farm(self) -> Result<NewFarm, FarmField> {
        let areas = self.complete_areas().ok_or(if self.total_area.is_none() {
            FarmField::TotalArea
        } else if self.arable_area.is_none() {
            FarmField::ArableArea
        } else {
            FarmField::VegetationArea
        })?;

        Ok(NewFarm {
            name: self.name.ok_or(FarmField::Name)?,
            city_id: self.city_id.ok_or(FarmField::City)?,
            areas,
            crops: self.crops.ok_or(FarmField::Crops)?,
        })
    }
}

/// Cleaned producer values of a write request
///
/// `cpf` and `cnpj` keep the tri-state of the request: `None` is "not
/// supplied", `Some(None)` clears the identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerChanges {
    pub name: Option<String>,
    pub cpf: Option<Option<String>>,
    pub cnpj: Option<Option<String>>,
    pub farm: Option<FarmChanges>,
}

impl ProducerChanges {
    /// The CPF the request sets, if any
    pub fn new_cpf(&self) -> Option<&str> {
        self.cpf.as_ref().and_then(|value| value.as_deref())
    }

    /// The CNPJ the request sets, if any
    pub fn new_cnpj(&self) -> Option<&str> {
        self.cnpj.as_ref().and_then(|value| value.as_deref())
    }

    /// Builds an insertable producer, or locates the first missing field
    pub fn into_new_producer(self) -> Result<NewProducer, ErrorLocation> {
        let name = self.name.ok_or(ErrorLocation::ProducerField("nome"))?;
        let farm = self
            .farm
            .ok_or(ErrorLocation::ProducerField("fazenda"))?
            .into_new_farm()
            .map_err(|field| ErrorLocation::FarmField(field.payload_name()))?;

        Ok(NewProducer {
            name,
            cpf: self.cpf.flatten(),
            cnpj: self.cnpj.flatten(),
            farm,
        })
    }
}

/// The fields an update actually changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub producer: Vec<ProducerField>,
    pub farm: Vec<FarmField>,
}

impl ChangeSet {
    /// Returns true when the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.producer.is_empty() && self.farm.is_empty()
    }

    pub fn touches(&self, field: ProducerField) -> bool {
        self.producer.contains(&field)
    }

    pub fn touches_farm(&self, field: FarmField) -> bool {
        self.farm.contains(&field)
    }

    /// Returns true when a farm column other than the crop set changed
    pub fn touches_farm_row(&self) -> bool {
        self.farm.iter().any(|field| *field != FarmField::Crops)
    }
}

fn merge_field<T: Clone + PartialEq>(
    current: &mut T,
    supplied: Option<&T>,
    field: FarmField,
    changed: &mut Vec<FarmField>,
) {
    if let Some(value) = supplied {
        if current != value {
            *current = value.clone();
            changed.push(field);
        }
    }
}

impl Farm {
    /// Merges supplied values over this farm
    ///
    /// A supplied crop set replaces the stored one, an empty set included.
    pub fn apply(&self, changes: &FarmChanges) -> (Farm, Vec<FarmField>) {
        let mut merged = self.clone();
        let mut changed = Vec::new();

        merge_field(&mut merged.name, changes.name.as_ref(), FarmField::Name, &mut changed);
        merge_field(&mut merged.city_id, changes.city_id.as_ref(), FarmField::City, &mut changed);
        merge_field(
            &mut merged.areas.total,
            changes.total_area.as_ref(),
            FarmField::TotalArea,
            &mut changed,
        );
        merge_field(
            &mut merged.areas.arable,
            changes.arable_area.as_ref(),
            FarmField::ArableArea,
            &mut changed,
        );
        merge_field(
            &mut merged.areas.vegetation,
            changes.vegetation_area.as_ref(),
            FarmField::VegetationArea,
            &mut changed,
        );
        merge_field(&mut merged.crops, changes.crops.as_ref(), FarmField::Crops, &mut changed);

        (merged, changed)
    }
}

impl Producer {
    /// Merges supplied values over this producer and its farm
    pub fn apply(&self, changes: &ProducerChanges) -> (Producer, ChangeSet) {
        let mut merged = self.clone();
        let mut change_set = ChangeSet::default();

        if let Some(name) = &changes.name {
            if *name != merged.name {
                merged.name = name.clone();
                change_set.producer.push(ProducerField::Name);
            }
        }
        if let Some(cpf) = &changes.cpf {
            if *cpf != merged.cpf {
                merged.cpf = cpf.clone();
                change_set.producer.push(ProducerField::IndividualId);
            }
        }
        if let Some(cnpj) = &changes.cnpj {
            if *cnpj != merged.cnpj {
                merged.cnpj = cnpj.clone();
                change_set.producer.push(ProducerField::CompanyId);
            }
        }
        if let Some(farm_changes) = &changes.farm {
            let (farm, changed) = merged.farm.apply(farm_changes);
            merged.farm = farm;
            change_set.farm = changed;
        }

        (merged, change_set)
    }
}
