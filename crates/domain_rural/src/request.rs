//! Write requests and their field-level cleaning
//!
//! A [`ProducerInput`] is what the HTTP layer decoded from a request body,
//! before any rule ran. [`ProducerInput::clean`] normalizes the identifiers,
//! runs every check that needs no storage access and returns the cleaned
//! [`ProducerChanges`] together with all errors it found, so the service can
//! add its storage-backed checks and report everything at once.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use core_kernel::{CityId, CropId};

use crate::error::{ErrorLocation, ValidationError, ValidationErrors};
use crate::farm::{check_area_precision, to_hectares, FarmField};
use crate::merge::{FarmChanges, ProducerChanges};
use crate::producer::NAME_MAX_LEN;
use crate::tax_id::{self, TaxIdKind};

/// How a write request treats fields it does not carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: every required field must be present
    Create,
    /// PUT: every required field must be present, stored values are overwritten
    Replace,
    /// PATCH: absent fields keep their stored values
    Partial,
}

impl WriteMode {
    /// Returns true for PATCH
    pub fn is_partial(&self) -> bool {
        matches!(self, WriteMode::Partial)
    }

    /// Returns true when absent fields are reported as missing
    pub fn requires_all_fields(&self) -> bool {
        !self.is_partial()
    }
}

/// Decoded body of a producer write request
///
/// `cpf` and `cnpj` distinguish an absent key (`None`) from an explicit
/// "no identifier" (`Some(None)`), which JSON `null` and `""` both mean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerInput {
    pub name: Option<String>,
    pub cpf: Option<Option<String>>,
    pub cnpj: Option<Option<String>>,
    pub farm: Option<FarmInput>,
}

/// Decoded farm object nested in a producer write request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FarmInput {
    pub name: Option<String>,
    pub city: Option<CityId>,
    pub total_area: Option<Decimal>,
    pub arable_area: Option<Decimal>,
    pub vegetation_area: Option<Decimal>,
    pub crops: Option<Vec<CropId>>,
}

impl ProducerInput {
    /// Normalizes the request and runs the storage-independent field checks
    ///
    /// Fields that fail a check are left out of the returned changes.
    pub fn clean(self, mode: WriteMode) -> (ProducerChanges, ValidationErrors) {
        let mut errors = ValidationErrors::new();

        let name = clean_name(
            self.name,
            mode,
            ErrorLocation::ProducerField("nome"),
            &mut errors,
        );
        let cpf = clean_tax_id(TaxIdKind::Individual, self.cpf, &mut errors);
        let cnpj = clean_tax_id(TaxIdKind::Company, self.cnpj, &mut errors);

        let farm = match self.farm {
            Some(farm) => Some(farm.clean(mode, &mut errors)),
            None => {
                if mode.requires_all_fields() {
                    errors.add(
                        ErrorLocation::ProducerField("fazenda"),
                        ValidationError::Required,
                    );
                }
                None
            }
        };

        let changes = ProducerChanges {
            name,
            cpf,
            cnpj,
            farm,
        };
        (changes, errors)
    }
}

impl FarmInput {
    /// Runs the storage-independent checks of the nested farm object
    pub fn clean(self, mode: WriteMode, errors: &mut ValidationErrors) -> FarmChanges {
        let name = clean_name(
            self.name,
            mode,
            ErrorLocation::FarmField(FarmField::Name.payload_name()),
            errors,
        );

        let city_id = required(self.city, mode, FarmField::City, errors);
        let total_area = clean_area(self.total_area, mode, FarmField::TotalArea, errors);
        let arable_area = clean_area(self.arable_area, mode, FarmField::ArableArea, errors);
        let vegetation_area =
            clean_area(self.vegetation_area, mode, FarmField::VegetationArea, errors);
        let crops = required(self.crops, mode, FarmField::Crops, errors)
            .map(|crops| crops.into_iter().collect::<BTreeSet<_>>());

        FarmChanges {
            name,
            city_id,
            total_area,
            arable_area,
            vegetation_area,
            crops,
        }
    }
}

fn required<T>(
    value: Option<T>,
    mode: WriteMode,
    field: FarmField,
    errors: &mut ValidationErrors,
) -> Option<T> {
    if value.is_none() && mode.requires_all_fields() {
        errors.add(
            ErrorLocation::FarmField(field.payload_name()),
            ValidationError::Required,
        );
    }
    value
}

fn clean_name(
    value: Option<String>,
    mode: WriteMode,
    location: ErrorLocation,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let Some(value) = value else {
        if mode.requires_all_fields() {
            errors.add(location, ValidationError::Required);
        }
        return None;
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(location, ValidationError::Blank);
        return None;
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        errors.add(location, ValidationError::TooLong { max: NAME_MAX_LEN });
        return None;
    }
    Some(trimmed.to_string())
}

fn clean_area(
    value: Option<Decimal>,
    mode: WriteMode,
    field: FarmField,
    errors: &mut ValidationErrors,
) -> Option<Decimal> {
    let value = required(value, mode, field, errors)?;
    match check_area_precision(value) {
        Ok(()) => Some(to_hectares(value)),
        Err(error) => {
            errors.add(ErrorLocation::FarmField(field.payload_name()), error);
            None
        }
    }
}

fn clean_tax_id(
    kind: TaxIdKind,
    value: Option<Option<String>>,
    errors: &mut ValidationErrors,
) -> Option<Option<String>> {
    let raw = match value {
        None => return None,
        Some(None) => return Some(None),
        Some(Some(raw)) => raw,
    };
    let location = ErrorLocation::ProducerField(kind.field());

    let Some(normalized) = tax_id::normalize(&raw) else {
        return Some(None);
    };
    if normalized.chars().count() > kind.max_input_len() {
        errors.add(
            location,
            ValidationError::TooLong {
                max: kind.max_input_len(),
            },
        );
        return None;
    }

    match tax_id::validate(kind, &normalized) {
        Ok(()) => Some(Some(tax_id::digits_only(&normalized))),
        Err(error) => {
            errors.add(location, ValidationError::InvalidTaxId(kind, error));
            None
        }
    }
}
