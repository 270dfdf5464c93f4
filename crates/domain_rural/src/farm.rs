//! Farm entity and area invariant
//!
//! Hectare values are `rust_decimal::Decimal` stored as NUMERIC(10,2), so the
//! invariant is evaluated with exact decimal arithmetic.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CityId, CropId, FarmId};

use crate::error::ValidationError;

/// Total number of digits a hectare value may have
pub const AREA_MAX_DIGITS: u32 = 10;

/// Number of decimal places a hectare value may have
pub const AREA_DECIMAL_PLACES: u32 = 2;

/// Returns true when the arable and vegetation areas add up to more than the total
///
/// Equality is allowed.
pub fn exceeds_total(arable: Decimal, vegetation: Decimal, total: Decimal) -> bool {
    arable + vegetation > total
}

/// Checks that a hectare value fits NUMERIC(10,2)
///
/// Trailing zeros do not count as decimal places.
pub fn check_area_precision(value: Decimal) -> Result<(), ValidationError> {
    let normalized = value.normalize();
    let decimal_places = normalized.scale();
    let digits = match normalized.mantissa().unsigned_abs() {
        0 => 1,
        mantissa => mantissa.to_string().len() as u32,
    };
    let whole_digits = digits.saturating_sub(decimal_places);

    if digits > AREA_MAX_DIGITS {
        return Err(ValidationError::TooManyDigits { max: AREA_MAX_DIGITS });
    }
    if decimal_places > AREA_DECIMAL_PLACES {
        return Err(ValidationError::TooManyDecimalPlaces {
            max: AREA_DECIMAL_PLACES,
        });
    }
    if whole_digits > AREA_MAX_DIGITS - AREA_DECIMAL_PLACES {
        return Err(ValidationError::TooManyWholeDigits {
            max: AREA_MAX_DIGITS - AREA_DECIMAL_PLACES,
        });
    }
    Ok(())
}

/// The three hectare measurements of a farm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmAreas {
    pub total: Decimal,
    pub arable: Decimal,
    pub vegetation: Decimal,
}

impl FarmAreas {
    /// Creates the area triple, rescaled to two decimal places
    pub fn new(total: Decimal, arable: Decimal, vegetation: Decimal) -> Self {
        Self {
            total: to_hectares(total),
            arable: to_hectares(arable),
            vegetation: to_hectares(vegetation),
        }
    }

    /// Returns true when arable + vegetation > total
    pub fn exceeds_total(&self) -> bool {
        exceeds_total(self.arable, self.vegetation, self.total)
    }

    /// Checks the area invariant
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exceeds_total() {
            return Err(ValidationError::AreaExceedsTotal);
        }
        Ok(())
    }
}

/// Rescales a value to the two decimal places hectares are stored with
pub fn to_hectares(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(AREA_DECIMAL_PLACES);
    value
}

/// Fields of a farm, used to report what an update changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FarmField {
    Name,
    City,
    TotalArea,
    ArableArea,
    VegetationArea,
    Crops,
}

impl FarmField {
    /// Name of the field in request and response payloads
    pub fn payload_name(&self) -> &'static str {
        match self {
            FarmField::Name => "nome",
            FarmField::City => "cidade",
            FarmField::TotalArea => "area_total_hectares",
            FarmField::ArableArea => "area_agricultavel_hectares",
            FarmField::VegetationArea => "area_vegetacao_hectares",
            FarmField::Crops => "culturas_plantadas",
        }
    }

    /// Returns true for the three fields bound by the area invariant
    pub fn is_area(&self) -> bool {
        matches!(
            self,
            FarmField::TotalArea | FarmField::ArableArea | FarmField::VegetationArea
        )
    }
}

/// A farm with its planted crops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub city_id: CityId,
    pub areas: FarmAreas,
    pub crops: BTreeSet<CropId>,
}

impl Farm {
    /// Checks the farm's own invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.areas.validate()
    }

    /// Returns true if the crop is planted on this farm
    pub fn grows(&self, crop: CropId) -> bool {
        self.crops.contains(&crop)
    }
}

/// Data for inserting a farm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFarm {
    pub name: String,
    pub city_id: CityId,
    pub areas: FarmAreas,
    pub crops: BTreeSet<CropId>,
}

impl NewFarm {
    /// Checks the farm's own invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.areas.validate()
    }

    /// Builds the stored farm once the storage layer assigned an id
    pub fn with_id(self, id: FarmId) -> Farm {
        Farm {
            id,
            name: self.name,
            city_id: self.city_id,
            areas: self.areas,
            crops: self.crops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_exceeds_total_boundary() {
        assert!(!exceeds_total(dec!(80), dec!(20), dec!(100)));
        assert!(exceeds_total(dec!(80.01), dec!(20), dec!(100)));
        assert!(!exceeds_total(dec!(0), dec!(0), dec!(0)));
    }

    #[test]
    fn test_exact_decimal_arithmetic() {
        // 0.1 + 0.2 == 0.3 exactly, unlike binary floating point
        assert!(!exceeds_total(dec!(0.1), dec!(0.2), dec!(0.3)));
    }

    #[test]
    fn test_areas_rescaled_to_two_places() {
        let areas = FarmAreas::new(dec!(100), dec!(80.5), dec!(19.50));
        assert_eq!(areas.total.to_string(), "100.00");
        assert_eq!(areas.arable.to_string(), "80.50");
        assert_eq!(areas.vegetation.to_string(), "19.50");
    }

    #[test]
    fn test_areas_validate() {
        assert!(FarmAreas::new(dec!(100), dec!(51), dec!(51)).validate().is_err());
        assert!(FarmAreas::new(dec!(100), dec!(50), dec!(50)).validate().is_ok());
    }

    #[test]
    fn test_area_precision() {
        assert!(check_area_precision(dec!(12345678.99)).is_ok());
        assert!(check_area_precision(dec!(100.000)).is_ok());
        assert_eq!(
            check_area_precision(dec!(1.234)),
            Err(ValidationError::TooManyDecimalPlaces { max: 2 })
        );
        assert_eq!(
            check_area_precision(dec!(123456789)),
            Err(ValidationError::TooManyWholeDigits { max: 8 })
        );
        assert_eq!(
            check_area_precision(dec!(123456789.12)),
            Err(ValidationError::TooManyDigits { max: 10 })
        );
    }

    #[test]
    fn test_field_names() {
        assert_eq!(FarmField::ArableArea.payload_name(), "area_agricultavel_hectares");
        assert!(FarmField::TotalArea.is_area());
        assert!(!FarmField::Crops.is_area());
    }
}
