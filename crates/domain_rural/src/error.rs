//! Rural domain errors
//!
//! Validation problems are a closed set of [`ValidationError`] variants, each
//! tagged with the [`ErrorLocation`] that raised it. The HTTP layer turns the
//! collected [`ValidationErrors`] into the nested error payload without
//! knowing anything about the rules themselves.

use std::fmt;
use thiserror::Error;

use core_kernel::{PortError, ProducerId};

use crate::tax_id::{TaxIdError, TaxIdKind};

/// Key used for object-level errors in error payloads
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Key under which farm errors are nested in error payloads
pub const FARM_KEY: &str = "fazenda";

/// A single rule violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", tax_id_message(.0, .1))]
    InvalidTaxId(TaxIdKind, TaxIdError),

    #[error("produtor rural com este {} já existe.", .0.label())]
    DuplicateTaxId(TaxIdKind),

    #[error("O produtor rural não pode ter CNPJ e CPF ao mesmo tempo")]
    IdentityConflict,

    #[error("O produtor rural deve ter CNPJ ou CPF")]
    IdentityMissing,

    #[error("A soma de área agrícultável e vegetação não pode ser maior que a área total da fazenda")]
    AreaExceedsTotal,

    #[error("Este campo é obrigatório.")]
    Required,

    #[error("Este campo não pode ser em branco.")]
    Blank,

    #[error("Certifique-se de que este campo não tenha mais de {max} caracteres.")]
    TooLong { max: usize },

    #[error("Pk inválido \"{0}\" - objeto não existe.")]
    UnknownReference(i64),

    #[error("Certifique-se de que não haja mais de {max} dígitos no total.")]
    TooManyDigits { max: u32 },

    #[error("Certifique-se de que não haja mais de {max} dígitos antes do ponto decimal.")]
    TooManyWholeDigits { max: u32 },

    #[error("Certifique-se de que não haja mais de {max} casas decimais.")]
    TooManyDecimalPlaces { max: u32 },
}

impl ValidationError {
    /// Stable machine-readable code, used in log lines
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidTaxId(..) => "invalid",
            ValidationError::DuplicateTaxId(_) => "unique",
            ValidationError::IdentityConflict => "cnpj_and_cpf_error",
            ValidationError::IdentityMissing => "cnpj_or_cpf_required_error",
            ValidationError::AreaExceedsTotal => "area_hectares_total_error",
            ValidationError::Required => "required",
            ValidationError::Blank => "blank",
            ValidationError::TooLong { .. } => "max_length",
            ValidationError::UnknownReference(_) => "does_not_exist",
            ValidationError::TooManyDigits { .. } => "max_digits",
            ValidationError::TooManyWholeDigits { .. } => "max_whole_digits",
            ValidationError::TooManyDecimalPlaces { .. } => "max_decimal_places",
        }
    }
}

fn tax_id_message(kind: &TaxIdKind, error: &TaxIdError) -> String {
    match error {
        TaxIdError::WrongLength { expected, .. } => {
            format!("{} deve ter {} dígitos.", kind.label(), expected)
        }
        TaxIdError::RepeatedDigits | TaxIdError::ChecksumMismatch => {
            format!("{} inválido.", kind.label())
        }
    }
}

/// Where in the request a validation error was raised
///
/// Farm errors are reported nested under the farm key, which is the only
/// signal telling a client whether the farm-level check or the producer-level
/// check rejected the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLocation {
    /// Object-level producer error
    Producer,
    /// A producer field (`nome`, `cpf`, `cnpj`, `fazenda`)
    ProducerField(&'static str),
    /// Object-level farm error
    Farm,
    /// A farm field (`cidade`, `area_total_hectares`, ...)
    FarmField(&'static str),
}

impl ErrorLocation {
    /// Key of the innermost error list
    pub fn key(&self) -> &'static str {
        match self {
            ErrorLocation::Producer | ErrorLocation::Farm => NON_FIELD_ERRORS,
            ErrorLocation::ProducerField(field) | ErrorLocation::FarmField(field) => field,
        }
    }

    /// Whether the error is nested under the farm key
    pub fn is_farm(&self) -> bool {
        matches!(self, ErrorLocation::Farm | ErrorLocation::FarmField(_))
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_farm() {
            write!(f, "{}.{}", FARM_KEY, self.key())
        } else {
            write!(f, "{}", self.key())
        }
    }
}

/// Ordered collection of validation errors for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(ErrorLocation, ValidationError)>,
}

impl ValidationErrors {
    /// Creates an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding one error
    pub fn single(location: ErrorLocation, error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(location, error);
        errors
    }

    /// Records an error
    pub fn add(&mut self, location: ErrorLocation, error: ValidationError) {
        self.entries.push((location, error));
    }

    /// Returns true when no error was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded errors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates errors in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = &(ErrorLocation, ValidationError)> {
        self.entries.iter()
    }

    /// Errors recorded at one location
    pub fn at(&self, location: ErrorLocation) -> Vec<&ValidationError> {
        self.entries
            .iter()
            .filter(|(loc, _)| *loc == location)
            .map(|(_, error)| error)
            .collect()
    }

    /// Returns true if the error was recorded anywhere
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.entries.iter().any(|(_, e)| e == error)
    }

    /// Returns true if any error was recorded under the farm key
    pub fn has_farm_errors(&self) -> bool {
        self.entries.iter().any(|(loc, _)| loc.is_farm())
    }

    /// `Ok(())` when empty, otherwise a [`RuralError::Validation`]
    pub fn into_result(self) -> Result<(), RuralError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(RuralError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (location, error)) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", location, error)?;
        }
        Ok(())
    }
}

/// Errors returned by the rural domain services
#[derive(Debug, Error)]
pub enum RuralError {
    /// The request broke one or more rules
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// No producer with the given id
    #[error("Producer not found: {0}")]
    ProducerNotFound(ProducerId),

    /// A storage constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The storage port failed
    #[error("Storage error: {0}")]
    Storage(#[source] PortError),
}

impl RuralError {
    /// Creates a validation error holding one violation
    pub fn invalid(location: ErrorLocation, error: ValidationError) -> Self {
        RuralError::Validation(ValidationErrors::single(location, error))
    }

    /// Returns the violations if this is a validation error
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            RuralError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<PortError> for RuralError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Conflict { message } => RuralError::Conflict(message),
            other => RuralError::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_id_messages() {
        let length = ValidationError::InvalidTaxId(
            TaxIdKind::Individual,
            TaxIdError::WrongLength { expected: 11, found: 9 },
        );
        assert_eq!(length.to_string(), "CPF deve ter 11 dígitos.");

        let checksum = ValidationError::InvalidTaxId(TaxIdKind::Company, TaxIdError::ChecksumMismatch);
        assert_eq!(checksum.to_string(), "CNPJ inválido.");
    }

    #[test]
    fn test_location_keys() {
        assert_eq!(ErrorLocation::Producer.key(), NON_FIELD_ERRORS);
        assert_eq!(ErrorLocation::FarmField("cidade").key(), "cidade");
        assert!(ErrorLocation::Farm.is_farm());
        assert!(!ErrorLocation::ProducerField("cpf").is_farm());
        assert_eq!(ErrorLocation::Farm.to_string(), "fazenda.non_field_errors");
    }

    #[test]
    fn test_collection_order_and_lookup() {
        let mut errors = ValidationErrors::new();
        errors.add(ErrorLocation::ProducerField("nome"), ValidationError::Required);
        errors.add(ErrorLocation::Farm, ValidationError::AreaExceedsTotal);

        assert_eq!(errors.len(), 2);
        assert!(errors.has_farm_errors());
        assert_eq!(errors.at(ErrorLocation::Farm), vec![&ValidationError::AreaExceedsTotal]);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_port_conflict_becomes_conflict() {
        let error = RuralError::from(PortError::conflict("duplicate key"));
        assert!(matches!(error, RuralError::Conflict(_)));
    }
}
