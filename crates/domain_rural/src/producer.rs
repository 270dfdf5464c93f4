//! Producer entity and identity rule
//!
//! A producer owns exactly one farm and is identified by exactly one of a
//! CPF or a CNPJ. The identity rule runs wherever a producer is written, so
//! every storage adapter enforces it as well as the request validation.

use serde::{Deserialize, Serialize};

use core_kernel::ProducerId;

use crate::error::ValidationError;
use crate::farm::{Farm, NewFarm};
use crate::tax_id::{format_company_id, format_individual_id, TaxIdKind};

/// Longest accepted producer or farm name
pub const NAME_MAX_LEN: usize = 100;

/// Checks that exactly one identifier is present
///
/// The conflict is reported before the missing identifier.
pub fn validate_identity(cpf: Option<&str>, cnpj: Option<&str>) -> Result<(), ValidationError> {
    match (cpf, cnpj) {
        (Some(_), Some(_)) => Err(ValidationError::IdentityConflict),
        (None, None) => Err(ValidationError::IdentityMissing),
        _ => Ok(()),
    }
}

/// Fields of a producer, used to report what an update changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProducerField {
    Name,
    IndividualId,
    CompanyId,
}

impl ProducerField {
    /// Name of the field in request and response payloads
    pub fn payload_name(&self) -> &'static str {
        match self {
            ProducerField::Name => "nome",
            ProducerField::IndividualId => "cpf",
            ProducerField::CompanyId => "cnpj",
        }
    }
}

/// A rural producer together with its farm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Producer {
    pub id: ProducerId,
    pub name: String,
    /// CPF, digits only
    pub cpf: Option<String>,
    /// CNPJ, digits only
    pub cnpj: Option<String>,
    pub farm: Farm,
}

impl Producer {
    /// Checks the identity rule against this producer's identifiers
    pub fn validate_identity(&self) -> Result<(), ValidationError> {
        validate_identity(self.cpf.as_deref(), self.cnpj.as_deref())
    }

    /// Checks every invariant of the producer and its farm
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_identity()?;
        self.farm.validate()
    }

    /// Returns true when the submitted identifiers would give this producer
    /// the other kind of identifier
    pub fn switches_identity(&self, cpf: Option<&str>, cnpj: Option<&str>) -> bool {
        (self.cnpj.is_some() && cpf.is_some()) || (cnpj.is_some() && self.cpf.is_some())
    }

    /// Returns true for a company producer
    pub fn is_company(&self) -> bool {
        self.cnpj.is_some()
    }

    /// Returns true for a natural-person producer
    pub fn is_individual(&self) -> bool {
        self.cpf.is_some()
    }

    /// Which identifier the producer carries
    pub fn tax_id_kind(&self) -> Option<TaxIdKind> {
        if self.is_company() {
            Some(TaxIdKind::Company)
        } else if self.is_individual() {
            Some(TaxIdKind::Individual)
        } else {
            None
        }
    }

    /// The identifier formatted for display, CNPJ taking precedence
    pub fn formatted_tax_id(&self) -> Option<String> {
        match (&self.cnpj, &self.cpf) {
            (Some(cnpj), _) => format_company_id(cnpj),
            (None, Some(cpf)) => format_individual_id(cpf),
            (None, None) => None,
        }
    }
}

impl std::fmt::Display for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Data for inserting a producer together with its farm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProducer {
    pub name: String,
    pub cpf: Option<String>,
    pub cnpj: Option<String>,
    pub farm: NewFarm,
}

impl NewProducer {
    /// Checks the identity rule
    pub fn validate_identity(&self) -> Result<(), ValidationError> {
        validate_identity(self.cpf.as_deref(), self.cnpj.as_deref())
    }

    /// Checks every invariant of the producer and its farm
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_identity()?;
        self.farm.validate()
    }
}
