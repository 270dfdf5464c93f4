//! Brazilian tax identifiers
//!
//! Producers are identified either by a CPF (natural person, 11 digits) or a
//! CNPJ (company, 14 digits). Both carry two trailing check digits computed
//! with a weighted sum modulo 11.
//!
//! Both validators share one contract: `Ok(())` or a [`TaxIdError`] naming
//! the reason. Input may carry any formatting; only the digits are checked.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weights for the first CNPJ check digit
const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Weights for the second CNPJ check digit
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Which of the two identifiers a value represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxIdKind {
    /// CPF, issued to natural persons
    Individual,
    /// CNPJ, issued to companies
    Company,
}

impl TaxIdKind {
    /// Number of digits of a well-formed identifier
    pub fn digits(&self) -> usize {
        match self {
            TaxIdKind::Individual => 11,
            TaxIdKind::Company => 14,
        }
    }

    /// Longest input accepted once whitespace and separators are stripped
    pub fn max_input_len(&self) -> usize {
        match self {
            TaxIdKind::Individual => 14,
            TaxIdKind::Company => 18,
        }
    }

    /// Name of the payload field carrying this identifier
    pub fn field(&self) -> &'static str {
        match self {
            TaxIdKind::Individual => "cpf",
            TaxIdKind::Company => "cnpj",
        }
    }

    /// Human-facing acronym
    pub fn label(&self) -> &'static str {
        match self {
            TaxIdKind::Individual => "CPF",
            TaxIdKind::Company => "CNPJ",
        }
    }
}

/// Reason a tax identifier was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TaxIdError {
    #[error("expected {expected} digits, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("all digits are identical")]
    RepeatedDigits,

    #[error("check digits do not match")]
    ChecksumMismatch,
}

/// Removes the formatting characters clients commonly send (`.`, `-`, `/`)
///
/// Returns `None` when nothing is left, so an empty string and a missing
/// value mean the same thing.
pub fn normalize(raw: &str) -> Option<String> {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '/'))
        .collect();

    if stripped.is_empty() {
        None
    } else {
        Some(stripped)
    }
}

/// Returns only the decimal digits of the input
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Validates a CPF
///
/// # Examples
///
/// ```rust
/// use domain_rural::tax_id::{validate_individual_id, TaxIdError};
///
/// assert!(validate_individual_id("123.456.789-09").is_ok());
/// assert_eq!(validate_individual_id("123.456.789-10"), Err(TaxIdError::ChecksumMismatch));
/// assert_eq!(validate_individual_id("11111111111"), Err(TaxIdError::RepeatedDigits));
/// ```
pub fn validate_individual_id(raw: &str) -> Result<(), TaxIdError> {
    let digits = checked_digits(raw, TaxIdKind::Individual.digits())?;

    for position in [9usize, 10] {
        // Weights run from position + 1 down to 2
        let weights = (2..=position as u32 + 1).rev();
        if check_digit(&digits[..position], weights) != digits[position] {
            return Err(TaxIdError::ChecksumMismatch);
        }
    }

    Ok(())
}

/// Validates a CNPJ
///
/// # Examples
///
/// ```rust
/// use domain_rural::tax_id::{validate_company_id, TaxIdError};
///
/// assert!(validate_company_id("40.993.392/0001-51").is_ok());
/// assert_eq!(
///     validate_company_id("12345678"),
///     Err(TaxIdError::WrongLength { expected: 14, found: 8 })
/// );
/// ```
pub fn validate_company_id(raw: &str) -> Result<(), TaxIdError> {
    let digits = checked_digits(raw, TaxIdKind::Company.digits())?;

    if check_digit(&digits[..12], CNPJ_FIRST_WEIGHTS.iter().copied()) != digits[12] {
        return Err(TaxIdError::ChecksumMismatch);
    }
    if check_digit(&digits[..13], CNPJ_SECOND_WEIGHTS.iter().copied()) != digits[13] {
        return Err(TaxIdError::ChecksumMismatch);
    }

    Ok(())
}

/// Validates an identifier of the given kind
pub fn validate(kind: TaxIdKind, raw: &str) -> Result<(), TaxIdError> {
    match kind {
        TaxIdKind::Individual => validate_individual_id(raw),
        TaxIdKind::Company => validate_company_id(raw),
    }
}

/// Boolean convenience over [`validate_individual_id`]
pub fn is_valid_individual_id(raw: &str) -> bool {
    validate_individual_id(raw).is_ok()
}

/// Boolean convenience over [`validate_company_id`]
pub fn is_valid_company_id(raw: &str) -> bool {
    validate_company_id(raw).is_ok()
}

/// Formats an 11-digit CPF as `123.456.789-09`
///
/// Returns `None` if the value is not exactly 11 digits.
pub fn format_individual_id(value: &str) -> Option<String> {
    if value.len() != 11 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "{}.{}.{}-{}",
        &value[0..3],
        &value[3..6],
        &value[6..9],
        &value[9..11]
    ))
}

/// Formats a 14-digit CNPJ as `40.993.392/0001-51`
///
/// Returns `None` if the value is not exactly 14 digits.
pub fn format_company_id(value: &str) -> Option<String> {
    if value.len() != 14 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "{}.{}.{}/{}-{}",
        &value[0..2],
        &value[2..5],
        &value[5..8],
        &value[8..12],
        &value[12..14]
    ))
}

fn checked_digits(raw: &str, expected: usize) -> Result<Vec<u32>, TaxIdError> {
    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != expected {
        return Err(TaxIdError::WrongLength {
            expected,
            found: digits.len(),
        });
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(TaxIdError::RepeatedDigits);
    }

    Ok(digits)
}

fn check_digit(digits: &[u32], weights: impl Iterator<Item = u32>) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        remainder if remainder < 2 => 0,
        remainder => 11 - remainder,
    }
}
