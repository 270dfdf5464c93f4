//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

const CPF_FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Largest hectare value a NUMERIC(10,2) column holds, in hundredths
const MAX_HUNDREDTHS: i64 = 9_999_999_999;

/// Modulo 11 check digit; remainders below 2 give 0
pub fn check_digit(digits: &[u8], weights: &[u32]) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip(weights)
        .map(|(d, w)| u32::from(*d) * w)
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Appends both check digits to nine base digits
pub fn complete_cpf(base: [u8; 9]) -> String {
    let mut digits = base.to_vec();
    digits.push(check_digit(&digits, &CPF_FIRST_WEIGHTS));
    digits.push(check_digit(&digits, &CPF_SECOND_WEIGHTS));
    digits_to_string(&digits)
}

/// Appends both check digits to twelve base digits
pub fn complete_cnpj(base: [u8; 12]) -> String {
    let mut digits = base.to_vec();
    digits.push(check_digit(&digits, &CNPJ_FIRST_WEIGHTS));
    digits.push(check_digit(&digits, &CNPJ_SECOND_WEIGHTS));
    digits_to_string(&digits)
}

/// Formats eleven digits as `000.000.000-00`
pub fn format_cpf(digits: &str) -> String {
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// Formats fourteen digits as `00.000.000/0000-00`
pub fn format_cnpj(digits: &str) -> String {
    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

fn not_uniform<const N: usize>(base: &[u8; N]) -> bool {
    base.iter().any(|d| *d != base[0])
}

/// Strategy for digits-only valid CPFs
pub fn valid_cpf_strategy() -> impl Strategy<Value = String> {
    proptest::array::uniform9(0u8..10)
        .prop_filter("uniform base", |base| not_uniform(base))
        .prop_map(complete_cpf)
}

/// Strategy for digits-only valid CNPJs
pub fn valid_cnpj_strategy() -> impl Strategy<Value = String> {
    proptest::array::uniform12(0u8..10)
        .prop_filter("uniform base", |base| not_uniform(base))
        .prop_map(complete_cnpj)
}

/// Strategy for valid CPFs, formatted or not
pub fn any_format_cpf_strategy() -> impl Strategy<Value = String> {
    (valid_cpf_strategy(), any::<bool>())
        .prop_map(|(cpf, formatted)| if formatted { format_cpf(&cpf) } else { cpf })
}

/// Strategy for strings of one repeated digit
pub fn repeated_digits_strategy(len: usize) -> impl Strategy<Value = String> {
    (0u8..10).prop_map(move |d| digits_to_string(&vec![d; len]))
}

/// Strategy for hectare values that fit NUMERIC(10,2)
pub fn hectares_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=MAX_HUNDREDTHS).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for `(total, arable, vegetation)` triples satisfying
/// `arable + vegetation <= total`
pub fn valid_areas_strategy() -> impl Strategy<Value = (Decimal, Decimal, Decimal)> {
    (0i64..=MAX_HUNDREDTHS)
        .prop_flat_map(|total| (Just(total), 0i64..=total))
        .prop_flat_map(|(total, arable)| (Just(total), Just(arable), 0i64..=(total - arable)))
        .prop_map(|(total, arable, vegetation)| {
            (
                Decimal::new(total, 2),
                Decimal::new(arable, 2),
                Decimal::new(vegetation, 2),
            )
        })
}
