//! Integration tests for domain_rural

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_rural::farm::{check_area_precision, exceeds_total, FarmAreas};
use domain_rural::tax_id::{
    is_valid_company_id, is_valid_individual_id, validate_company_id, validate_individual_id,
    TaxIdError,
};
use domain_rural::{ErrorLocation, ProducerInput, ValidationError, WriteMode};
use test_utils::generators::{
    any_format_cpf_strategy, complete_cnpj, complete_cpf, format_cnpj, format_cpf,
    hectares_strategy, repeated_digits_strategy, valid_areas_strategy, valid_cnpj_strategy,
    valid_cpf_strategy,
};

/// Replaces the digit at `position` with a different one
fn shift_digit(value: &str, position: usize, shift: u8) -> String {
    value
        .char_indices()
        .map(|(i, c)| match (i == position, c.to_digit(10)) {
            (true, Some(d)) => char::from(b'0' + (d as u8 + shift) % 10),
            _ => c,
        })
        .collect()
}

// ============================================================================
// Tax ID Tests
// ============================================================================

mod tax_id_tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        for cpf in ["12345678909", "52998224725", "11144477735"] {
            assert!(is_valid_individual_id(cpf), "{cpf}");
        }
        for cnpj in ["40993392000151", "12345678000195", "11222333000181"] {
            assert!(is_valid_company_id(cnpj), "{cnpj}");
        }
        for cnpj in ["15645628153156", "12345678123456", "12345678"] {
            assert!(!is_valid_company_id(cnpj), "{cnpj}");
        }
        assert!(!is_valid_individual_id("12345678910"));
    }

    #[test]
    fn test_generated_check_digits_match_known_vectors() {
        assert_eq!(complete_cpf([1, 2, 3, 4, 5, 6, 7, 8, 9]), "12345678909");
        assert_eq!(complete_cnpj([4, 0, 9, 9, 3, 3, 9, 2, 0, 0, 0, 1]), "40993392000151");
    }

    #[test]
    fn test_letters_are_ignored_by_length_check() {
        assert_eq!(
            validate_individual_id("abc"),
            Err(TaxIdError::WrongLength { expected: 11, found: 0 })
        );
    }
}

// ============================================================================
// Request Cleaning Tests
// ============================================================================

mod request_tests {
    use super::*;

    #[test]
    fn test_partial_request_needs_nothing() {
        let (changes, errors) = ProducerInput::default().clean(WriteMode::Partial);
        assert!(errors.is_empty());
        assert_eq!(changes.name, None);
        assert_eq!(changes.farm, None);
    }

    #[test]
    fn test_null_identifier_on_create_is_not_a_field_error() {
        let input = ProducerInput {
            name: Some("Produtor".to_string()),
            cpf: Some(None),
            cnpj: Some(None),
            farm: None,
        };
        let (_, errors) = input.clean(WriteMode::Create);
        assert!(errors.at(ErrorLocation::ProducerField("cpf")).is_empty());
        assert!(errors.at(ErrorLocation::ProducerField("cnpj")).is_empty());
        assert_eq!(
            errors.at(ErrorLocation::ProducerField("fazenda")),
            vec![&ValidationError::Required]
        );
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn generated_cpf_validates(cpf in any_format_cpf_strategy()) {
            prop_assert!(validate_individual_id(&cpf).is_ok());
        }

        #[test]
        fn corrupted_cpf_check_digit_fails(
            cpf in valid_cpf_strategy(),
            position in 9usize..11,
            shift in 1u8..10,
        ) {
            prop_assert!(validate_individual_id(&shift_digit(&cpf, position, shift)).is_err());
        }

        #[test]
        fn cpf_validator_agrees_with_check_digits(
            base in proptest::array::uniform9(0u8..10),
            first in 0u8..10,
            second in 0u8..10,
        ) {
            let candidate: String = base
                .iter()
                .chain([first, second].iter())
                .map(|d| char::from(b'0' + d))
                .collect();
            let uniform = candidate.chars().all(|c| candidate.starts_with(c));
            let expected = !uniform && complete_cpf(base) == candidate;
            prop_assert_eq!(is_valid_individual_id(&candidate), expected);
        }

        #[test]
        fn corrupted_cnpj_check_digit_fails(
            cnpj in valid_cnpj_strategy(),
            position in 12usize..14,
            shift in 1u8..10,
        ) {
            prop_assert!(validate_company_id(&format_cnpj(&cnpj)).is_ok());
            prop_assert!(validate_company_id(&shift_digit(&cnpj, position, shift)).is_err());
        }

        #[test]
        fn repeated_digits_always_rejected(
            cpf in repeated_digits_strategy(11),
            cnpj in repeated_digits_strategy(14),
        ) {
            prop_assert_eq!(validate_individual_id(&cpf), Err(TaxIdError::RepeatedDigits));
            prop_assert_eq!(validate_company_id(&cnpj), Err(TaxIdError::RepeatedDigits));
        }

        #[test]
        fn padded_formatted_identifiers_clean_to_digits(cpf in valid_cpf_strategy()) {
            let input = ProducerInput {
                cpf: Some(Some(format!("  {} ", format_cpf(&cpf)))),
                ..ProducerInput::default()
            };
            let (changes, errors) = input.clean(WriteMode::Partial);
            prop_assert!(errors.is_empty());
            prop_assert_eq!(changes.cpf, Some(Some(cpf)));
        }

        #[test]
        fn stored_precision_always_accepted(value in hectares_strategy()) {
            prop_assert!(check_area_precision(value).is_ok());
        }

        #[test]
        fn valid_areas_never_exceed_total(areas in valid_areas_strategy()) {
            let (total, arable, vegetation) = areas;
            prop_assert!(FarmAreas::new(total, arable, vegetation).validate().is_ok());
        }

        #[test]
        fn exceeds_total_matches_sum(
            arable in 0i64..10_000_000,
            vegetation in 0i64..10_000_000,
            total in 0i64..20_000_000,
        ) {
            let (a, v, t) = (Decimal::new(arable, 2), Decimal::new(vegetation, 2), Decimal::new(total, 2));
            prop_assert_eq!(exceeds_total(a, v, t), a + v > t);
            prop_assert!(!exceeds_total(a, v, a + v));
            prop_assert_eq!(FarmAreas::new(t, a, v).validate().is_err(), a + v > t);
        }
    }

    #[test]
    fn boundary_equality_allowed() {
        assert!(!exceeds_total(dec!(80), dec!(20), dec!(100)));
    }
}
