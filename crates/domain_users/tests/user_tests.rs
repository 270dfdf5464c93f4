//! Integration tests for domain_users

use domain_users::password::{hash_password, verify_password};
use domain_users::{normalize_email, UserError};

#[test]
fn test_normalized_email_is_stable() {
    let once = normalize_email("Maria.Silva@Fazenda.COM.br").unwrap();
    assert_eq!(once, "Maria.Silva@fazenda.com.br");
    assert_eq!(normalize_email(&once).unwrap(), once);
}

#[test]
fn test_email_with_several_at_signs_splits_on_last() {
    assert_eq!(
        normalize_email("\"a@b\"@Exemplo.com").unwrap(),
        "\"a@b\"@exemplo.com"
    );
}

#[test]
fn test_missing_email() {
    assert!(matches!(normalize_email(""), Err(UserError::EmailRequired)));
}

#[test]
fn test_each_hash_is_salted() {
    let first = hash_password("pass", 4).unwrap();
    let second = hash_password("pass", 4).unwrap();
    assert_ne!(first, second);
    assert!(verify_password("pass", &first));
    assert!(verify_password("pass", &second));
}
