//! Custom Test Assertions
//!
//! Helpers for the JSON error payloads returned by the API. They give more
//! meaningful failure messages than indexing into a `serde_json::Value`.

use serde_json::Value;

/// Returns the message list at `path`, or an empty list
pub fn error_messages(body: &Value, path: &[&str]) -> Vec<String> {
    let mut node = body;
    for key in path {
        match node.get(key) {
            Some(next) => node = next,
            None => return Vec::new(),
        }
    }
    node.as_array()
        .map(|messages| {
            messages
                .iter()
                .filter_map(|m| m.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Asserts that the message list at `path` contains `expected`
///
/// # Panics
///
/// Panics with the full body if the message is missing
pub fn assert_error_at(body: &Value, path: &[&str], expected: &str) {
    let messages = error_messages(body, path);
    assert!(
        messages.iter().any(|m| m == expected),
        "Expected {:?} at {}, body was {}",
        expected,
        path.join("."),
        body
    );
}

/// Asserts a top-level `non_field_errors` message
pub fn assert_non_field_error(body: &Value, expected: &str) {
    assert_error_at(body, &["non_field_errors"], expected);
}

/// Asserts a `non_field_errors` message nested under `fazenda`
pub fn assert_farm_non_field_error(body: &Value, expected: &str) {
    assert_error_at(body, &["fazenda", "non_field_errors"], expected);
}

/// Asserts that nothing was reported under `key`
pub fn assert_no_errors_at(body: &Value, key: &str) {
    assert!(
        body.get(key).is_none(),
        "Expected no errors at {}, body was {}",
        key,
        body
    );
}

/// Asserts `{"detail": expected}`
pub fn assert_detail(body: &Value, expected: &str) {
    assert_eq!(
        body.get("detail").and_then(Value::as_str),
        Some(expected),
        "Unexpected detail, body was {}",
        body
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lookup() {
        let body = json!({"fazenda": {"non_field_errors": ["a", "b"]}, "cpf": ["CPF inválido."]});
        assert_farm_non_field_error(&body, "b");
        assert_error_at(&body, &["cpf"], "CPF inválido.");
        assert_no_errors_at(&body, "non_field_errors");
        assert!(error_messages(&body, &["cnpj"]).is_empty());
    }

    #[test]
    #[should_panic(expected = "Expected")]
    fn test_missing_message_panics() {
        assert_non_field_error(&json!({}), "anything");
    }
}
