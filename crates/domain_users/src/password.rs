//! bcrypt password hashing
//!
//! Hashing is CPU bound, so the async wrappers move it to the blocking pool.

use crate::error::UserError;

/// Hashes a password with the given bcrypt cost
pub fn hash_password(password: &str, cost: u32) -> Result<String, UserError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Returns true if the password matches the hash
///
/// A malformed hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_async(password: String, cost: u32) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| UserError::Hashing(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_async(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret", 4).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("s3cret", "not-a-hash"));
    }
}
