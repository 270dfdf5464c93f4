//! Authentication tokens
//!
//! Clients exchange their credentials for a short-lived access token and a
//! long-lived refresh token. Both are HS256 JWTs signed with the configured
//! secret and carry a `token_type` claim, so a refresh token is never accepted
//! where an access token is expected and vice versa. Every token has a random
//! `jti`, which is what logout revokes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::UserId;

use crate::config::ApiConfig;

/// Kind of token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub token_type: TokenType,
    /// Unique token id
    pub jti: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// The user the token was issued to
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Expected a {expected:?} token")]
    WrongTokenType { expected: TokenType },
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// An access and refresh token issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier
/// * `token_type` - Access or refresh
/// * `secret` - JWT secret key
/// * `ttl_secs` - Token validity in seconds
pub fn create_token(
    user_id: UserId,
    token_type: TokenType,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    let exp = now
        .checked_add_signed(Duration::seconds(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let claims = Claims {
        sub: user_id.to_string(),
        token_type,
        jti: Uuid::new_v4().simple().to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encoding(e.to_string()))
}

/// Issues a fresh access and refresh token for a user
pub fn issue_token_pair(user_id: UserId, config: &ApiConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access: create_token(
            user_id,
            TokenType::Access,
            &config.jwt_secret,
            config.access_token_ttl_secs,
        )?,
        refresh: create_token(
            user_id,
            TokenType::Refresh,
            &config.jwt_secret,
            config.refresh_token_ttl_secs,
        )?,
    })
}

/// Validates a JWT token
///
/// # Arguments
///
/// * `token` - The JWT token to validate
/// * `secret` - JWT secret key
/// * `expected` - The token type the caller accepts
pub fn validate_token(token: &str, secret: &str, expected: TokenType) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.token_type != expected {
        return Err(AuthError::WrongTokenType { expected });
    }
    Ok(token_data.claims)
}
