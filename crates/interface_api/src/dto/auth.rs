//! Token DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(required(message = "This field is required."), length(min = 1, message = "This field may not be blank."))]
    pub email: Option<String>,
    #[validate(required(message = "This field is required."), length(min = 1, message = "This field may not be blank."))]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(required(message = "This field is required."), length(min = 1, message = "This field may not be blank."))]
    pub refresh: Option<String>,
}

/// Logout body; a missing token is rejected like an invalid one
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access: String,
}
