//! API error handling
//!
//! [`ApiError`] is the only place where domain and port errors become HTTP
//! responses. Validation errors keep the shape clients rely on: a map from
//! field name to messages, with object-level messages under
//! `non_field_errors` and everything raised by the farm nested under
//! `fazenda`.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_rural::error::FARM_KEY;
use domain_rural::{RuralError, ValidationErrors};
use domain_users::UserError;

use crate::auth::AuthError;

const NOT_FOUND: &str = "Não encontrado.";
const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
const TOKEN_NOT_VALID: &str = "token_not_valid";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// Producer request broke one or more rules
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Field errors of a request outside the producer resource
    #[error("Invalid fields: {0:?}")]
    FieldErrors(BTreeMap<String, Vec<String>>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Authentication credentials were not provided")]
    NotAuthenticated,

    #[error("Access token rejected")]
    InvalidToken,

    #[error("Refresh token rejected")]
    RefreshRejected,

    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("Logout token rejected")]
    LogoutRejected,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Error response body for everything but field errors
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ErrorResponse {
    fn detail(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: None,
        }
    }

    fn token_not_valid(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: Some(TOKEN_NOT_VALID),
        }
    }
}

/// Builds the nested field-error payload
pub fn validation_body(errors: &ValidationErrors) -> Value {
    let mut body = Map::new();
    for (location, error) in errors.iter() {
        let target = if location.is_farm() {
            let farm = body
                .entry(FARM_KEY)
                .or_insert_with(|| Value::Object(Map::new()));
            if !farm.is_object() {
                *farm = Value::Object(Map::new());
            }
            match farm.as_object_mut() {
                Some(map) => map,
                None => continue,
            }
        } else {
            &mut body
        };

        let messages = target
            .entry(location.key())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = messages {
            list.push(Value::String(error.to_string()));
        }
    }
    Value::Object(body)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(validation_body(&errors))).into_response()
            }
            ApiError::FieldErrors(fields) => {
                (StatusCode::BAD_REQUEST, Json(json!(fields))).into_response()
            }
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::detail(detail))).into_response()
            }
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse::detail(NOT_FOUND))).into_response()
            }
            ApiError::NotAuthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::detail(NOT_AUTHENTICATED)),
            )
                .into_response(),
            ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::token_not_valid(
                    "Given token not valid for any token type",
                )),
            )
                .into_response(),
            ApiError::RefreshRejected => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::token_not_valid("Token is invalid or expired")),
            )
                .into_response(),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::detail(
                    "No active account found with the given credentials",
                )),
            )
                .into_response(),
            ApiError::LogoutRejected => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::detail("Invalid token")),
            )
                .into_response(),
            ApiError::Conflict(detail) => {
                (StatusCode::CONFLICT, Json(ErrorResponse::detail(detail))).into_response()
            }
            ApiError::Internal(message) => {
                error!(error = %message, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::detail("A server error occurred.")),
                )
                    .into_response()
            }
            ApiError::Unavailable(message) => {
                error!(error = %message, "Storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorResponse::detail("Service temporarily unavailable.")),
                )
                    .into_response()
            }
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound,
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Validation { message, .. } => ApiError::BadRequest(message),
            err @ PortError::Connection { .. } => ApiError::Unavailable(err.to_string()),
            err => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<RuralError> for ApiError {
    fn from(err: RuralError) -> Self {
        match err {
            RuralError::Validation(errors) => ApiError::Validation(errors),
            RuralError::ProducerNotFound(_) => ApiError::NotFound,
            RuralError::Conflict(message) => ApiError::Conflict(message),
            RuralError::Storage(port) => port.into(),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidCredentials => ApiError::InvalidCredentials,
            UserError::NotFound(_) | UserError::Inactive(_) => ApiError::InvalidToken,
            UserError::EmailTaken(email) => {
                ApiError::Conflict(format!("A user with e-mail {email} already exists"))
            }
            UserError::Storage(port) => port.into(),
            UserError::Hashing(message) => ApiError::Internal(message),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Encoding(message) => ApiError::Internal(message),
            _ => ApiError::InvalidToken,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map_or_else(|| e.code.to_string(), |m| m.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::FieldErrors(fields)
    }
}

/// JSON body extractor whose rejection is an [`ApiError`]
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
