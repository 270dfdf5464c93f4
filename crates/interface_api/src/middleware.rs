//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use domain_users::User;

use crate::auth::{validate_token, Claims, TokenType};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Requires a valid access token whose user still exists and is active, and
/// stores the claims and the [`User`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("Missing or invalid Authorization header");
            ApiError::NotAuthenticated
        })?;

    let claims = validate_token(token, &state.config.jwt_secret, TokenType::Access)
        .map_err(|e| {
            warn!(error = %e, "Token validation failed");
            ApiError::InvalidToken
        })?;

    let user = state.users.get_active(claims.user_id()?).await.map_err(|e| {
        warn!(error = %e, "Token user rejected");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs every protected request with the authenticated user.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<User>()
        .map(|u| u.id.to_string())
        .or_else(|| request.extensions().get::<Claims>().map(|c| c.sub.clone()))
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
