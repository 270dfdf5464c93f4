//! Token handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::auth::{create_token, issue_token_pair, validate_token, TokenType};
use crate::dto::auth::{
    AccessTokenResponse, LogoutRequest, RefreshRequest, TokenPairResponse, TokenRequest,
};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

/// Exchanges credentials for an access and refresh token
pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    request.validate()?;
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let user = state.users.authenticate(&email, &password).await?;
    let pair = issue_token_pair(user.id, &state.config)?;
    info!(user_id = %user.id, "Token pair issued");

    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// Issues a new access token for a refresh token that was not revoked
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    request.validate()?;
    let token = request.refresh.unwrap_or_default();

    let claims = validate_token(&token, &state.config.jwt_secret, TokenType::Refresh)
        .map_err(|e| {
            debug!(error = %e, "Refresh token rejected");
            ApiError::RefreshRejected
        })?;
    if state.blacklist.is_revoked(&claims.jti).await? {
        warn!(jti = %claims.jti, "Revoked refresh token presented");
        return Err(ApiError::RefreshRejected);
    }

    let user_id = claims.user_id().map_err(|_| ApiError::RefreshRejected)?;
    let user = state.users.get_active(user_id).await.map_err(|e| match ApiError::from(e) {
        ApiError::InvalidToken => ApiError::RefreshRejected,
        other => other,
    })?;

    let access = create_token(
        user.id,
        TokenType::Access,
        &state.config.jwt_secret,
        state.config.access_token_ttl_secs,
    )?;
    Ok(Json(AccessTokenResponse { access }))
}

/// Revokes a refresh token
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    let claims = validate_token(
        &request.refresh_token,
        &state.config.jwt_secret,
        TokenType::Refresh,
    )
    .map_err(|e| {
        debug!(error = %e, "Logout token rejected");
        ApiError::LogoutRejected
    })?;
    if state.blacklist.is_revoked(&claims.jti).await? {
        return Err(ApiError::LogoutRejected);
    }

    state.blacklist.revoke(&claims.jti, claims.expires_at()).await?;
    info!(user = %claims.sub, "Refresh token revoked");

    match state.blacklist.purge_expired(Utc::now()).await {
        Ok(0) => {}
        Ok(purged) => debug!(purged, "Expired revocations purged"),
        Err(e) => warn!(error = %e, "Could not purge expired revocations"),
    }

    Ok(StatusCode::RESET_CONTENT)
}
