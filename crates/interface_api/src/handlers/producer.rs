//! Rural producer handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use core_kernel::ProducerId;

use crate::dto::producer::{ProducerRequest, ProducerResponse};
use crate::error::{ApiError, ApiJson};
use crate::AppState;

/// Ids that do not parse cannot exist
fn parse_id(raw: &str) -> Result<ProducerId, ApiError> {
    raw.parse().map_err(|_| {
        debug!(id = %raw, "Malformed producer id");
        ApiError::NotFound
    })
}

/// Lists producers
pub async fn list_producers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProducerResponse>>, ApiError> {
    let producers = state.producers.list().await?;
    Ok(Json(producers.into_iter().map(ProducerResponse::from).collect()))
}

/// Creates a producer together with its farm
pub async fn create_producer(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ProducerRequest>,
) -> Result<(StatusCode, Json<ProducerResponse>), ApiError> {
    let producer = state.producers.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(producer.into())))
}

/// Gets a producer by ID
pub async fn get_producer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProducerResponse>, ApiError> {
    let producer = state.producers.get(parse_id(&id)?).await?;
    Ok(Json(producer.into()))
}

/// Replaces a producer and its farm
pub async fn replace_producer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ProducerRequest>,
) -> Result<Json<ProducerResponse>, ApiError> {
    let producer = state.producers.replace(parse_id(&id)?, request.into()).await?;
    Ok(Json(producer.into()))
}

/// Updates the supplied fields only
pub async fn partial_update_producer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ProducerRequest>,
) -> Result<Json<ProducerResponse>, ApiError> {
    let producer = state
        .producers
        .partial_update(parse_id(&id)?, request.into())
        .await?;
    Ok(Json(producer.into()))
}

/// Deletes a producer; the farm stays
pub async fn delete_producer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.producers.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
