//! Dashboard handler

use axum::{extract::State, Json};

use crate::dto::graphics::GraphicsResponse;
use crate::error::ApiError;
use crate::AppState;

/// Farm totals, land use and distribution by crop and state
pub async fn farm_statistics(
    State(state): State<AppState>,
) -> Result<Json<GraphicsResponse>, ApiError> {
    let stats = state.producers.statistics().await?;
    Ok(Json(stats.into()))
}
