//! Image generation handlers for the REST API.

use std::time::Instant;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use kindred_types::image::ImageRequest;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ImageHistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// POST /api/v1/images - Generate one image.
pub async fn generate_image(
    State(state): State<AppState>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let record = state.image_service.generate(&request).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let record_json = serde_json::to_value(&record)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(record_json, request_id, elapsed)))
}

/// GET /api/v1/images - Recent generations, newest first.
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ImageHistoryQuery>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let records = state.image_service.history(query.limit).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let records_json: Vec<serde_json::Value> = records
        .iter()
        .filter_map(|r| serde_json::to_value(r).ok())
        .collect();

    Ok(Json(ApiResponse::success(records_json, request_id, elapsed)))
}
