//! Saved-session read handlers for the REST API.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use kindred_core::repository::session::SessionRepository;
use kindred_types::error::SessionError;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/sessions - List saved sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state.profile_service.list_sessions().await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let sessions_json: Vec<serde_json::Value> = sessions
        .iter()
        .filter_map(|s| serde_json::to_value(s).ok())
        .collect();

    Ok(Json(ApiResponse::success(sessions_json, request_id, elapsed)))
}

/// GET /api/v1/sessions/:id - Get a full session record.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let record = state
        .profile_service
        .session_repo()
        .get(&id)
        .await?
        .ok_or(AppError::Session(SessionError::NotFound))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let record_json = serde_json::to_value(&record)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(record_json, request_id, elapsed)))
}

/// GET /api/v1/sessions/:id/messages - Get a session's transcript.
///
/// An unknown id yields an empty list, mirroring the repository contract.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let messages = state.profile_service.session_repo().messages(&id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let messages_json: Vec<serde_json::Value> = messages
        .iter()
        .filter_map(|m| serde_json::to_value(m).ok())
        .collect();

    Ok(Json(ApiResponse::success(messages_json, request_id, elapsed)))
}
