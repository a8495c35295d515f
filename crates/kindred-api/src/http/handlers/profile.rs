//! Profile CRUD handlers for the REST API.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;

use kindred_core::repository::profile::ProfileRepository;
use kindred_types::error::ProfileError;
use kindred_types::profile::{ProfileData, ProfileKind, SessionContext};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn parse_kind(raw: &str) -> Result<ProfileKind, AppError> {
    raw.parse::<ProfileKind>()
        .map_err(|e| AppError::Profile(ProfileError::InvalidKind(e)))
}

/// GET /api/v1/profiles/:kind - List profiles of a kind.
pub async fn list_profiles(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let kind = parse_kind(&kind)?;
    let profiles = state.profile_service.profile_repo().list(kind).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let profiles_json: Vec<serde_json::Value> = profiles
        .iter()
        .filter_map(|p| serde_json::to_value(p).ok())
        .collect();

    Ok(Json(ApiResponse::success(profiles_json, request_id, elapsed)))
}

/// GET /api/v1/profiles/:kind/:name - Get a profile by name.
pub async fn get_profile(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let kind = parse_kind(&kind)?;
    let profile = state
        .profile_service
        .profile_repo()
        .get(kind, &name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no {kind} profile named '{name}'")))?;
    let elapsed = start.elapsed().as_millis() as u64;

    let profile_json = serde_json::to_value(&profile)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(profile_json, request_id, elapsed)))
}

/// PUT /api/v1/profiles/:kind/:name - Create or update a profile.
pub async fn put_profile(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    Json(data): Json<ProfileData>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let kind = parse_kind(&kind)?;
    // Context sync is a per-conversation concern; profile writes through
    // the REST surface touch storage only.
    let mut ctx = SessionContext::default();
    let profile = state
        .profile_service
        .save(&mut ctx, kind, &name, data)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let profile_json = serde_json::to_value(&profile)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(profile_json, request_id, elapsed)))
}

/// DELETE /api/v1/profiles/:kind/:name - Delete a profile.
pub async fn delete_profile(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let kind = parse_kind(&kind)?;
    let mut ctx = SessionContext::default();
    state.profile_service.delete(&mut ctx, kind, &name).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": name }),
        request_id,
        elapsed,
    )))
}
