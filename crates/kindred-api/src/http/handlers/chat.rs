//! Conversation handlers for the REST API.
//!
//! Conversations are server-side state: each one pairs a `ChatEngine` with
//! its `SessionContext`, keyed by id in the state's DashMap. The map stores
//! `Arc<Mutex<..>>` entries so the map guard is dropped before any await.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use kindred_core::chat::engine::ChatEngine;
use kindred_types::profile::{ProfileKind, SessionContext};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::{AppState, Conversation};

#[derive(Deserialize, Default)]
pub struct CreateConversationRequest {
    /// Chatbot profile name to load (defaults to the kind default).
    #[serde(default)]
    pub chatbot: Option<String>,
    /// User profile name to load (defaults to the kind default).
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

#[derive(Deserialize)]
pub struct SaveConversationRequest {
    pub session_name: String,
}

#[derive(Deserialize)]
pub struct LoadConversationRequest {
    pub session_id: Uuid,
}

fn conversation(
    state: &AppState,
    id: &Uuid,
) -> Result<Arc<Mutex<Conversation>>, AppError> {
    state
        .conversations
        .get(id)
        .map(|entry| Arc::clone(entry.value()))
        .ok_or_else(|| AppError::NotFound(format!("no conversation with id {id}")))
}

/// POST /api/v1/conversations - Start a conversation.
pub async fn create_conversation(
    State(state): State<AppState>,
    Json(body): Json<CreateConversationRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let mut ctx = SessionContext::default();
    if let Some(name) = &body.chatbot {
        ctx.chatbot = state.profile_service.load(ProfileKind::Chatbot, name).await?;
    }
    if let Some(name) = &body.user {
        ctx.user = state.profile_service.load(ProfileKind::User, name).await?;
    }

    let id = Uuid::now_v7();
    let conversation = Conversation {
        engine: ChatEngine::with_generator(Arc::clone(&state.generator)),
        ctx: ctx.clone(),
    };
    state
        .conversations
        .insert(id, Arc::new(Mutex::new(conversation)));
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "conversation_id": id, "context": ctx }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/conversations/:id/messages - Send a message, get the reply.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<PostMessageRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    if body.content.trim().is_empty() {
        return Err(AppError::Validation("message content cannot be empty".to_string()));
    }

    let entry = conversation(&state, &id)?;
    let mut conv = entry.lock().await;
    let opts = state.generate_options();
    let Conversation { engine, ctx } = &mut *conv;
    let reply = engine.respond(ctx, &body.content, &opts).await?;
    let turns = engine.turn_count();
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "reply": reply, "turns": turns }),
        request_id,
        elapsed,
    )))
}

/// GET /api/v1/conversations/:id/history - The transcript so far.
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let entry = conversation(&state, &id)?;
    let conv = entry.lock().await;
    let history = conv.engine.history();
    let ctx = conv.ctx.clone();
    drop(conv);
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "context": ctx, "messages": history }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/conversations/:id/reset - Clear the transcript.
pub async fn reset_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let entry = conversation(&state, &id)?;
    entry.lock().await.engine.reset();
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "reset": true }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/conversations/:id/save - Persist the transcript as a session.
pub async fn save_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SaveConversationRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let entry = conversation(&state, &id)?;
    let mut conv = entry.lock().await;
    let Conversation { engine, ctx } = &mut *conv;
    let session_id = engine
        .save_history(state.profile_service.as_ref(), ctx, &body.session_name)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "session_id": session_id, "session_name": body.session_name }),
        request_id,
        elapsed,
    )))
}

/// POST /api/v1/conversations/:id/load - Replace state from a saved session.
pub async fn load_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<LoadConversationRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let entry = conversation(&state, &id)?;
    let mut conv = entry.lock().await;
    let Conversation { engine, ctx } = &mut *conv;
    engine
        .load_history(state.profile_service.as_ref(), ctx, &body.session_id)
        .await?;
    let turns = engine.turn_count();
    let context = ctx.clone();
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "context": context, "turns": turns }),
        request_id,
        elapsed,
    )))
}

/// DELETE /api/v1/conversations/:id - Discard a conversation.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    state
        .conversations
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("no conversation with id {id}")))?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
        request_id,
        elapsed,
    )))
}
