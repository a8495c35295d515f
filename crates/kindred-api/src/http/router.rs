//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Profiles
        .route("/profiles/{kind}", get(handlers::profile::list_profiles))
        .route(
            "/profiles/{kind}/{name}",
            get(handlers::profile::get_profile),
        )
        .route(
            "/profiles/{kind}/{name}",
            put(handlers::profile::put_profile),
        )
        .route(
            "/profiles/{kind}/{name}",
            delete(handlers::profile::delete_profile),
        )
        // Saved sessions
        .route("/sessions", get(handlers::session::list_sessions))
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::get_messages),
        )
        // Live conversations
        .route("/conversations", post(handlers::chat::create_conversation))
        .route(
            "/conversations/{id}",
            delete(handlers::chat::delete_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            post(handlers::chat::post_message),
        )
        .route(
            "/conversations/{id}/history",
            get(handlers::chat::get_history),
        )
        .route(
            "/conversations/{id}/reset",
            post(handlers::chat::reset_conversation),
        )
        .route(
            "/conversations/{id}/save",
            post(handlers::chat::save_conversation),
        )
        .route(
            "/conversations/{id}/load",
            post(handlers::chat::load_conversation),
        )
        // Images
        .route("/images", post(handlers::image::generate_image))
        .route("/images", get(handlers::image::list_images));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
