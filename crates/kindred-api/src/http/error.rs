//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use kindred_types::error::{
    ChatError, GenerateError, ImageError, ProfileError, RepositoryError, SessionError,
};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Profile(ProfileError),
    Session(SessionError),
    Chat(ChatError),
    Image(ImageError),
    /// Resource lookup failure outside the domain errors.
    NotFound(String),
    /// Request validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ProfileError> for AppError {
    fn from(e: ProfileError) -> Self {
        AppError::Profile(e)
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        AppError::Image(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Profile(ProfileError::EmptyName) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self_msg(&self))
            }
            AppError::Profile(ProfileError::InvalidKind(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self_msg(&self))
            }
            AppError::Profile(ProfileError::Protected(_)) => {
                (StatusCode::CONFLICT, "PROTECTED_PROFILE", self_msg(&self))
            }
            AppError::Profile(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROFILE_ERROR", e.to_string())
            }
            AppError::Session(SessionError::EmptyName) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self_msg(&self))
            }
            AppError::Session(SessionError::UnknownProfile { .. }) => {
                (StatusCode::CONFLICT, "UNKNOWN_PROFILE", self_msg(&self))
            }
            AppError::Session(SessionError::NotFound) => {
                (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", self_msg(&self))
            }
            AppError::Session(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR", e.to_string())
            }
            AppError::Chat(ChatError::NoModelLoaded) => {
                (StatusCode::SERVICE_UNAVAILABLE, "NO_MODEL_LOADED", self_msg(&self))
            }
            AppError::Chat(ChatError::Generation(GenerateError::Timeout(_))) => {
                (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT", self_msg(&self))
            }
            AppError::Chat(ChatError::Generation(GenerateError::Cancelled)) => (
                // 499 Client Closed Request (nginx convention)
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "GENERATION_CANCELLED",
                self_msg(&self),
            ),
            AppError::Chat(e) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR", e.to_string())
            }
            AppError::Image(ImageError::StepsOutOfRange(_)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self_msg(&self))
            }
            AppError::Image(ImageError::Backend(_)) => {
                (StatusCode::BAD_GATEWAY, "IMAGE_BACKEND_ERROR", self_msg(&self))
            }
            AppError::Image(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "IMAGE_ERROR", e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": uuid::Uuid::now_v7().to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

fn self_msg(err: &AppError) -> String {
    match err {
        AppError::Profile(e) => e.to_string(),
        AppError::Session(e) => e.to_string(),
        AppError::Chat(e) => e.to_string(),
        AppError::Image(e) => e.to_string(),
        AppError::NotFound(m) | AppError::Validation(m) | AppError::Internal(m) => m.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_profile_maps_to_conflict() {
        let resp = AppError::Profile(ProfileError::Protected("Guest".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_empty_name_maps_to_bad_request() {
        let resp = AppError::Session(SessionError::EmptyName).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_no_model_maps_to_service_unavailable() {
        let resp = AppError::Chat(ChatError::NoModelLoaded).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_steps_out_of_range_maps_to_bad_request() {
        let resp = AppError::Image(ImageError::StepsOutOfRange(0)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_session_not_found_maps_to_not_found() {
        let resp = AppError::Session(SessionError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cancelled_generation_is_not_a_backend_failure() {
        let resp =
            AppError::Chat(ChatError::Generation(GenerateError::Cancelled)).into_response();
        assert_eq!(resp.status().as_u16(), 499);

        let resp = AppError::Chat(ChatError::Generation(GenerateError::Backend(
            "boom".to_string(),
        )))
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
