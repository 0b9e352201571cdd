//! Application error type mapping to HTTP status codes and envelope format.
//!
//! Model gateway failures are not HTTP errors: a failed turn is a normal
//! `200` response whose outcome is `failed`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// No live session with this id.
    SessionNotFound(Uuid),
    Validation(String),
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session {id} not found"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        let mut response =
            ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0).into_response();
        *response.status_mut() = status;
        response
    }
}
