//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions            - Start a session (welcome seeded)
//! - GET    /api/v1/sessions/{id}       - Session with transcript
//! - DELETE /api/v1/sessions/{id}       - Drop a session
//! - POST   /api/v1/sessions/{id}/clear - Forget memory, keep transcript

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gupshup_core::chat::ChatSession;
use gupshup_types::chat::TranscriptEntry;
use gupshup_types::llm::Usage;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::{AppState, SharedSession};

/// Session as returned by the API.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub persona: String,
    pub started_at: DateTime<Utc>,
    pub turn_count: u32,
    pub usage: Usage,
    pub memory_len: usize,
    pub memory_capacity: usize,
    pub transcript: Vec<TranscriptEntry>,
}

impl From<&ChatSession> for SessionView {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id(),
            persona: session.persona().to_string(),
            started_at: session.started_at(),
            turn_count: session.turn_count(),
            usage: session.usage(),
            memory_len: session.memory().len(),
            memory_capacity: session.memory().capacity(),
            transcript: session.transcript().entries().to_vec(),
        }
    }
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

/// Resolve a path parameter to a live session.
pub(crate) fn lookup(state: &AppState, session_id: &str) -> Result<(Uuid, SharedSession), AppError> {
    let id = parse_uuid(session_id)?;
    let session = state.session(&id).ok_or(AppError::SessionNotFound(id))?;
    Ok((id, session))
}

fn session_response(view: SessionView, request_id: String, elapsed: u64) -> ApiResponse<SessionView> {
    let self_link = format!("/api/v1/sessions/{}", view.id);
    let messages_link = format!("{self_link}/messages");
    ApiResponse::success(view, request_id, elapsed)
        .with_link("self", &self_link)
        .with_link("messages", &messages_link)
}

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<SessionView>>) {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, shared) = state.open_session();
    let view = SessionView::from(&*shared.lock().await);
    tracing::info!(session_id = %id, persona = %view.persona, "Session created");

    let elapsed = start.elapsed().as_millis() as u64;
    (
        StatusCode::CREATED,
        Json(session_response(view, request_id, elapsed)),
    )
}

/// GET /api/v1/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (_, shared) = lookup(&state, &session_id)?;
    let view = SessionView::from(&*shared.lock().await);

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(session_response(view, request_id, elapsed)))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&session_id)?;
    if !state.close_session(&id) {
        return Err(AppError::SessionNotFound(id));
    }
    tracing::info!(session_id = %id, "Session deleted");

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(
        serde_json::json!({ "deleted": true, "id": id }),
        request_id,
        elapsed,
    );
    Ok(Json(resp))
}

/// POST /api/v1/sessions/{id}/clear
pub async fn clear_memory(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, shared) = lookup(&state, &session_id)?;
    let view = {
        let mut session = shared.lock().await;
        session.clear_memory();
        SessionView::from(&*session)
    };
    tracing::debug!(session_id = %id, "Session memory cleared");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(session_response(view, request_id, elapsed)))
}
