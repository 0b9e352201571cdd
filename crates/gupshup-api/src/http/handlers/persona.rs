//! Persona page HTTP handler.
//!
//! GET /api/v1/persona - page dressing for the running persona.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use gupshup_types::persona::PersonaPage;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Serialize)]
struct PersonaInfo<'a> {
    #[serde(flatten)]
    page: PersonaPage<'a>,
    model: &'a str,
    memory_window: usize,
    exit_keywords: &'a [String],
}

/// GET /api/v1/persona
pub async fn get_persona(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let controller = &state.controller;
    let info = PersonaInfo {
        page: controller.persona().page(),
        model: controller.model(),
        memory_window: state.memory_window,
        exit_keywords: controller.exit_keywords().as_slice(),
    };
    let data = serde_json::to_value(&info).map_err(|e| AppError::Internal(e.to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(data, request_id, elapsed)
        .with_link("self", "/api/v1/persona")
        .with_link("sessions", "/api/v1/sessions");

    Ok(Json(resp))
}
