//! Turn endpoints.
//!
//! POST /api/v1/sessions/{id}/messages        - run one turn, JSON reply
//! POST /api/v1/sessions/{id}/messages/stream - run one turn as SSE
//!
//! SSE event types:
//! - `text_delta` - incremental text: `{ "text": "..." }`
//! - `usage` - token usage: `{ "input_tokens": N, "output_tokens": N }`
//! - `farewell` - exit keyword reply: `{ "text": "..." }`
//! - `error` - the turn failed: `{ "message": "..." }`
//! - `done` - the committed turn outcome
//!
//! The session lock is held for the whole turn, so turns within one session
//! never overlap.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use gupshup_core::chat::{Reply, TurnOutcome, TurnPlan};
use gupshup_observe::genai_attrs::{chat_turn_span, record_usage};
use gupshup_types::chat::TranscriptEntry;
use gupshup_types::llm::StreamEvent;

use crate::http::error::AppError;
use crate::http::handlers::session::lookup;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for both turn endpoints.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// A committed turn and the transcript entries it appended.
#[derive(Debug, Serialize)]
pub struct TurnView {
    #[serde(flatten)]
    pub outcome: TurnOutcome,
    pub entries: Vec<TranscriptEntry>,
    pub turn_count: u32,
    pub memory_len: usize,
}

/// POST /api/v1/sessions/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<TurnView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let (id, shared) = lookup(&state, &session_id)?;
    let mut session = shared.lock().await;
    let before = session.transcript().len();

    let span = chat_turn_span(id);
    let outcome = state
        .controller
        .submit(&mut session, &body.message)
        .instrument(span.clone())
        .await;
    if let TurnOutcome::Responded { usage, .. } = &outcome {
        record_usage(&span, usage.input_tokens, usage.output_tokens);
    }

    let view = TurnView {
        outcome,
        entries: session.transcript().since(before).to_vec(),
        turn_count: session.turn_count(),
        memory_len: session.memory().len(),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(view, request_id, elapsed)
        .with_link("session", &format!("/api/v1/sessions/{id}"));
    Ok(Json(resp))
}

fn sse_event(name: &str, data: &impl Serialize) -> Event {
    Event::default()
        .event(name)
        .json_data(data)
        .unwrap_or_else(|_| Event::default().event(name).data("{}"))
}

/// POST /api/v1/sessions/{id}/messages/stream
///
/// The turn is committed after the model stream ends; the final `done`
/// event carries the same outcome the JSON endpoint would return.
pub async fn stream_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let (id, shared) = lookup(&state, &session_id)?;
    let mut session = shared.lock_owned().await;
    let controller = Arc::clone(&state.controller);
    let input = body.message;
    let plan = controller.plan(&session, &input);

    let sse_stream = async_stream::stream! {
        let span = chat_turn_span(id);

        let outcome = match plan {
            TurnPlan::Ignore => TurnOutcome::Ignored,
            TurnPlan::Exit { farewell } => {
                yield Ok::<_, Infallible>(sse_event("farewell", &serde_json::json!({ "text": farewell })));
                span.in_scope(|| controller.commit_exit(&mut session, &input))
            }
            TurnPlan::Generate { request } => {
                let mut llm_stream = controller.stream(request);
                let mut reply = Reply::default();
                let mut failure = None;

                while let Some(event) = llm_stream.next().await {
                    match event {
                        Ok(StreamEvent::Done) => break,
                        Ok(event) => {
                            match &event {
                                StreamEvent::TextDelta { text } => {
                                    yield Ok(sse_event("text_delta", &serde_json::json!({ "text": text })));
                                }
                                StreamEvent::Usage(usage) => {
                                    yield Ok(sse_event("usage", usage));
                                }
                                StreamEvent::Connected | StreamEvent::MessageDelta { .. } => {}
                                StreamEvent::Done => {}
                            }
                            reply.absorb(&event);
                        }
                        Err(err) => {
                            failure = Some(err);
                            break;
                        }
                    }
                }

                let result = match failure {
                    Some(err) => Err(err),
                    None => Ok(reply),
                };
                let outcome = span.in_scope(|| controller.commit(&mut session, &input, result));
                match &outcome {
                    TurnOutcome::Failed { message, .. } => {
                        yield Ok(sse_event("error", &serde_json::json!({ "message": message })));
                    }
                    TurnOutcome::Responded { usage, .. } => {
                        record_usage(&span, usage.input_tokens, usage.output_tokens);
                    }
                    TurnOutcome::Ignored | TurnOutcome::Farewell { .. } => {}
                }
                outcome
            }
        };

        yield Ok(sse_event("done", &outcome));
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

#[cfg(test)]
mod tests {
    use super::*;

    use gupshup_types::llm::Usage;

    #[test]
    fn test_turn_view_flattens_outcome_tag() {
        let view = TurnView {
            outcome: TurnOutcome::Responded {
                text: "Ji bilkul".to_string(),
                usage: Usage {
                    input_tokens: 4,
                    output_tokens: 2,
                },
            },
            entries: vec![TranscriptEntry::user("Hello"), TranscriptEntry::assistant("Ji bilkul")],
            turn_count: 1,
            memory_len: 2,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["outcome"], "responded");
        assert_eq!(json["text"], "Ji bilkul");
        assert_eq!(json["usage"]["output_tokens"], 2);
        assert_eq!(json["entries"].as_array().unwrap().len(), 2);
        assert_eq!(json["memory_len"], 2);
    }

    #[test]
    fn test_request_body_requires_message() {
        assert!(serde_json::from_str::<SendMessageRequest>("{}").is_err());
        let body: SendMessageRequest = serde_json::from_str(r#"{"message":"Hi"}"#).unwrap();
        assert_eq!(body.message, "Hi");
    }
}
