//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
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
        .route("/persona", get(handlers::persona::get_persona))
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route(
            "/sessions/{id}/clear",
            post(handlers::session::clear_memory),
        )
        .route(
            "/sessions/{id}/messages",
            post(handlers::chat::send_message),
        )
        .route(
            "/sessions/{id}/messages/stream",
            post(handlers::chat::stream_message),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use gupshup_core::llm::{BoxLlmProvider, LlmProvider, LlmStream};
    use gupshup_core::persona;
    use gupshup_types::config::AppConfig;
    use gupshup_types::llm::{
        CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason,
        StreamEvent, Usage,
    };

    use super::*;

    // --- Mock provider ---

    #[derive(Clone)]
    enum Scripted {
        Text(String),
        Fail,
    }

    struct ScriptedProvider {
        capabilities: ProviderCapabilities,
        script: Mutex<VecDeque<Scripted>>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl ScriptedProvider {
        fn next(&self, request: &CompletionRequest) -> Scripted {
            self.requests.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Scripted::Text("default reply".to_string()))
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        fn complete(
            &self,
            request: &CompletionRequest,
        ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
            let next = self.next(request);
            let model = request.model.clone();
            async move {
                match next {
                    Scripted::Text(content) => Ok(CompletionResponse {
                        id: "resp-1".to_string(),
                        content,
                        model,
                        stop_reason: StopReason::EndTurn,
                        usage: Usage {
                            input_tokens: 12,
                            output_tokens: 6,
                        },
                    }),
                    Scripted::Fail => Err(LlmError::Overloaded("503".to_string())),
                }
            }
        }

        fn stream(&self, request: CompletionRequest) -> LlmStream {
            let next = self.next(&request);
            Box::pin(async_stream::stream! {
                match next {
                    Scripted::Text(content) => {
                        yield Ok(StreamEvent::Connected);
                        for word in content.split_inclusive(' ') {
                            yield Ok(StreamEvent::TextDelta { text: word.to_string() });
                        }
                        yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
                        yield Ok(StreamEvent::Usage(Usage { input_tokens: 8, output_tokens: 3 }));
                        yield Ok(StreamEvent::Done);
                    }
                    Scripted::Fail => {
                        yield Ok(StreamEvent::Connected);
                        yield Err(LlmError::Stream("connection dropped".to_string()));
                    }
                }
            })
        }
    }

    fn test_state(script: Vec<Scripted>) -> (AppState, Arc<Mutex<Vec<CompletionRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let provider = ScriptedProvider {
            capabilities: ProviderCapabilities {
                streaming: true,
                max_context_tokens: 1_000_000,
                max_output_tokens: 8192,
            },
            script: Mutex::new(script.into()),
            requests: Arc::clone(&requests),
        };
        let state = AppState::from_parts(
            &AppConfig::default(),
            persona::rishta(),
            BoxLlmProvider::new(provider),
        );
        (state, requests)
    }

    fn text(s: &str) -> Scripted {
        Scripted::Text(s.to_string())
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(router, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create_session(router: &Router) -> String {
        let (status, json) = send_json(router, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        json["data"]["id"].as_str().unwrap().to_string()
    }

    fn message(text: &str) -> Option<Value> {
        Some(serde_json::json!({ "message": text }))
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state(vec![]);
        let router = build_router(state);
        let (status, json) = send_json(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_persona_page_hides_system_prompt() {
        let (state, _) = test_state(vec![]);
        let router = build_router(state);
        let (status, json) = send_json(&router, "GET", "/api/v1/persona", None).await;
        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["slug"], "rishta");
        assert_eq!(data["memory_window"], 5);
        assert!(data["page_title"].is_string());
        assert!(data.get("system_prompt").is_none());
    }

    #[tokio::test]
    async fn test_create_session_seeds_welcome() {
        let (state, _) = test_state(vec![]);
        let router = build_router(state.clone());
        let (status, json) = send_json(&router, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);

        let data = &json["data"];
        assert_eq!(data["memory_len"], 1);
        assert_eq!(data["transcript"][0]["kind"], "welcome");
        assert_eq!(
            data["transcript"][0]["text"],
            persona::rishta().welcome_message.as_str()
        );
        assert_eq!(state.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404_envelope() {
        let (state, _) = test_state(vec![]);
        let router = build_router(state);
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::now_v7());
        let (status, json) = send_json(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["errors"][0]["code"], "SESSION_NOT_FOUND");
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_malformed_session_id_is_400() {
        let (state, _) = test_state(vec![]);
        let router = build_router(state);
        let (status, json) = send_json(&router, "GET", "/api/v1/sessions/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_send_message_responds_and_grows_memory() {
        let (state, requests) = test_state(vec![text("Assalam o Alaikum beta!")]);
        let router = build_router(state);
        let id = create_session(&router).await;

        let uri = format!("/api/v1/sessions/{id}/messages");
        let (status, json) = send_json(&router, "POST", &uri, message("Hello")).await;
        assert_eq!(status, StatusCode::OK);

        let data = &json["data"];
        assert_eq!(data["outcome"], "responded");
        assert_eq!(data["text"], "Assalam o Alaikum beta!");
        assert_eq!(data["usage"]["input_tokens"], 12);
        assert_eq!(data["memory_len"], 2);
        assert_eq!(data["turn_count"], 1);
        let entries = data["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["speaker"], "user");
        assert_eq!(entries[1]["speaker"], "assistant");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].last_user_turn().unwrap().content, "Hello");
    }

    #[tokio::test]
    async fn test_exit_keyword_skips_gateway() {
        let (state, requests) = test_state(vec![]);
        let router = build_router(state);
        let id = create_session(&router).await;

        let uri = format!("/api/v1/sessions/{id}/messages");
        let (status, json) = send_json(&router, "POST", &uri, message("Khuda Hafiz")).await;
        assert_eq!(status, StatusCode::OK);

        let data = &json["data"];
        assert_eq!(data["outcome"], "farewell");
        assert_eq!(data["text"], persona::rishta().farewell_message.as_str());
        assert_eq!(data["memory_len"], 1);
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_200_with_failed_outcome() {
        let (state, _) = test_state(vec![Scripted::Fail]);
        let router = build_router(state);
        let id = create_session(&router).await;

        let uri = format!("/api/v1/sessions/{id}/messages");
        let (status, json) = send_json(&router, "POST", &uri, message("Rishta chahiye")).await;
        assert_eq!(status, StatusCode::OK);

        let data = &json["data"];
        assert_eq!(data["outcome"], "failed");
        assert_eq!(data["memory_len"], 1);
        let entries = data["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["kind"], "error");
        assert!(!data["message"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let (state, requests) = test_state(vec![]);
        let router = build_router(state);
        let id = create_session(&router).await;

        let uri = format!("/api/v1/sessions/{id}/messages");
        let (_, json) = send_json(&router, "POST", &uri, message("   ")).await;
        assert_eq!(json["data"]["outcome"], "ignored");
        assert_eq!(json["data"]["turn_count"], 0);
        assert!(json["data"]["entries"].as_array().unwrap().is_empty());
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_turn_replays_first_exchange() {
        let (state, requests) = test_state(vec![text("first reply"), text("second reply")]);
        let router = build_router(state);
        let id = create_session(&router).await;
        let uri = format!("/api/v1/sessions/{id}/messages");

        send_json(&router, "POST", &uri, message("Hello")).await;
        send_json(&router, "POST", &uri, message("How are you?")).await;

        let requests = requests.lock().unwrap();
        let second = &requests[1];
        let contents: Vec<&str> = second.messages.iter().map(|m| m.content.as_str()).collect();
        // Seeded welcome, then the first exchange, then the new input.
        assert_eq!(contents.len(), 5);
        assert_eq!(contents[2], "Hello");
        assert_eq!(contents[3], "first reply");
        assert_eq!(contents[4], "How are you?");
    }

    #[tokio::test]
    async fn test_stream_emits_deltas_then_commits() {
        let (state, _) = test_state(vec![text("Ji haan bilkul")]);
        let router = build_router(state.clone());
        let id = create_session(&router).await;

        let uri = format!("/api/v1/sessions/{id}/messages/stream");
        let (status, bytes) = send(&router, "POST", &uri, message("Hello")).await;
        assert_eq!(status, StatusCode::OK);

        let body = String::from_utf8(bytes).unwrap();
        assert_eq!(body.matches("event: text_delta").count(), 3);
        assert!(body.contains("event: usage"));
        assert!(body.contains("event: done"));
        assert!(!body.contains("event: error"));
        assert!(body.find("event: text_delta").unwrap() < body.find("event: done").unwrap());

        let (_, json) = send_json(&router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(json["data"]["memory_len"], 2);
        assert_eq!(json["data"]["usage"]["output_tokens"], 3);
        let transcript = json["data"]["transcript"].as_array().unwrap();
        assert_eq!(transcript.last().unwrap()["text"], "Ji haan bilkul");
    }

    #[tokio::test]
    async fn test_stream_failure_emits_error_and_keeps_memory() {
        let (state, _) = test_state(vec![Scripted::Fail]);
        let router = build_router(state);
        let id = create_session(&router).await;

        let uri = format!("/api/v1/sessions/{id}/messages/stream");
        let (_, bytes) = send(&router, "POST", &uri, message("Hello")).await;
        let body = String::from_utf8(bytes).unwrap();
        assert!(body.contains("event: error"));
        assert!(body.contains("event: done"));
        assert!(body.contains("\"outcome\":\"failed\""));

        let (_, json) = send_json(&router, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(json["data"]["memory_len"], 1);
    }

    #[tokio::test]
    async fn test_stream_exit_keyword_emits_farewell() {
        let (state, requests) = test_state(vec![]);
        let router = build_router(state);
        let id = create_session(&router).await;

        let uri = format!("/api/v1/sessions/{id}/messages/stream");
        let (_, bytes) = send(&router, "POST", &uri, message("BYE")).await;
        let body = String::from_utf8(bytes).unwrap();
        assert!(body.contains("event: farewell"));
        assert!(body.contains("event: done"));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_keeps_transcript() {
        let (state, _) = test_state(vec![text("reply")]);
        let router = build_router(state);
        let id = create_session(&router).await;
        send_json(&router, "POST", &format!("/api/v1/sessions/{id}/messages"), message("Hello")).await;

        let (status, json) =
            send_json(&router, "POST", &format!("/api/v1/sessions/{id}/clear"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["memory_len"], 0);
        assert_eq!(json["data"]["transcript"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let (state, _) = test_state(vec![]);
        let router = build_router(state.clone());
        let id = create_session(&router).await;
        let uri = format!("/api/v1/sessions/{id}");

        let (status, json) = send_json(&router, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["deleted"], true);
        assert!(state.sessions.is_empty());

        let (status, _) = send_json(&router, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
