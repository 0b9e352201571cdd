//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends requests to the Gemini REST API
//! (`/v1beta/models/{model}:generateContent`) with the API key in the
//! `x-goog-api-key` header. Supports both non-streaming (`complete`) and
//! SSE streaming (`stream`) modes.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

use gupshup_core::llm::{LlmProvider, LlmStream};
use gupshup_types::config::DEFAULT_GEMINI_BASE_URL;
use gupshup_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities,
    StopReason, Usage,
};

use super::streaming::create_gemini_stream;
use super::types::{
    GeminiContent, GeminiErrorBody, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig,
    SystemInstruction, UsageMetadata,
};

/// Request timeout for a single generation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Google Gemini model gateway.
///
/// Does not derive `Debug`, so the key cannot leak through formatting.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    capabilities: ProviderCapabilities,
}

impl GeminiProvider {
    pub fn new(api_key: SecretString, model: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        let capabilities = Self::capabilities_for_model(&model);

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model,
            capabilities,
        })
    }

    /// The default model for this provider.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn capabilities_for_model(model: &str) -> ProviderCapabilities {
        if model.contains("2.5") || model.contains("-3") {
            ProviderCapabilities {
                streaming: true,
                max_context_tokens: 1_048_576,
                max_output_tokens: 65_536,
            }
        } else {
            ProviderCapabilities {
                streaming: true,
                max_context_tokens: 1_048_576,
                max_output_tokens: 8_192,
            }
        }
    }

    /// Endpoint URL for `model`; an empty model falls back to the default.
    fn url(&self, model: &str, stream: bool) -> String {
        let model = if model.is_empty() { &self.model } else { model };
        if stream {
            format!(
                "{}/v1beta/models/{model}:streamGenerateContent?alt=sse",
                self.base_url
            )
        } else {
            format!("{}/v1beta/models/{model}:generateContent", self.base_url)
        }
    }

    /// Convert a generic [`CompletionRequest`] into a [`GeminiRequest`].
    ///
    /// Assistant turns use Gemini's `model` role. System messages inside the
    /// turn list are folded into the system instruction.
    pub(crate) fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        let mut system_parts: Vec<GeminiPart> = request
            .system
            .iter()
            .map(|text| GeminiPart { text: text.clone() })
            .collect();
        let mut contents = Vec::with_capacity(request.messages.len());

        for message in &request.messages {
            let role = match message.role {
                MessageRole::System => {
                    system_parts.push(GeminiPart {
                        text: message.content.clone(),
                    });
                    continue;
                }
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            contents.push(GeminiContent {
                role: Some(role.to_string()),
                parts: vec![GeminiPart {
                    text: message.content.clone(),
                }],
            });
        }

        GeminiRequest {
            system_instruction: (!system_parts.is_empty())
                .then_some(SystemInstruction { parts: system_parts }),
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    fn post(&self, url: &str, body: &GeminiRequest) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(body)
    }
}

/// Map a Gemini `finishReason` to a [`StopReason`].
pub(crate) fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            StopReason::ContentFilter
        }
        _ => StopReason::EndTurn,
    }
}

pub(crate) fn map_usage(usage: Option<UsageMetadata>) -> Usage {
    let usage = usage.unwrap_or_default();
    Usage {
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
    }
}

/// Map a non-2xx status and its body to an [`LlmError`].
pub(crate) fn map_error_status(status: u16, retry_after_secs: Option<u64>, body: &str) -> LlmError {
    let message = serde_json::from_str::<GeminiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        400 if message.to_lowercase().contains("api key") => LlmError::AuthenticationFailed,
        400 => LlmError::InvalidRequest(message),
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after_secs.map(|s| s.saturating_mul(1000)),
        },
        500 | 503 => LlmError::Overloaded(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

/// Pass a successful response through, or turn it into an [`LlmError`].
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, "Gemini API error response");
    Err(map_error_status(status.as_u16(), retry_after, &body))
}

/// Convert a full `generateContent` response.
pub(crate) fn to_completion_response(
    response: GeminiResponse,
    requested_model: &str,
) -> Result<CompletionResponse, LlmError> {
    if let Some(reason) = response.block_reason() {
        return Err(LlmError::Provider {
            message: format!("prompt blocked: {reason}"),
        });
    }
    if response.candidates.is_empty() {
        return Err(LlmError::Provider {
            message: "response contained no candidates".to_string(),
        });
    }

    let content = response.text();
    let stop_reason = map_finish_reason(response.finish_reason());
    if content.is_empty() {
        return Err(LlmError::EmptyResponse(format!(
            "finish reason {stop_reason}"
        )));
    }

    Ok(CompletionResponse {
        id: response.response_id.unwrap_or_default(),
        content,
        model: response
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
        stop_reason,
        usage: map_usage(response.usage_metadata),
    })
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_gemini_request(request);
        let url = self.url(&request.model, false);

        let response = self
            .post(&url, &body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;
        let response = check_status(response).await?;

        let gemini_resp: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        to_completion_response(gemini_resp, &request.model)
    }

    fn stream(&self, request: CompletionRequest) -> LlmStream {
        let body = Self::to_gemini_request(&request);
        let url = self.url(&request.model, true);

        create_gemini_stream(self.post(&url, &body))
    }
}

#[cfg(test)]
mod tests {
    use gupshup_types::llm::Message;

    use super::*;

    fn make_provider() -> GeminiProvider {
        GeminiProvider::new(
            SecretString::from("test-key-not-real"),
            "gemini-2.0-flash".to_string(),
        )
        .unwrap()
    }

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            model: "gemini-2.0-flash".to_string(),
            messages: vec![
                Message::user("Hello"),
                Message::assistant("Salaam!"),
                Message::user("Swat ka plan?"),
            ],
            system: Some("You are a tour guide.".to_string()),
            max_tokens: 8192,
            temperature: Some(0.7),
            stream: false,
        }
    }

    #[test]
    fn test_provider_name_and_capabilities() {
        let provider = make_provider();
        assert_eq!(provider.name(), "gemini");
        assert!(provider.capabilities().streaming);
        assert_eq!(provider.capabilities().max_output_tokens, 8_192);
    }

    #[test]
    fn test_to_gemini_request_maps_roles() {
        let gemini = GeminiProvider::to_gemini_request(&sample_request());

        let roles: Vec<_> = gemini
            .contents
            .iter()
            .map(|c| c.role.as_deref().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(gemini.contents[2].parts[0].text, "Swat ka plan?");

        let system = gemini.system_instruction.unwrap();
        assert_eq!(system.parts[0].text, "You are a tour guide.");
        assert_eq!(gemini.generation_config.max_output_tokens, 8192);
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let gemini = GeminiProvider::to_gemini_request(&sample_request());
        let json = serde_json::to_value(&gemini).unwrap();

        assert!(json.get("systemInstruction").is_some());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(json["generationConfig"]["temperature"], 0.7);
        assert_eq!(json["contents"][1]["role"], "model");
    }

    #[test]
    fn test_request_without_system_omits_instruction() {
        let mut request = sample_request();
        request.system = None;
        let json = serde_json::to_value(GeminiProvider::to_gemini_request(&request)).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_urls() {
        let provider = make_provider().with_base_url("http://localhost:8080/");
        assert_eq!(
            provider.url("gemini-2.0-flash", false),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            provider.url("", true),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_error_status_mapping() {
        let invalid_key = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            map_error_status(400, None, invalid_key),
            LlmError::AuthenticationFailed
        ));

        let bad_request = r#"{"error":{"code":400,"message":"contents is empty","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            map_error_status(400, None, bad_request),
            LlmError::InvalidRequest(ref m) if m == "contents is empty"
        ));

        assert!(matches!(
            map_error_status(403, None, ""),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            map_error_status(429, Some(7), ""),
            LlmError::RateLimited {
                retry_after_ms: Some(7000)
            }
        ));
        assert!(matches!(
            map_error_status(503, None, "busy"),
            LlmError::Overloaded(_)
        ));
        assert!(matches!(
            map_error_status(404, None, "no such model"),
            LlmError::Provider { .. }
        ));
    }

    #[test]
    fn test_huge_retry_after_saturates() {
        assert!(matches!(
            map_error_status(429, Some(u64::MAX), ""),
            LlmError::RateLimited {
                retry_after_ms: Some(u64::MAX)
            }
        ));
    }

    #[test]
    fn test_completion_response_mapping() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Swat "}, {"text": "chalo!"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 42, "candidatesTokenCount": 7, "totalTokenCount": 49},
            "modelVersion": "gemini-2.0-flash-001",
            "responseId": "abc123"
        }"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        let completion = to_completion_response(response, "gemini-2.0-flash").unwrap();

        assert_eq!(completion.content, "Swat chalo!");
        assert_eq!(completion.id, "abc123");
        assert_eq!(completion.model, "gemini-2.0-flash-001");
        assert_eq!(completion.stop_reason, StopReason::EndTurn);
        assert_eq!(completion.usage.input_tokens, 42);
        assert_eq!(completion.usage.output_tokens, 7);
    }

    #[test]
    fn test_blocked_prompt_is_provider_error() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GeminiResponse = serde_json::from_str(body).unwrap();
        let err = to_completion_response(response, "gemini-2.0-flash").unwrap_err();
        assert!(matches!(err, LlmError::Provider { ref message } if message.contains("SAFETY")));
    }

    #[test]
    fn test_empty_candidates_is_provider_error() {
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            to_completion_response(response, "m"),
            Err(LlmError::Provider { .. })
        ));
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(map_finish_reason(Some("STOP")), StopReason::EndTurn);
        assert_eq!(map_finish_reason(Some("MAX_TOKENS")), StopReason::MaxTokens);
        assert_eq!(map_finish_reason(Some("SAFETY")), StopReason::ContentFilter);
        assert_eq!(map_finish_reason(None), StopReason::EndTurn);
    }
}
