//! SSE streaming for Gemini `streamGenerateContent?alt=sse`.
//!
//! Each SSE `data:` payload is a complete `GenerateContentResponse` holding
//! the next slice of text. Usage metadata is cumulative, so only the last
//! value seen is reported.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;

use gupshup_core::llm::LlmStream;
use gupshup_types::llm::{LlmError, StreamEvent};

use super::client::{check_status, map_finish_reason, map_usage};
use super::types::GeminiResponse;

/// Send `request` and map the SSE response to [`StreamEvent`]s.
///
/// Event order: `Connected`, `TextDelta`*, `MessageDelta` (if a finish
/// reason arrived), `Usage`, `Done`.
pub fn create_gemini_stream(request: reqwest::RequestBuilder) -> LlmStream {
    Box::pin(async_stream::try_stream! {
        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;
        let response = check_status(response).await?;

        yield StreamEvent::Connected;

        let mut events = response.bytes_stream().eventsource();
        let mut usage = None;
        let mut finish_reason = None;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
            if event.data.trim().is_empty() {
                continue;
            }

            let chunk: GeminiResponse = serde_json::from_str(&event.data)
                .map_err(|e| LlmError::Deserialization(format!("gemini stream chunk: {e}")))?;

            if let Some(reason) = chunk.block_reason() {
                Err::<(), _>(LlmError::Provider {
                    message: format!("prompt blocked: {reason}"),
                })?;
            }

            let text = chunk.text();
            if !text.is_empty() {
                yield StreamEvent::TextDelta { text };
            }
            if let Some(reason) = chunk.finish_reason() {
                finish_reason = Some(map_finish_reason(Some(reason)));
            }
            if chunk.usage_metadata.is_some() {
                usage = chunk.usage_metadata;
            }
        }

        if let Some(stop_reason) = finish_reason {
            yield StreamEvent::MessageDelta { stop_reason };
        }
        yield StreamEvent::Usage(map_usage(usage));
        yield StreamEvent::Done;
    })
}
