//! LlmProvider trait definition.
//!
//! Uses RPITIT for `complete`, and `Pin<Box<dyn Stream>>` for `stream`
//! (streams need to be object-safe for the `BoxLlmProvider` wrapper).

use std::pin::Pin;

use futures_util::Stream;

use gupshup_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StreamEvent,
};

/// Boxed stream of gateway events.
pub type LlmStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// A hosted generative model that turns a structured prompt into text.
///
/// Implementations live in gupshup-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Short provider name (e.g., "gemini"), used as `gen_ai.system`.
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(&self, request: CompletionRequest) -> LlmStream;
}
