//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! `info_span!` needs literal field names, so spans spell these out; the
//! constants are for `Span::record` on fields declared as
//! `tracing::field::Empty`.

/// The number of input tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// Standard chat completion operation (value of `gen_ai.operation.name`).
pub const OP_CHAT: &str = "chat";

/// Record token usage on a span that declared both usage fields.
pub fn record_usage(span: &tracing::Span, input_tokens: u32, output_tokens: u32) {
    span.record(GEN_AI_USAGE_INPUT_TOKENS, input_tokens);
    span.record(GEN_AI_USAGE_OUTPUT_TOKENS, output_tokens);
}

/// Span covering one chat turn, with usage fields left empty for
/// [`record_usage`].
pub fn chat_turn_span(session_id: impl std::fmt::Display) -> tracing::Span {
    tracing::info_span!(
        "chat.turn",
        session_id = %session_id,
        gen_ai.operation.name = OP_CHAT,
        gen_ai.usage.input_tokens = tracing::field::Empty,
        gen_ai.usage.output_tokens = tracing::field::Empty,
    )
}
