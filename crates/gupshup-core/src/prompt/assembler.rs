//! Prompt assembler.
//!
//! Turns a persona template, a memory snapshot and the new user input into a
//! role-tagged [`CompletionRequest`]. The layout is always:
//!
//! ```text
//! system:    {persona template}
//! user:      {exchange 1 input}
//! assistant: {exchange 1 output}
//! ...
//! user:      {new input}
//! ```
//!
//! Assembly is a pure function of its arguments.

use gupshup_types::chat::Exchange;
use gupshup_types::config::ModelSettings;
use gupshup_types::llm::{CompletionRequest, Message};

/// Builds completion requests with fixed generation settings.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    settings: ModelSettings,
}

impl PromptAssembler {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Assemble the prompt for one turn.
    ///
    /// History is replayed oldest to newest; nothing beyond what the window
    /// already holds is truncated.
    pub fn assemble(
        &self,
        system_prompt: &str,
        history: &[Exchange],
        input: &str,
    ) -> CompletionRequest {
        let mut messages = Vec::with_capacity(history.len() * 2 + 1);
        for exchange in history {
            messages.push(Message::user(exchange.input()));
            messages.push(Message::assistant(exchange.output()));
        }
        messages.push(Message::user(input));

        CompletionRequest {
            model: self.settings.name.clone(),
            messages,
            system: Some(system_prompt.to_string()),
            max_tokens: self.settings.max_output_tokens,
            temperature: Some(self.settings.temperature),
            stream: false,
        }
    }
}
