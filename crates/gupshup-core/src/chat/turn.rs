//! Turn controller.
//!
//! One user submission moves a session through
//! `Idle -> ExitRequested -> Idle` or `Idle -> Generating -> Responded | Failed -> Idle`.
//! The controller is split into [`TurnController::plan`] and
//! [`TurnController::commit`] so a front end can stream the reply between
//! the two; [`TurnController::submit`] runs the whole cycle.

use std::collections::HashSet;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use serde::Serialize;
use tracing::{Instrument, debug, info_span, warn};

use gupshup_types::llm::{CompletionRequest, CompletionResponse, LlmError, StreamEvent, Usage};
use gupshup_types::persona::Persona;

use crate::llm::{BoxLlmProvider, LlmStream};
use crate::prompt::PromptAssembler;

use super::session::ChatSession;

/// Inputs that end a conversation instead of reaching the model.
///
/// Matching trims and lowercases the input and requires an exact match, so
/// "Bye" exits while "bye for now" does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitKeywords {
    keywords: Vec<String>,
}

impl ExitKeywords {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords = keywords
            .into_iter()
            .map(|k| normalize(k.as_ref()))
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();
        Self { keywords }
    }

    pub fn matches(&self, input: &str) -> bool {
        let input = normalize(input);
        self.keywords.iter().any(|k| *k == input)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for ExitKeywords {
    fn default() -> Self {
        Self::new(gupshup_types::config::AppConfig::default().exit_keywords)
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// What a submission will do, decided before any I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPlan {
    /// Whitespace-only input.
    Ignore,
    /// Exit keyword: show the farewell, skip the model.
    Exit { farewell: String },
    /// Send this prompt to the model.
    Generate { request: CompletionRequest },
}

/// Generated reply text with its token usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub usage: Usage,
}

impl Reply {
    /// Fold one streaming event into the reply.
    pub fn absorb(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta { text } => self.text.push_str(text),
            StreamEvent::Usage(usage) => self.usage = *usage,
            StreamEvent::Connected | StreamEvent::MessageDelta { .. } | StreamEvent::Done => {}
        }
    }
}

impl From<CompletionResponse> for Reply {
    fn from(response: CompletionResponse) -> Self {
        Self {
            text: response.content,
            usage: response.usage,
        }
    }
}

/// Result of one submission, after the session has been updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Ignored,
    Farewell { text: String },
    Responded { text: String, usage: Usage },
    /// `message` is safe to show; `error` carries the gateway detail.
    Failed { message: String, error: String },
}

/// Drives sessions of one persona against one model gateway.
pub struct TurnController {
    persona: Persona,
    assembler: PromptAssembler,
    keywords: ExitKeywords,
    provider: BoxLlmProvider,
}

impl TurnController {
    pub fn new(
        persona: Persona,
        assembler: PromptAssembler,
        keywords: ExitKeywords,
        provider: BoxLlmProvider,
    ) -> Self {
        Self {
            persona,
            assembler,
            keywords,
            provider,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.assembler.settings().name
    }

    pub fn exit_keywords(&self) -> &ExitKeywords {
        &self.keywords
    }

    /// Decide what `input` will do. Does not touch the session.
    pub fn plan(&self, session: &ChatSession, input: &str) -> TurnPlan {
        if input.trim().is_empty() {
            return TurnPlan::Ignore;
        }
        if self.keywords.matches(input) {
            return TurnPlan::Exit {
                farewell: self.persona.farewell_message.clone(),
            };
        }
        let history = session.memory().snapshot();
        TurnPlan::Generate {
            request: self
                .assembler
                .assemble(&self.persona.system_prompt, &history, input),
        }
    }

    /// Record an exit: user entry then farewell. Memory is left alone.
    pub fn commit_exit(&self, session: &mut ChatSession, input: &str) -> TurnOutcome {
        debug!(session_id = %session.id(), "Exit keyword received");
        let farewell = &self.persona.farewell_message;
        session.record_exit(input, farewell);
        TurnOutcome::Farewell {
            text: farewell.clone(),
        }
    }

    /// Record the result of a model call for `input`.
    ///
    /// Success appends the exchange to memory. Failure (including a blank
    /// reply) only adds user and error entries to the transcript.
    pub fn commit(
        &self,
        session: &mut ChatSession,
        input: &str,
        result: Result<Reply, LlmError>,
    ) -> TurnOutcome {
        let result = result.and_then(|reply| {
            if reply.text.trim().is_empty() {
                Err(LlmError::EmptyResponse("reply text was empty".to_string()))
            } else {
                Ok(reply)
            }
        });

        match result {
            Ok(reply) => {
                session.record_exchange(input, &reply.text, &reply.usage);
                debug!(
                    session_id = %session.id(),
                    memory_len = session.memory().len(),
                    output_tokens = reply.usage.output_tokens,
                    "Turn committed"
                );
                TurnOutcome::Responded {
                    text: reply.text,
                    usage: reply.usage,
                }
            }
            Err(err) => {
                warn!(session_id = %session.id(), error = %err, "Model call failed");
                let message = err.user_message();
                session.record_failure(input, message);
                TurnOutcome::Failed {
                    message: message.to_string(),
                    error: err.to_string(),
                }
            }
        }
    }

    /// Run one full turn: plan, call the model if needed, commit.
    pub async fn submit(&self, session: &mut ChatSession, input: &str) -> TurnOutcome {
        match self.plan(session, input) {
            TurnPlan::Ignore => TurnOutcome::Ignored,
            TurnPlan::Exit { .. } => self.commit_exit(session, input),
            TurnPlan::Generate { request } => {
                let result = self.complete(request).await;
                self.commit(session, input, result)
            }
        }
    }

    /// Non-streaming model call inside a `gen_ai.complete` span.
    pub async fn complete(&self, mut request: CompletionRequest) -> Result<Reply, LlmError> {
        request.stream = false;
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = false,
        );
        self.provider
            .complete(&request)
            .instrument(span)
            .await
            .map(Reply::from)
    }

    /// Streaming model call; the `gen_ai.stream` span lives as long as the stream.
    pub fn stream(&self, mut request: CompletionRequest) -> LlmStream {
        request.stream = true;
        let span = info_span!(
            "gen_ai.stream",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.stream = true,
        );
        let inner = self.provider.stream(request);
        Box::pin(StreamInSpan { inner, span })
    }
}

/// Keeps a span entered while the inner stream is polled.
struct StreamInSpan {
    inner: LlmStream,
    span: tracing::Span,
}

impl Stream for StreamInSpan {
    type Item = Result<StreamEvent, LlmError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let _enter = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}
