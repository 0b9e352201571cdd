//! Chat session state.
//!
//! A `ChatSession` owns everything one conversation needs: the memory window
//! replayed to the model, the transcript shown to the user, and counters.
//! Front ends pass it explicitly to the turn controller.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use gupshup_types::chat::{Exchange, TranscriptEntry};
use gupshup_types::llm::Usage;
use gupshup_types::persona::Persona;

use crate::memory::MemoryWindow;

use super::transcript::Transcript;

/// Input recorded alongside a seeded welcome message.
pub const WELCOME_SEED_INPUT: &str = "Hello";

#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    persona: String,
    started_at: DateTime<Utc>,
    memory: MemoryWindow,
    transcript: Transcript,
    /// Submissions handled so far (responded, failed or exit).
    turn_count: u32,
    usage: Usage,
}

impl ChatSession {
    /// Start a new session for `persona` with a `memory_k` exchange window.
    ///
    /// With `seed_welcome`, the persona's greeting is shown and remembered as
    /// the reply to an implicit "Hello".
    pub fn start(persona: &Persona, memory_k: usize, seed_welcome: bool) -> Self {
        let mut session = Self {
            id: Uuid::now_v7(),
            persona: persona.slug.clone(),
            started_at: Utc::now(),
            memory: MemoryWindow::new(memory_k),
            transcript: Transcript::new(),
            turn_count: 0,
            usage: Usage::default(),
        };

        if seed_welcome {
            session
                .transcript
                .push(TranscriptEntry::welcome(&persona.welcome_message));
            session.memory.append(Exchange::new(
                WELCOME_SEED_INPUT,
                &persona.welcome_message,
            ));
        }

        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn memory(&self) -> &MemoryWindow {
        &self.memory
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Token usage accumulated over all successful turns.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Forget the remembered exchanges. The transcript is kept.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    pub(crate) fn record_exchange(&mut self, input: &str, output: &str, usage: &Usage) {
        self.memory.append(Exchange::new(input, output));
        self.transcript.push(TranscriptEntry::user(input));
        self.transcript.push(TranscriptEntry::assistant(output));
        self.usage.accumulate(usage);
        self.turn_count += 1;
    }

    pub(crate) fn record_exit(&mut self, input: &str, farewell: &str) {
        self.transcript.push(TranscriptEntry::user(input));
        self.transcript.push(TranscriptEntry::farewell(farewell));
        self.turn_count += 1;
    }

    pub(crate) fn record_failure(&mut self, input: &str, message: &str) {
        self.transcript.push(TranscriptEntry::user(input));
        self.transcript.push(TranscriptEntry::error(message));
        self.turn_count += 1;
    }
}
