//! Chat exchange and transcript types for Gupshup.
//!
//! An [`Exchange`] is what the conversation memory remembers; a
//! [`TranscriptEntry`] is what a front end displays. The transcript is a
//! superset of the memory: it also carries welcome, farewell and error
//! entries that never reach the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// One user turn paired with the reply generated for it.
///
/// Fields are private so an exchange cannot be edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    input: String,
    output: String,
}

impl Exchange {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

/// Who a transcript entry is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for Speaker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Speaker::User),
            "assistant" | "bot" => Ok(Speaker::Assistant),
            other => Err(format!("invalid speaker: '{other}'")),
        }
    }
}

/// What produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Persona greeting shown when the session starts.
    Welcome,
    /// A normal user message or generated reply.
    Message,
    /// Fixed goodbye shown after an exit keyword.
    Farewell,
    /// Turn-local failure notice (the model call did not complete).
    Error,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Welcome => write!(f, "welcome"),
            EntryKind::Message => write!(f, "message"),
            EntryKind::Farewell => write!(f, "farewell"),
            EntryKind::Error => write!(f, "error"),
        }
    }
}

/// A single line of the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub kind: EntryKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            speaker,
            kind,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, EntryKind::Message, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, EntryKind::Message, text)
    }

    pub fn welcome(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, EntryKind::Welcome, text)
    }

    pub fn farewell(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, EntryKind::Farewell, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, EntryKind::Error, text)
    }

    pub fn is_error(&self) -> bool {
        self.kind == EntryKind::Error
    }
}
