//! Conversation logic for Gupshup.
//!
//! Holds the bounded memory window, the prompt assembler, the turn
//! controller and the model gateway trait that the infrastructure layer
//! implements. Depends only on `gupshup-types`, never on `gupshup-infra` or
//! any network crate.

pub mod chat;
pub mod llm;
pub mod memory;
pub mod persona;
pub mod prompt;
