//! Infrastructure layer for Gupshup.
//!
//! Implements the model gateway trait from `gupshup-core` for Google Gemini,
//! and loads configuration, persona files and credentials from disk and the
//! environment.

pub mod config;
pub mod llm;
pub mod persona;
pub mod secret;
