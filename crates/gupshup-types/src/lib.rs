//! Shared domain types for Gupshup.
//!
//! This crate contains the data shapes used across the Gupshup workspace:
//! exchanges and transcript entries, personas, model requests/responses,
//! configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod persona;
