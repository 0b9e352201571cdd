//! Model gateway abstractions for Gupshup.
//!
//! - `LlmProvider`: RPITIT trait for concrete gateway implementations
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;

pub use box_provider::BoxLlmProvider;
pub use provider::{LlmProvider, LlmStream};
