//! Conversation memory for Gupshup.
//!
//! Only a short rolling window of recent exchanges is remembered and replayed
//! to the model. Nothing here outlives the session that owns it.

pub mod window;

pub use window::MemoryWindow;
