//! Interactive terminal chat with a persona.
//!
//! Streams replies with a thinking spinner, renders markdown, and handles
//! slash commands. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
