//! Prompt construction for Gupshup.

pub mod assembler;

pub use assembler::PromptAssembler;
