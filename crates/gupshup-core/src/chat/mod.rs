//! Chat session state and the per-turn state machine.

pub mod session;
pub mod transcript;
pub mod turn;

pub use session::ChatSession;
pub use transcript::Transcript;
pub use turn::{ExitKeywords, Reply, TurnController, TurnOutcome, TurnPlan};
