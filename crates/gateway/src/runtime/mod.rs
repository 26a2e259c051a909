//! The run orchestrator and its collaborators: tool catalog and
//! dispatch, lead mutations, thread bootstrap, workflow instructions.

pub mod instructions;
pub mod progression;
pub mod threads;
pub mod tools;
pub mod turn;

pub use threads::{open_thread, ThreadBootstrap, TranscriptMessage};
pub use turn::{submit_turn, TurnInput, TurnOutcome};
