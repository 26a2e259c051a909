//! Assistant-run orchestration primitives and the hosted assistants
//! API adapter.

pub mod api;
pub mod runs;

pub use api::AssistantApi;
pub use runs::{MessageRole, RunHandle, RunProvider, RunState, ThreadMessage};
