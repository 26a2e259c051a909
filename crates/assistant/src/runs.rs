use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use lf_domain::tool::{ToolCall, ToolDefinition, ToolOutput};
use lf_domain::Result;

/// Lifecycle states of an assistant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
}

impl RunState {
    /// States in which a thread will reject new messages.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RunState::Queued | RunState::InProgress | RunState::RequiresAction | RunState::Cancelling
        )
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "queued" => RunState::Queued,
            "in_progress" => RunState::InProgress,
            "requires_action" => RunState::RequiresAction,
            "cancelling" => RunState::Cancelling,
            "cancelled" => RunState::Cancelled,
            "completed" => RunState::Completed,
            "expired" => RunState::Expired,
            _ => RunState::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunHandle {
    pub id: String,
    pub state: RunState,
    /// Populated when the run is waiting on tool outputs.
    pub pending_tool_calls: Vec<ToolCall>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub metadata: Map<String, Value>,
}

/// Conversation-thread and run operations against the hosted
/// assistant. Mocked in gateway tests.
#[async_trait::async_trait]
pub trait RunProvider: Send + Sync {
    async fn create_thread(&self) -> Result<String>;

    /// Append a user message. A conflict with an in-flight run
    /// surfaces as `Error::ThreadBusy` so callers can retry.
    async fn add_message(
        &self,
        thread_id: &str,
        text: &str,
        attachments: &[String],
        metadata: Option<Map<String, Value>>,
    ) -> Result<String>;

    /// Number of runs still holding the thread.
    async fn active_runs(&self, thread_id: &str) -> Result<usize>;

    async fn create_run(
        &self,
        thread_id: &str,
        tools: &[ToolDefinition],
        instructions: &str,
    ) -> Result<RunHandle>;

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunHandle>;

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<()>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<()>;

    /// Most-recent-first.
    async fn list_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<ThreadMessage>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_states_hold_the_thread() {
        for state in [
            RunState::Queued,
            RunState::InProgress,
            RunState::RequiresAction,
            RunState::Cancelling,
        ] {
            assert!(state.is_active(), "{state:?}");
        }
        for state in [
            RunState::Cancelled,
            RunState::Failed,
            RunState::Completed,
            RunState::Expired,
        ] {
            assert!(!state.is_active(), "{state:?}");
        }
    }

    #[test]
    fn unknown_status_string_reads_as_failed() {
        assert_eq!(RunState::from_str("requires_action"), RunState::RequiresAction);
        assert_eq!(RunState::from_str("something_new"), RunState::Failed);
    }
}
