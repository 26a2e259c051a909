use serde::{Deserialize, Serialize};

/// A declared function-call request emitted by a paused run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// The result for one tool call, submitted back to the run. `output` is
/// always a JSON-encoded payload; failures are encoded inside it so the
/// run is never left without a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub call_id: String,
    pub output: String,
}

impl ToolOutput {
    /// Package any serializable payload as the output for a call.
    pub fn json(call_id: impl Into<String>, payload: &serde_json::Value) -> Self {
        Self {
            call_id: call_id.into(),
            output: payload.to_string(),
        }
    }
}

/// Tool definition declared to the run provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: serde_json::Value,
}
