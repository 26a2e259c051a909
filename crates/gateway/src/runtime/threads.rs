//! Thread bootstrap: find or create the conversation thread for a
//! lead, persist it on the CRM record, and prime it with the lead
//! summary.

use serde::Serialize;
use serde_json::{Map, Value};

use lf_assistant::{MessageRole, ThreadMessage};
use lf_domain::lead::Lead;
use lf_domain::Result;

use crate::state::AppState;

/// Metadata key marking priming messages injected at bootstrap.
/// Marked messages are hidden from the UI transcript.
pub const INIT_MARKER_KEY: &str = "leadflow.init";

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptMessage {
    pub id: String,
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadBootstrap {
    pub thread_id: String,
    pub messages: Vec<TranscriptMessage>,
    pub is_existing: bool,
}

/// Open the conversation thread for a lead.
///
/// An existing thread id is verified by listing its messages; when the
/// listing fails the thread is treated as gone and a fresh one is
/// created, persisted to the lead's thread-id field, and primed with a
/// lead summary.
pub async fn open_thread(
    state: &AppState,
    lead_id: &str,
    existing: Option<&str>,
) -> Result<ThreadBootstrap> {
    if let Some(thread_id) = existing.filter(|t| !t.is_empty()) {
        match state.assistant.list_messages(thread_id, 100).await {
            Ok(messages) => {
                tracing::debug!(lead_id, thread_id, "reusing existing thread");
                return Ok(ThreadBootstrap {
                    thread_id: thread_id.to_string(),
                    messages: visible_transcript(messages),
                    is_existing: true,
                });
            }
            Err(e) => {
                tracing::info!(lead_id, thread_id, error = %e, "existing thread invalid, creating new one");
            }
        }
    }

    let lead = state.crm.lead_by_id(lead_id).await?;
    let thread_id = state.assistant.create_thread().await?;
    tracing::info!(lead_id, thread_id = %thread_id, "created thread for lead");

    // Persist the thread id so the next session finds it.
    let mut fields = serde_json::Map::new();
    fields.insert(
        state.config.crm.thread_id_field.clone(),
        Value::String(thread_id.clone()),
    );
    state.crm.update_lead_fields(lead_id, fields).await?;

    let mut metadata = Map::new();
    metadata.insert(INIT_MARKER_KEY.into(), Value::String("true".into()));
    state
        .assistant
        .add_message(&thread_id, &priming_message(&lead), &[], Some(metadata))
        .await?;

    Ok(ThreadBootstrap {
        thread_id,
        messages: Vec::new(),
        is_existing: false,
    })
}

/// The lead-summary message that seeds a new thread.
fn priming_message(lead: &Lead) -> String {
    format!(
        "This is a CRM management session for the lead below.\n\n\
         Lead Record Information:\n\
         Name: {name}\n\
         Company: {company}\n\
         Email: {email}\n\
         Phone: {phone}\n\
         Current Activity: {activity}\n\n\
         IMPORTANT: Based on this lead's current activity status \"{activity}\", \
         proactively suggest the next logical step in the workflow.",
        name = lead.display_name(),
        company = lead.company,
        email = lead.email.as_deref().unwrap_or("(none)"),
        phone = lead.phone.as_deref().unwrap_or("(none)"),
        activity = lead.activity_label(),
    )
}

/// Oldest-first transcript with priming messages removed.
///
/// New threads mark priming messages with [`INIT_MARKER_KEY`]
/// metadata; threads created before the marker existed are handled by
/// the original content heuristics.
fn visible_transcript(mut messages: Vec<ThreadMessage>) -> Vec<TranscriptMessage> {
    messages.reverse();
    messages
        .into_iter()
        .filter(|m| !is_init_message(m))
        .map(|m| TranscriptMessage {
            id: m.id,
            role: match m.role {
                MessageRole::Assistant => "assistant".into(),
                MessageRole::System => "system".into(),
                MessageRole::User => "user".into(),
            },
            content: m.text,
        })
        .collect()
}

fn is_init_message(message: &ThreadMessage) -> bool {
    if message
        .metadata
        .get(INIT_MARKER_KEY)
        .and_then(Value::as_str)
        == Some("true")
    {
        return true;
    }
    let content = &message.text;
    content.contains("Lead Record Information:")
        || content.contains("IMPORTANT: Based on this lead's current activity status")
        || content.contains("This is a CRM management session")
}
