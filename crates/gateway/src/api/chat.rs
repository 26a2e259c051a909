//! `POST /v1/chat` — run one assistant turn for a lead's thread.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::runtime::{submit_turn, TurnInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub thread_id: String,
    #[serde(default)]
    pub lead_id: Option<String>,
    pub message: String,
    /// Uploaded file ids attached to the message.
    #[serde(default)]
    pub file_ids: Vec<String>,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    let input = TurnInput {
        thread_id: body.thread_id,
        lead_id: body.lead_id,
        message: body.message,
        attachments: body.file_ids,
    };
    match submit_turn(&state, input).await {
        Ok(outcome) => Json(serde_json::json!({
            "success": true,
            "messageId": outcome.message_id,
            "content": outcome.content,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "chat turn failed");
            super::error_response(&e)
        }
    }
}
