//! `POST /v1/threads` — find or create the thread for a lead.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::runtime::open_thread;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRequest {
    pub lead_id: String,
    #[serde(default)]
    pub existing_thread_id: Option<String>,
}

pub async fn open(
    State(state): State<AppState>,
    Json(body): Json<ThreadRequest>,
) -> impl IntoResponse {
    if body.lead_id.is_empty() {
        return super::error_response(&lf_domain::Error::Validation(
            "Lead ID is required".into(),
        ));
    }
    match open_thread(&state, &body.lead_id, body.existing_thread_id.as_deref()).await {
        Ok(bootstrap) => Json(serde_json::json!({
            "success": true,
            "threadId": bootstrap.thread_id,
            "messages": bootstrap.messages,
            "isExisting": bootstrap.is_existing,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(lead_id = %body.lead_id, error = %e, "thread bootstrap failed");
            super::error_response(&e)
        }
    }
}
