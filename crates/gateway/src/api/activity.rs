//! Activity endpoints: validated progression, manual override, and
//! next-stage lookup.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use lf_domain::stage;
use lf_domain::Error;

use crate::runtime::progression;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub new_activity: String,
    #[serde(default)]
    pub current_activity: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Validated progression: the new activity must be the pipeline
/// successor of the lead's current stage.
pub async fn progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ActivityRequest>,
) -> impl IntoResponse {
    let lead = match state.crm.lead_by_id(&id).await {
        Ok(lead) => lead,
        Err(e) => return super::error_response(&e),
    };
    let expected = stage::next_stage(lead.activity_label()).map(|s| s.label());
    if expected != Some(body.new_activity.as_str()) {
        return super::error_response(&Error::Validation(format!(
            "\"{}\" is not the next stage after \"{}\"",
            body.new_activity,
            lead.activity_label()
        )));
    }
    apply(&state, &id, &body).await
}

/// Manual override: any activity value, no pipeline validation.
pub async fn manual(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ActivityRequest>,
) -> impl IntoResponse {
    apply(&state, &id, &body).await
}

async fn apply(
    state: &AppState,
    lead_id: &str,
    body: &ActivityRequest,
) -> axum::response::Response {
    match progression::apply_stage_change(
        state.crm.as_ref(),
        lead_id,
        &body.new_activity,
        body.reason.as_deref(),
    )
    .await
    {
        Ok(change) => Json(serde_json::json!({
            "success": true,
            "message": format!(
                "Lead activity updated successfully from \"{}\" to \"{}\"",
                change.previous_activity, change.new_activity
            ),
            "previousActivity": change.previous_activity,
            "newActivity": change.new_activity,
            "leadName": change.lead_name,
            "reason": body.reason.as_deref().unwrap_or("Activity progression"),
        }))
        .into_response(),
        Err(e) => super::error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub current: String,
}

/// `GET /v1/activity/next?current=…` — stage-table lookup for the
/// suggestion UI.
pub async fn next(Query(query): Query<NextQuery>) -> impl IntoResponse {
    match stage::next_stage(&query.current) {
        Some(next) => Json(serde_json::json!({
            "success": true,
            "currentActivity": query.current,
            "nextActivity": next.label(),
            "description": next.description(),
            "recommendedAction": next.recommended_action(),
            "actionQuestion": next.confirmation_question(),
        }))
        .into_response(),
        None => Json(serde_json::json!({
            "success": false,
            "message": "No next activity available for progression",
        }))
        .into_response(),
    }
}
