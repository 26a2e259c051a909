//! Company officer lookup endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use lf_registry::OfficerLookup;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    #[serde(default)]
    pub query_input: String,
}

/// `POST /v1/scrape` — look up current officers by company name or number.
pub async fn officers(
    State(state): State<AppState>,
    Json(body): Json<ScrapeRequest>,
) -> impl IntoResponse {
    let query = body.query_input.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": "queryInput is required",
            })),
        )
            .into_response();
    }

    match state.registry.officers(query).await {
        Ok(OfficerLookup::Found(officers)) => Json(serde_json::json!({
            "success": true,
            "officers": officers,
            "companyIdentifier": query,
        }))
        .into_response(),
        Ok(OfficerLookup::NotFound(message)) => {
            let lowered = message.to_lowercase();
            let status = if lowered.contains("not found")
                || lowered.contains("no match")
                || lowered.contains("no search results")
            {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(serde_json::json!({
                    "success": false,
                    "message": message,
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, query, "officer scrape failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Failed to scrape company officers.",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
