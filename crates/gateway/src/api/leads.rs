//! Lead read endpoints.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub criteria: Option<String>,
    #[serde(default = "d_page")]
    pub page: u32,
    #[serde(default = "d_per_page")]
    pub per_page: u32,
}

fn d_page() -> u32 {
    1
}

fn d_per_page() -> u32 {
    50
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match state
        .crm
        .search_leads(
            query.criteria.as_deref().unwrap_or(""),
            query.page,
            query.per_page,
        )
        .await
    {
        Ok(page) => Json(serde_json::json!({
            "success": true,
            "leads": page.items,
            "hasMore": page.has_more,
        }))
        .into_response(),
        Err(e) => super::error_response(&e),
    }
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.crm.lead_by_id(&id).await {
        Ok(lead) => Json(serde_json::json!({ "success": true, "lead": lead })).into_response(),
        Err(e) => super::error_response(&e),
    }
}
