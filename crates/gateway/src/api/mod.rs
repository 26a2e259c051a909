//! HTTP surface of the gateway.

pub mod activity;
pub mod chat;
pub mod emails;
pub mod leads;
pub mod scrape;
pub mod threads;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use lf_domain::Error;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health))
        .route("/v1/chat", post(chat::chat))
        .route("/v1/threads", post(threads::open))
        .route("/v1/leads", get(leads::list))
        .route("/v1/leads/:id", get(leads::get_by_id))
        .route("/v1/leads/:id/activity", post(activity::progress))
        .route("/v1/leads/:id/activity/manual", post(activity::manual))
        .route("/v1/activity/next", get(activity::next))
        .route("/v1/emails/search", post(emails::search))
        .route("/v1/emails/send", post(emails::send))
        .route("/v1/scrape", post(scrape::officers))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Map a domain error onto an HTTP response with the message kept.
pub(crate) fn error_response(e: &Error) -> Response {
    let status = match e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::AuthRequired(_) => StatusCode::UNAUTHORIZED,
        Error::ThreadBusy(_) => StatusCode::CONFLICT,
        Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        Error::Upstream { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(serde_json::json!({ "success": false, "error": e.to_string() })),
    )
        .into_response()
}
