//! Email endpoints: inbox search and compose-and-send.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use chrono::Utc;
use serde::Deserialize;

use lf_domain::Error;
use lf_mail::{format_messages, timeexpr};

use crate::runtime::tools::{send_email as deliver, SendEmailRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default)]
    pub lead_email: Option<String>,
    #[serde(default)]
    pub time_after: Option<String>,
}

/// `POST /v1/emails/search`
///
/// Failures come back as 200 with `success: false` so a chat turn
/// that proxies through here is never broken by mail trouble.
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> impl IntoResponse {
    let Some(mail) = &state.mail else {
        return Json(serde_json::json!({
            "success": false,
            "error": "Mail API not configured",
            "message": "📧 Email search requires mail API setup. Please configure your mail credentials first.",
            "fallbackSuggestion": "I can help you with other lead management tasks instead.",
        }))
        .into_response();
    };

    let Some(sender) = body.sender_email.clone().or(body.lead_email.clone()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": "Either senderEmail or leadEmail is required",
            })),
        )
            .into_response();
    };

    let resolved = body
        .time_after
        .as_deref()
        .map(|expr| timeexpr::resolve(expr, Utc::now()));

    match lf_mail::provider::search(
        mail.as_ref(),
        &sender,
        resolved.map(|r| r.at),
        state.config.mail.fetch_cap,
    )
    .await
    {
        Ok(emails) => Json(serde_json::json!({
            "success": true,
            "emails": emails,
            "formattedEmails": format_messages(&emails),
            "count": emails.len(),
            "searchParams": {
                "senderEmail": sender,
                "timeAfter": resolved.map(|r| r.at.to_rfc3339()),
                "originalTimeExpression": body.time_after,
            },
        }))
        .into_response(),
        Err(Error::AuthRequired(_)) => Json(serde_json::json!({
            "success": false,
            "error": "Mail authentication required",
            "message": "📧 Email search requires mail authentication. Please re-authenticate.",
            "fallbackSuggestion": "For now, I can help you with lead activity management and other CRM tasks.",
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "email search failed");
            Json(serde_json::json!({
                "success": false,
                "error": "Email search unavailable",
                "message": "📧 Email search is temporarily unavailable. I can help you with other lead management tasks instead.",
                "details": e.to_string(),
            }))
            .into_response()
        }
    }
}

/// `POST /v1/emails/send` — compose, deliver, and date-stamp.
pub async fn send(
    State(state): State<AppState>,
    Json(body): Json<SendEmailRequest>,
) -> impl IntoResponse {
    match deliver(&state, body).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "email send failed");
            super::error_response(&e)
        }
    }
}
