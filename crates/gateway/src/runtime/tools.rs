//! The fixed tool catalog exposed to the assistant, and the dispatcher
//! that executes tool calls.
//!
//! Dispatch never errors: every failure becomes a JSON payload inside
//! the tool output so the run can continue and the assistant can relay
//! the problem to the user.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use lf_domain::stage::{self, Stage};
use lf_domain::tool::{ToolCall, ToolDefinition, ToolOutput};
use lf_domain::{Error, Result};
use lf_mail::{compose, format_messages, plain_text, ComposeData, EmailType, OutboundEmail};
use lf_registry::OfficerLookup;

use crate::state::AppState;

use super::progression;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const TOOL_NAMES: [&str; 7] = [
    "draft_email",
    "send_email_confirmed",
    "scrape_company_officers",
    "suggest_activity_progression",
    "update_lead_activity_confirmed",
    "change_activity_manual",
    "search_emails",
];

/// The seven workflow tools, in catalog order.
pub fn tool_catalog() -> Vec<ToolDefinition> {
    let email_params = |verb: &str| {
        json!({
            "type": "object",
            "properties": {
                "to": { "type": "string", "description": "Email address of the recipient" },
                "subject": { "type": "string", "description": "Subject line of the email" },
                "body": { "type": "string", "description": "Body content of the email in plain text" },
                "emailType": {
                    "type": "string",
                    "enum": ["questionnaire", "quotation", "follow-up", "general"],
                    "description": format!("Type of email being {verb}")
                }
            },
            "required": ["to", "subject", "body", "emailType"]
        })
    };

    vec![
        ToolDefinition {
            name: "draft_email".into(),
            description: "Draft an email for the lead without sending it. Use this to show the user \
                what the email will look like before sending. NEVER sends the email - only shows a preview."
                .into(),
            parameters: email_params("drafted"),
        },
        ToolDefinition {
            name: "send_email_confirmed".into(),
            description: "Send an email to the lead. ONLY use this after the user has explicitly \
                confirmed they want to send the email. This should only be called when the user says \
                'yes', 'send it', 'confirm', or similar confirmation."
                .into(),
            parameters: email_params("sent"),
        },
        ToolDefinition {
            name: "scrape_company_officers".into(),
            description: "Scrape company officer information from Companies House. Use this when the \
                user asks to scrape company information, get company officers, or research a company. \
                Ask the user for the company name or company number if not provided."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "queryInput": { "type": "string", "description": "Company name or company number to search for" }
                },
                "required": ["queryInput"]
            }),
        },
        ToolDefinition {
            name: "suggest_activity_progression".into(),
            description: "Suggest progressing a lead's activity to the next stage in the workflow."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "leadId": { "type": "string", "description": "The ID of the lead to suggest progression for" },
                    "currentActivity": { "type": "string", "description": "The current activity of the lead" },
                    "reason": { "type": "string", "description": "Reason for suggesting the progression" }
                },
                "required": ["leadId", "currentActivity", "reason"]
            }),
        },
        ToolDefinition {
            name: "update_lead_activity_confirmed".into(),
            description: "Update a lead's activity to the next stage. Only use after user confirmation."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "leadId": { "type": "string", "description": "The ID of the lead to update" },
                    "newActivity": { "type": "string", "description": "The new activity to set for the lead" },
                    "reason": { "type": "string", "description": "Reason for the activity update" }
                },
                "required": ["leadId", "newActivity", "reason"]
            }),
        },
        ToolDefinition {
            name: "change_activity_manual".into(),
            description: "Manually change a lead's activity to any specified activity. Use when user \
                requests a specific activity change."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "leadId": { "type": "string", "description": "The ID of the lead to update" },
                    "currentActivity": { "type": "string", "description": "The current activity of the lead" },
                    "newActivity": { "type": "string", "description": "The new activity to set for the lead" },
                    "reason": { "type": "string", "description": "Reason for the manual activity change" }
                },
                "required": ["leadId", "newActivity"]
            }),
        },
        ToolDefinition {
            name: "search_emails".into(),
            description: "Search for emails from a specific sender or lead email address. Can filter \
                by time period using natural language like 'last Thursday', 'yesterday', 'last week', etc."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "senderEmail": { "type": "string", "description": "Email address to search for (can be lead's email or any email address)" },
                    "timeAfter": { "type": "string", "description": "Time period to search after, in natural language like 'last Thursday', 'yesterday', '3 days ago', 'last week', or a specific date" },
                    "leadEmail": { "type": "string", "description": "Alternative to senderEmail - the lead's email address to search for" }
                },
                "required": ["senderEmail"]
            }),
        },
    ]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Dispatch every pending call from one run pause, in order.
pub async fn dispatch_all(
    state: &AppState,
    calls: &[ToolCall],
    lead_id: Option<&str>,
) -> Vec<ToolOutput> {
    let mut outputs = Vec::with_capacity(calls.len());
    for call in calls {
        outputs.push(dispatch(state, call, lead_id).await);
    }
    outputs
}

/// Execute one tool call. Failures are reported inside the output
/// payload, never as an error.
pub async fn dispatch(state: &AppState, call: &ToolCall, lead_id: Option<&str>) -> ToolOutput {
    tracing::info!(tool = %call.name, call_id = %call.call_id, "dispatching tool call");
    let payload = match call.name.as_str() {
        "draft_email" => draft_email(call),
        "send_email_confirmed" => send_email_confirmed(state, call, lead_id).await,
        "scrape_company_officers" => scrape_company_officers(state, call).await,
        "suggest_activity_progression" => suggest_activity_progression(call, lead_id),
        "update_lead_activity_confirmed" => update_activity_confirmed(state, call, lead_id).await,
        "change_activity_manual" => change_activity_manual(state, call, lead_id).await,
        "search_emails" => search_emails(state, call).await,
        other => json!({
            "error": format!(
                "Unknown function: {other}. Available functions: {}",
                TOOL_NAMES.join(", ")
            )
        }),
    };
    ToolOutput::json(call.call_id.clone(), &payload)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailArgs {
    to: String,
    subject: String,
    body: String,
    email_type: String,
}

fn draft_email(call: &ToolCall) -> Value {
    let args: EmailArgs = match parse_args(call) {
        Ok(a) => a,
        Err(payload) => return payload,
    };
    json!({
        "success": true,
        "message": "Email drafted successfully - showing preview to user",
        "draft": {
            "to": args.to,
            "subject": args.subject,
            "body": args.body,
            "emailType": args.email_type,
        },
        "requiresConfirmation": true,
    })
}

async fn send_email_confirmed(state: &AppState, call: &ToolCall, lead_id: Option<&str>) -> Value {
    let args: EmailArgs = match parse_args(call) {
        Ok(a) => a,
        Err(payload) => return payload,
    };
    let request = SendEmailRequest {
        to: args.to,
        subject: args.subject,
        body: args.body,
        email_type: args.email_type,
        lead_id: lead_id.map(String::from),
        recipient_name: None,
        company_name: None,
    };
    match send_email(state, request).await {
        Ok(result) => result,
        Err(e) => json!({ "success": false, "error": format!("Failed to send email: {e}") }),
    }
}

async fn scrape_company_officers(state: &AppState, call: &ToolCall) -> Value {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Args {
        query_input: String,
    }
    let args: Args = match parse_args(call) {
        Ok(a) => a,
        Err(payload) => return payload,
    };
    match state.registry.officers(&args.query_input).await {
        Ok(OfficerLookup::Found(officers)) => json!({
            "success": true,
            "officers": officers,
            "companyIdentifier": args.query_input,
        }),
        Ok(OfficerLookup::NotFound(message)) => json!({ "success": false, "message": message }),
        Err(e) => json!({
            "success": false,
            "error": "Failed to scrape company officers.",
            "details": e.to_string(),
        }),
    }
}

fn suggest_activity_progression(call: &ToolCall, lead_id: Option<&str>) -> Value {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Args {
        #[serde(default)]
        lead_id: Option<String>,
        current_activity: String,
        #[serde(default)]
        reason: String,
    }
    let args: Args = match parse_args(call) {
        Ok(a) => a,
        Err(payload) => return payload,
    };
    match progression::suggestion_message(&args.current_activity, &args.reason) {
        Some(message) => {
            let next = stage::next_stage(&args.current_activity).map(Stage::label);
            json!({
                "success": true,
                "message": message,
                "nextActivity": next,
                "currentActivity": args.current_activity,
                "leadId": args.lead_id.as_deref().or(lead_id),
            })
        }
        None => json!({
            "success": false,
            "message": "No next activity available for progression",
        }),
    }
}

async fn update_activity_confirmed(state: &AppState, call: &ToolCall, lead_id: Option<&str>) -> Value {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Args {
        #[serde(default)]
        lead_id: Option<String>,
        new_activity: String,
        #[serde(default)]
        reason: Option<String>,
    }
    let args: Args = match parse_args(call) {
        Ok(a) => a,
        Err(payload) => return payload,
    };
    let Some(lead_id) = args.lead_id.as_deref().or(lead_id) else {
        return json!({ "success": false, "error": "Lead ID and new activity are required" });
    };
    match progression::apply_stage_change(
        state.crm.as_ref(),
        lead_id,
        &args.new_activity,
        args.reason.as_deref(),
    )
    .await
    {
        Ok(change) => {
            // Surface the new stage's own follow-up question so the
            // workflow keeps moving.
            let suggestion = Stage::from_label(&change.new_activity)
                .map(|s| format!("\n\n🎯 NEXT ACTION SUGGESTION:\n{}", s.confirmation_question()))
                .unwrap_or_default();
            json!({
                "success": true,
                "message": format!(
                    "✅ Activity updated successfully! {}'s activity changed from \"{}\" to \"{}\".{suggestion}",
                    change.lead_name, change.previous_activity, change.new_activity
                ),
            })
        }
        Err(e) => json!({ "success": false, "error": e.to_string() }),
    }
}

async fn change_activity_manual(state: &AppState, call: &ToolCall, lead_id: Option<&str>) -> Value {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Args {
        #[serde(default)]
        lead_id: Option<String>,
        #[serde(default)]
        current_activity: Option<String>,
        new_activity: String,
        #[serde(default)]
        reason: Option<String>,
    }
    let args: Args = match parse_args(call) {
        Ok(a) => a,
        Err(payload) => return payload,
    };
    let Some(lead_id) = args.lead_id.as_deref().or(lead_id) else {
        return json!({ "success": false, "error": "Lead ID and new activity are required" });
    };
    match progression::apply_stage_change(
        state.crm.as_ref(),
        lead_id,
        &args.new_activity,
        args.reason.as_deref().or(Some("Manual activity change")),
    )
    .await
    {
        Ok(change) => {
            let previous = args
                .current_activity
                .unwrap_or(change.previous_activity);
            json!({
                "success": true,
                "message": format!(
                    "✅ Activity manually changed for {} from \"{previous}\" to \"{}\".",
                    change.lead_name, change.new_activity
                ),
            })
        }
        Err(e) => json!({ "success": false, "error": e.to_string() }),
    }
}

async fn search_emails(state: &AppState, call: &ToolCall) -> Value {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Args {
        #[serde(default)]
        sender_email: Option<String>,
        #[serde(default)]
        lead_email: Option<String>,
        #[serde(default)]
        time_after: Option<String>,
    }
    let args: Args = match parse_args(call) {
        Ok(a) => a,
        Err(payload) => return payload,
    };

    let Some(mail) = &state.mail else {
        return json!({
            "success": false,
            "error": "Email search is not currently configured",
            "message": "📧 Email search functionality requires Microsoft authentication setup. \
                For now, I can help you with other lead management tasks. Would you like me to \
                suggest the next action for this lead instead?",
        });
    };
    let Some(sender) = args.sender_email.or(args.lead_email) else {
        return json!({ "success": false, "error": "Either senderEmail or leadEmail is required" });
    };

    let resolved = args
        .time_after
        .as_deref()
        .map(|expr| lf_mail::timeexpr::resolve(expr, Utc::now()));

    match lf_mail::provider::search(
        mail.as_ref(),
        &sender,
        resolved.map(|r| r.at),
        state.config.mail.fetch_cap,
    )
    .await
    {
        Ok(messages) => json!({
            "success": true,
            "message": format_messages(&messages),
            "emailCount": messages.len(),
            "searchParams": {
                "senderEmail": sender,
                "timeAfter": resolved.map(|r| r.at.to_rfc3339()),
                "originalTimeExpression": args.time_after,
            },
        }),
        Err(Error::AuthRequired(_)) => json!({
            "success": false,
            "error": "Email search is not currently configured",
            "message": "📧 Email search functionality requires Microsoft authentication setup. \
                For now, I can help you with other lead management tasks. Would you like me to \
                suggest the next action for this lead instead?",
        }),
        Err(e) => {
            tracing::warn!(error = %e, "email search failed");
            json!({
                "success": false,
                "error": "Email search temporarily unavailable",
                "message": "📧 Email search is currently unavailable. I can help you with other \
                    lead management tasks instead. Would you like me to suggest the next action \
                    for this lead?",
            })
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Email sending (shared with the HTTP route)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub email_type: String,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Compose and deliver an email, then date-stamp the lead record for
/// questionnaire and quotation sends.
///
/// The stamp happens after a successful delivery and its own failure
/// is logged, not returned: the send already went out.
pub async fn send_email(state: &AppState, req: SendEmailRequest) -> Result<Value> {
    if req.to.is_empty() || req.subject.is_empty() || req.body.is_empty() {
        return Err(Error::Validation(
            "Email recipient, subject, and body are required".into(),
        ));
    }

    let ty = EmailType::parse(&req.email_type);
    let recipient_name = req
        .recipient_name
        .clone()
        .unwrap_or_else(|| req.to.split('@').next().unwrap_or(&req.to).to_string());
    let composed = compose(
        ty,
        &ComposeData {
            recipient_name,
            company_name: req.company_name.clone().unwrap_or_default(),
            body: req.body.clone(),
        },
        &state.config.branding,
    );
    let text_body = plain_text(&req.body);

    match &state.outbound {
        Some(sender) => {
            sender
                .send(&OutboundEmail {
                    to: req.to.clone(),
                    subject: composed.subject.clone(),
                    html_body: composed.html_body.clone(),
                    text_body,
                    lead_id: req.lead_id.clone(),
                    email_type: ty.as_str().to_string(),
                })
                .await?;
        }
        None => {
            tracing::info!(to = %req.to, subject = %composed.subject, "no webhook configured, email logged only");
        }
    }

    if let Some(lead_id) = &req.lead_id {
        let field = match ty {
            EmailType::Questionnaire => Some("Questionnaire_Date_Sent"),
            EmailType::Quotation => Some("Informal_Quote_Sent"),
            _ => None,
        };
        if let Some(field) = field {
            let today = Utc::now().format("%Y-%m-%d").to_string();
            if let Err(e) =
                progression::apply_field_update(state.crm.as_ref(), lead_id, field, &today).await
            {
                tracing::warn!(lead_id, field, error = %e, "post-send date stamp failed");
            }
        }
    }

    Ok(json!({
        "success": true,
        "message": format!("HTML email sent successfully to {}", req.to),
        "emailType": ty.as_str(),
        "subject": composed.subject,
        "dateSent": Utc::now().to_rfc3339(),
        "format": "html",
    }))
}

fn parse_args<T: serde::de::DeserializeOwned>(call: &ToolCall) -> std::result::Result<T, Value> {
    serde_json::from_value(call.arguments.clone()).map_err(|e| {
        tracing::warn!(tool = %call.name, error = %e, "malformed tool arguments");
        json!({ "success": false, "error": format!("Invalid arguments for {}: {e}", call.name) })
    })
}
