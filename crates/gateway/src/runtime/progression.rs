//! Lead mutations: stage changes and single-field updates, plus the
//! progression-suggestion text.

use serde_json::Value;

use lf_crm::CrmStore;
use lf_domain::stage;
use lf_domain::{Error, Result};

/// Outcome of a stage change, with the pre-change activity captured
/// for the confirmation message.
#[derive(Debug, Clone)]
pub struct StageChange {
    pub previous_activity: String,
    pub new_activity: String,
    pub lead_name: String,
}

/// Change a lead's activity. The lead is re-fetched first so
/// `previous_activity` is accurate even under concurrent editors.
///
/// No progression-table validation happens here: a manual override is
/// the same mutation, and callers that want validation do it before
/// calling.
pub async fn apply_stage_change(
    crm: &dyn CrmStore,
    lead_id: &str,
    new_activity: &str,
    reason: Option<&str>,
) -> Result<StageChange> {
    if new_activity.trim().is_empty() {
        return Err(Error::Validation("new activity is required".into()));
    }

    let lead = crm.lead_by_id(lead_id).await?;
    let previous_activity = lead.activity_label().to_string();

    let mut fields = serde_json::Map::new();
    fields.insert("Activity".into(), Value::String(new_activity.to_string()));
    crm.update_lead_fields(lead_id, fields).await?;

    tracing::info!(
        lead_id,
        from = %previous_activity,
        to = %new_activity,
        reason = reason.unwrap_or("Activity progression"),
        "lead activity updated"
    );

    Ok(StageChange {
        previous_activity,
        new_activity: new_activity.to_string(),
        lead_name: lead.display_name(),
    })
}

/// Set a single CRM field on a lead.
pub async fn apply_field_update(
    crm: &dyn CrmStore,
    lead_id: &str,
    field: &str,
    value: &str,
) -> Result<()> {
    let mut fields = serde_json::Map::new();
    fields.insert(field.to_string(), Value::String(value.to_string()));
    crm.update_lead_fields(lead_id, fields).await
}

/// The progression-suggestion text shown to the user when the
/// assistant proposes moving a lead forward. Does not mutate.
pub fn suggestion_message(current_label: &str, reason: &str) -> Option<String> {
    let next = stage::next_stage(current_label)?;
    Some(format!(
        "🔄 ACTIVITY PROGRESSION SUGGESTION:\n\n\
         Current Activity: \"{current_label}\"\n\
         Suggested Next Activity: \"{next_label}\"\n\n\
         Reason: {reason}\n\n\
         This means: {description}\n\n\
         Would you like me to update this lead's activity to \"{next_label}\"?",
        next_label = next.label(),
        description = next.description(),
    ))
}
