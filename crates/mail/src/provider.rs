use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lf_domain::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    pub subject: String,
    pub sender_name: String,
    pub sender_address: String,
    pub received_at: DateTime<Utc>,
    pub body_preview: String,
    #[serde(default)]
    pub has_attachments: bool,
}

/// Read-side mailbox access. Implementations return the newest
/// messages first.
#[async_trait::async_trait]
pub trait MailProvider: Send + Sync {
    async fn list_inbox(&self, top: usize) -> Result<Vec<MailMessage>>;
}

/// Fetch a capped inbox page and filter client-side: exact sender
/// match (case-insensitive) and received on or after `after`. Zero
/// matches is a successful, empty result.
pub async fn search(
    provider: &dyn MailProvider,
    sender: &str,
    after: Option<DateTime<Utc>>,
    cap: usize,
) -> Result<Vec<MailMessage>> {
    let inbox = provider.list_inbox(cap).await?;
    let target = sender.to_lowercase();
    let matched: Vec<MailMessage> = inbox
        .into_iter()
        .filter(|m| m.sender_address.to_lowercase() == target)
        .filter(|m| after.map_or(true, |cutoff| m.received_at >= cutoff))
        .collect();
    tracing::debug!(sender, matched = matched.len(), "inbox search complete");
    Ok(matched)
}
