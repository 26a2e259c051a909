//! Inbox adapter for a Microsoft-Graph-shaped mail API.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use lf_crm::TokenSource;
use lf_domain::config::MailConfig;
use lf_domain::{Error, Result};

use crate::provider::{MailMessage, MailProvider};

pub struct GraphMail {
    base_url: String,
    token: Arc<dyn TokenSource>,
    client: reqwest::Client,
}

impl GraphMail {
    pub fn new(cfg: &MailConfig, token: Arc<dyn TokenSource>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn message_from_value(value: &Value) -> MailMessage {
        MailMessage {
            id: str_at(value, "/id"),
            subject: str_at(value, "/subject"),
            sender_name: str_at(value, "/sender/emailAddress/name"),
            sender_address: str_at(value, "/sender/emailAddress/address"),
            received_at: value
                .pointer("/receivedDateTime")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default(),
            body_preview: str_at(value, "/bodyPreview"),
            has_attachments: value
                .pointer("/hasAttachments")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

fn str_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait::async_trait]
impl MailProvider for GraphMail {
    async fn list_inbox(&self, top: usize) -> Result<Vec<MailMessage>> {
        let top = top.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .bearer_auth(self.token.bearer().await?)
            .query(&[
                (
                    "$select",
                    "id,subject,sender,receivedDateTime,bodyPreview,hasAttachments",
                ),
                ("$top", top.as_str()),
                ("$orderby", "receivedDateTime desc"),
            ])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !(200..300).contains(&status) {
            tracing::warn!(status, "mail API rejected inbox listing");
            return Err(Error::from_status(status, body));
        }
        let value: Value = serde_json::from_str(&body)?;
        let messages = value
            .get("value")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Self::message_from_value).collect())
            .unwrap_or_default();
        Ok(messages)
    }
}
