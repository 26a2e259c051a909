use std::time::Duration;

use serde::Serialize;

use lf_domain::{Error, Result};

/// Payload handed to the delivery webhook. Both HTML and plain-text
/// bodies are included so the downstream mailer can pick.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    #[serde(rename = "body_html")]
    pub html_body: String,
    #[serde(rename = "body_text")]
    pub text_body: String,
    #[serde(rename = "leadId", skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
    #[serde(rename = "emailType")]
    pub email_type: String,
}

/// Fire-and-forget delivery via an outbound webhook. A 2xx response
/// is the only success signal; the webhook body is ignored.
pub struct WebhookSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookSender {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { url, client })
    }

    pub async fn send(&self, email: &OutboundEmail) -> Result<()> {
        tracing::info!(to = %email.to, email_type = %email.email_type, "posting email to webhook");
        let resp = self
            .client
            .post(&self.url)
            .json(email)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::from_status(status, body));
        }
        Ok(())
    }
}
