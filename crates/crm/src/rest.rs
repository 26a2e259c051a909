//! REST adapter for the hosted CRM (Zoho-shaped wire format:
//! `{"data":[{...}]}` envelopes, `Zoho-oauthtoken` auth scheme).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;

use lf_domain::config::CrmConfig;
use lf_domain::lead::{Lead, Page};
use lf_domain::{Error, Result};

use crate::store::CrmStore;
use crate::token::TokenSource;

pub struct RestCrm {
    base_url: String,
    thread_id_field: String,
    token: Arc<dyn TokenSource>,
    client: reqwest::Client,
}

impl RestCrm {
    pub fn new(cfg: &CrmConfig, token: Arc<dyn TokenSource>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            thread_id_field: cfg.thread_id_field.clone(),
            token,
            client,
        })
    }

    async fn auth_header(&self) -> Result<String> {
        Ok(format!("Zoho-oauthtoken {}", self.token.bearer().await?))
    }

    /// Parse the CRM's record envelope, tolerating the empty body the
    /// API returns for zero-result queries.
    fn parse_envelope(status: u16, body: &str) -> Result<Vec<Value>> {
        if !(200..300).contains(&status) {
            return Err(Error::from_status(status, body));
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_str(body)?;
        Ok(value
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn lead_from_record(&self, record: &Value) -> Lead {
        Lead {
            id: str_field(record, "id").unwrap_or_default(),
            first_name: str_field(record, "First_Name"),
            last_name: str_field(record, "Last_Name").unwrap_or_default(),
            email: str_field(record, "Email"),
            company: str_field(record, "Company").unwrap_or_default(),
            phone: str_field(record, "Phone"),
            activity: str_field(record, "Activity"),
            thread_id: str_field(record, &self.thread_id_field),
            created_time: time_field(record, "Created_Time"),
            modified_time: time_field(record, "Modified_Time"),
        }
    }
}

fn str_field(record: &Value, name: &str) -> Option<String> {
    record
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn time_field(record: &Value, name: &str) -> Option<DateTime<Utc>> {
    record
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

#[async_trait::async_trait]
impl CrmStore for RestCrm {
    async fn lead_by_id(&self, id: &str) -> Result<Lead> {
        let url = format!("{}/Leads/{id}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header().await?)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        let records = Self::parse_envelope(status, &body)?;
        let record = records
            .first()
            .ok_or_else(|| Error::NotFound(format!("lead {id}")))?;
        Ok(self.lead_from_record(record))
    }

    async fn search_leads(&self, criteria: &str, page: u32, per_page: u32) -> Result<Page<Lead>> {
        let url = if criteria.is_empty() {
            format!("{}/Leads", self.base_url)
        } else {
            format!("{}/Leads/search", self.base_url)
        };
        let mut req = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header().await?)
            .query(&[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("sort_by", "Created_Time".to_string()),
                ("sort_order", "desc".to_string()),
            ]);
        if !criteria.is_empty() {
            req = req.query(&[("criteria", criteria)]);
        }
        let resp = req.send().await.map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status().as_u16();

        // 204 is the CRM's "no matching records" answer.
        if status == 204 {
            return Ok(Page {
                items: Vec::new(),
                has_more: false,
            });
        }

        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(Error::from_status(status, &body));
        }
        let value: Value = if body.trim().is_empty() {
            serde_json::json!({ "data": [], "info": {} })
        } else {
            serde_json::from_str(&body)?
        };
        let items = value
            .get("data")
            .and_then(Value::as_array)
            .map(|records| records.iter().map(|r| self.lead_from_record(r)).collect())
            .unwrap_or_default();
        let has_more = value
            .pointer("/info/more_records")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Ok(Page { items, has_more })
    }

    async fn update_lead_fields(
        &self,
        id: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<()> {
        let mut record = serde_json::Map::new();
        record.insert("id".into(), Value::String(id.to_string()));
        record.extend(fields);

        let url = format!("{}/Leads/{id}", self.base_url);
        let resp = self
            .client
            .put(&url)
            .header("Authorization", self.auth_header().await?)
            .json(&serde_json::json!({ "data": [record] }))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(lead_id = %id, status, "lead update rejected by CRM");
            return Err(Error::from_status(status, body));
        }
        Ok(())
    }
}
