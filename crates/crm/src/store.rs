use lf_domain::lead::{Lead, Page};
use lf_domain::Result;

/// The CRM record store. The CRM is authoritative — there is no local
/// lead cache, and writers re-read before reporting previous values.
#[async_trait::async_trait]
pub trait CrmStore: Send + Sync {
    /// Fetch one lead. `Error::NotFound` when the id is unknown.
    async fn lead_by_id(&self, id: &str) -> Result<Lead>;

    /// Search leads by a CRM criteria expression (empty criteria lists
    /// all), sorted by creation time descending.
    async fn search_leads(&self, criteria: &str, page: u32, per_page: u32) -> Result<Page<Lead>>;

    /// Single-record partial update. `Error::Upstream` carries the
    /// CRM's status and body on a non-2xx response.
    async fn update_lead_fields(
        &self,
        id: &str,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()>;
}

/// Convenience: update exactly one field.
pub async fn update_lead_field(
    store: &dyn CrmStore,
    id: &str,
    field: &str,
    value: serde_json::Value,
) -> Result<()> {
    let mut fields = serde_json::Map::new();
    fields.insert(field.to_string(), value);
    store.update_lead_fields(id, fields).await
}
