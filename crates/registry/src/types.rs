use serde::{Deserialize, Serialize};

use lf_domain::Result;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Officer {
    pub name: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub appointed_on: Option<String>,
    pub date_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub country_of_residence: Option<String>,
    pub occupation: Option<String>,
    pub correspondence_address: Option<String>,
}

/// Result of an officers lookup. `NotFound` carries a message that
/// can be relayed to the user as-is (unknown number, ambiguous name,
/// no current officers).
#[derive(Debug, Clone)]
pub enum OfficerLookup {
    Found(Vec<Officer>),
    NotFound(String),
}

#[async_trait::async_trait]
pub trait CompanyRegistry: Send + Sync {
    /// `query` is a company number or a company name.
    async fn officers(&self, query: &str) -> Result<OfficerLookup>;
}
