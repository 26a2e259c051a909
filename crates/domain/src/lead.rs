use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A lead record as the CRM stores it. The CRM is the only store; every
/// read and write round-trips to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub company: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Current pipeline activity label, absent for brand-new records.
    #[serde(default)]
    pub activity: Option<String>,
    /// Durable conversation-thread reference, set lazily on first chat.
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
}

impl Lead {
    pub fn display_name(&self) -> String {
        match &self.first_name {
            Some(first) if !first.is_empty() => format!("{} {}", first, self.last_name),
            _ => self.last_name.clone(),
        }
    }

    /// The activity label, defaulting to "Fresh" when unset.
    pub fn activity_label(&self) -> &str {
        self.activity.as_deref().unwrap_or("Fresh")
    }
}

/// One page of a CRM list query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}
