use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crm: CrmConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub outbound: OutboundConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
    /// Allowed CORS origins; empty means same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: d_port(),
            cors_origins: Vec::new(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CRM connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    #[serde(default)]
    pub base_url: String,
    /// Bearer token for the CRM API. Refresh mechanics live outside
    /// this service.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// CRM custom-field name that stores the conversation thread id.
    #[serde(default = "d_thread_field")]
    pub thread_id_field: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            timeout_ms: d_timeout_ms(),
            thread_id_field: d_thread_field(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant / run provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "d_assistant_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub assistant_id: String,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_max_tokens")]
    pub max_completion_tokens: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: d_assistant_url(),
            api_key: None,
            assistant_id: String::new(),
            temperature: d_temperature(),
            max_completion_tokens: d_max_tokens(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mailbox (inbound search)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "d_mail_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Page size cap for inbox fetches.
    #[serde(default = "d_100")]
    pub fetch_cap: usize,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            base_url: d_mail_url(),
            access_token: None,
            fetch_cap: d_100(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outbound mail webhook
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutboundConfig {
    /// Fire-and-forget webhook URL; unset means sends are logged only.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Company registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "d_registry_url")]
    pub base_url: String,
    #[serde(default = "d_registry_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: d_registry_url(),
            timeout_ms: d_registry_timeout_ms(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orchestrator timings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Attempts when draining an already-active run before appending.
    #[serde(default = "d_20")]
    pub drain_attempts: u32,
    #[serde(default = "d_1500")]
    pub drain_interval_ms: u64,
    /// Retries on a "thread busy" conflict while appending the message.
    #[serde(default = "d_3")]
    pub busy_retries: u32,
    #[serde(default = "d_3000")]
    pub busy_backoff_ms: u64,
    /// Run-status polling cadence and total attempt budget.
    #[serde(default = "d_1000")]
    pub poll_interval_ms: u64,
    #[serde(default = "d_45")]
    pub poll_budget: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            drain_attempts: d_20(),
            drain_interval_ms: d_1500(),
            busy_retries: d_3(),
            busy_backoff_ms: d_3000(),
            poll_interval_ms: d_1000(),
            poll_budget: d_45(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Branding for composed email
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    #[serde(default = "d_company")]
    pub company_name: String,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            company_name: d_company(),
            contact_email: None,
            contact_phone: None,
        }
    }
}

// ── Serde default fns ──────────────────────────────────────────────

fn d_host() -> String {
    "127.0.0.1".into()
}
fn d_port() -> u16 {
    8710
}
fn d_timeout_ms() -> u64 {
    15_000
}
fn d_thread_field() -> String {
    "cf_Thread_ID".into()
}
fn d_assistant_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_temperature() -> f32 {
    0.3
}
fn d_max_tokens() -> u32 {
    2_000
}
fn d_mail_url() -> String {
    "https://graph.microsoft.com/v1.0/me/mailFolders/inbox/messages".into()
}
fn d_registry_url() -> String {
    "https://find-and-update.company-information.service.gov.uk".into()
}
fn d_registry_timeout_ms() -> u64 {
    60_000
}
fn d_100() -> usize {
    100
}
fn d_3() -> u32 {
    3
}
fn d_20() -> u32 {
    20
}
fn d_45() -> u32 {
    45
}
fn d_1000() -> u64 {
    1_000
}
fn d_1500() -> u64 {
    1_500
}
fn d_3000() -> u64 {
    3_000
}
fn d_company() -> String {
    "Forbes Burton".into()
}
