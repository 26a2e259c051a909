use std::sync::Arc;

use lf_assistant::RunProvider;
use lf_crm::CrmStore;
use lf_domain::config::Config;
use lf_mail::outbound::WebhookSender;
use lf_mail::provider::MailProvider;
use lf_registry::CompanyRegistry;

/// Shared application state passed to all API handlers.
///
/// The collaborators are trait objects so tests can substitute mocks
/// for the hosted services.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    /// Lead store (CRM REST adapter in production).
    pub crm: Arc<dyn CrmStore>,
    /// Conversation threads and assistant runs.
    pub assistant: Arc<dyn RunProvider>,
    /// Inbox access. `None` when the mail API is not configured;
    /// search then degrades to a friendly unavailable message.
    pub mail: Option<Arc<dyn MailProvider>>,
    /// Outbound email delivery. `None` means sends are logged only.
    pub outbound: Option<Arc<WebhookSender>>,
    /// Company-register officer lookups.
    pub registry: Arc<dyn CompanyRegistry>,
}
