//! Wire the production adapters into [`AppState`].

use std::sync::Arc;

use anyhow::Context;

use lf_assistant::AssistantApi;
use lf_crm::{RestCrm, StaticToken};
use lf_domain::config::Config;
use lf_mail::outbound::WebhookSender;
use lf_mail::GraphMail;
use lf_registry::CompaniesHouseScraper;

use crate::state::AppState;

pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    let crm_token = Arc::new(StaticToken(
        config.crm.access_token.clone().unwrap_or_default(),
    ));
    let crm = Arc::new(RestCrm::new(&config.crm, crm_token).context("CRM adapter")?);

    let assistant = Arc::new(AssistantApi::new(&config.assistant).context("assistant adapter")?);

    let mail = match &config.mail.access_token {
        Some(token) => {
            let mail_token = Arc::new(StaticToken(token.clone()));
            Some(Arc::new(GraphMail::new(&config.mail, mail_token).context("mail adapter")?)
                as Arc<dyn lf_mail::provider::MailProvider>)
        }
        None => {
            tracing::info!("mail.access_token not set, email search disabled");
            None
        }
    };

    let outbound = match &config.outbound.webhook_url {
        Some(url) => Some(Arc::new(
            WebhookSender::new(url.clone()).context("outbound webhook")?,
        )),
        None => {
            tracing::info!("outbound.webhook_url not set, email sends will be logged only");
            None
        }
    };

    let registry = Arc::new(CompaniesHouseScraper::new(&config.registry).context("registry")?);

    Ok(AppState {
        config,
        crm,
        assistant,
        mail,
        outbound,
        registry,
    })
}
