//! `config show` / `config validate` subcommands.

use lf_domain::config::Config;

pub fn show(config: &Config) -> anyhow::Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Report missing required settings. Returns false when any were found.
pub fn validate(config: &Config) -> bool {
    let mut issues = Vec::new();

    if config.crm.base_url.is_empty() {
        issues.push("crm.base_url is empty");
    }
    if config.crm.access_token.is_none() {
        issues.push("crm.access_token is not set");
    }
    if config.assistant.api_key.is_none() {
        issues.push("assistant.api_key is not set");
    }
    if config.assistant.assistant_id.is_empty() {
        issues.push("assistant.assistant_id is empty");
    }
    if config.mail.access_token.is_none() {
        issues.push("mail.access_token is not set (email search disabled)");
    }
    if config.outbound.webhook_url.is_none() {
        issues.push("outbound.webhook_url is not set (email delivery disabled)");
    }
    if config.runtime.poll_budget == 0 {
        issues.push("runtime.poll_budget must be at least 1");
    }

    if issues.is_empty() {
        println!("configuration ok");
        true
    } else {
        for issue in &issues {
            println!("warning: {issue}");
        }
        false
    }
}
