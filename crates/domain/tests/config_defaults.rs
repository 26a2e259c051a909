//! Default and override behavior for the TOML config.

use lf_domain::config::Config;

#[test]
fn empty_toml_yields_full_defaults() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.server.port, 8710);
    assert_eq!(cfg.crm.thread_id_field, "cf_Thread_ID");
    assert_eq!(cfg.mail.fetch_cap, 100);
    assert_eq!(cfg.runtime.poll_budget, 45);
    assert_eq!(cfg.runtime.busy_retries, 3);
    assert_eq!(cfg.branding.company_name, "Forbes Burton");
    assert!(cfg.outbound.webhook_url.is_none());
}

#[test]
fn partial_section_keeps_sibling_defaults() {
    let cfg: Config = toml::from_str(
        r#"
[runtime]
poll_interval_ms = 10
poll_budget = 5

[crm]
base_url = "https://crm.example.com/crm/v2"
access_token = "tok"
"#,
    )
    .unwrap();
    assert_eq!(cfg.runtime.poll_interval_ms, 10);
    assert_eq!(cfg.runtime.poll_budget, 5);
    // Siblings untouched by the override keep their defaults.
    assert_eq!(cfg.runtime.drain_attempts, 20);
    assert_eq!(cfg.crm.base_url, "https://crm.example.com/crm/v2");
    assert_eq!(cfg.crm.timeout_ms, 15_000);
}

#[test]
fn unknown_keys_are_rejected_nowhere() {
    // The config is forward-compatible: unknown keys are ignored.
    let cfg: Config = toml::from_str("[server]\nhost = \"0.0.0.0\"\nfuture_knob = 1\n").unwrap();
    assert_eq!(cfg.server.host, "0.0.0.0");
}
