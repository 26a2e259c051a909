//! Shared test doubles for gateway integration tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use lf_assistant::{RunHandle, RunProvider, RunState, ThreadMessage};
use lf_crm::CrmStore;
use lf_domain::config::Config;
use lf_domain::lead::{Lead, Page};
use lf_domain::tool::{ToolDefinition, ToolOutput};
use lf_domain::{Error, Result};
use lf_gateway::state::AppState;
use lf_mail::{MailMessage, MailProvider};
use lf_registry::{CompanyRegistry, OfficerLookup};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CRM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct MockCrm {
    pub lead: Mutex<Lead>,
    pub updates: Mutex<Vec<Map<String, Value>>>,
}

impl MockCrm {
    pub fn with_lead(lead: Lead) -> Self {
        Self {
            lead: Mutex::new(lead),
            updates: Mutex::new(Vec::new()),
        }
    }

    /// All values written for one field, across every update call.
    pub fn values_for(&self, field: &str) -> Vec<Value> {
        self.updates
            .lock()
            .iter()
            .filter_map(|fields| fields.get(field).cloned())
            .collect()
    }
}

#[async_trait]
impl CrmStore for MockCrm {
    async fn lead_by_id(&self, id: &str) -> Result<Lead> {
        let lead = self.lead.lock().clone();
        if lead.id == id {
            Ok(lead)
        } else {
            Err(Error::NotFound(format!("lead {id}")))
        }
    }

    async fn search_leads(&self, _criteria: &str, _page: u32, _per_page: u32) -> Result<Page<Lead>> {
        Ok(Page {
            items: vec![self.lead.lock().clone()],
            has_more: false,
        })
    }

    async fn update_lead_fields(&self, id: &str, fields: Map<String, Value>) -> Result<()> {
        let mut lead = self.lead.lock();
        if lead.id != id {
            return Err(Error::NotFound(format!("lead {id}")));
        }
        if let Some(activity) = fields.get("Activity").and_then(Value::as_str) {
            lead.activity = Some(activity.to_string());
        }
        self.updates.lock().push(fields);
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Scripted run provider. `create_run` hands out the first scripted
/// handle and each `run_status` call pops the next; when the script is
/// exhausted, `resting_state` is reported.
pub struct MockAssistant {
    pub script: Mutex<VecDeque<RunHandle>>,
    pub resting_state: RunState,
    /// `active_runs` answers, consumed front to back (then 0).
    pub active_counts: Mutex<VecDeque<usize>>,
    /// How many `add_message` calls to reject with `ThreadBusy` first.
    pub busy_rejections: Mutex<u32>,
    pub added_messages: Mutex<Vec<(String, Option<Map<String, Value>>)>>,
    pub submitted_outputs: Mutex<Vec<Vec<ToolOutput>>>,
    pub cancelled_runs: Mutex<Vec<String>>,
    /// Newest-first, as the real provider returns them.
    pub messages: Mutex<Vec<ThreadMessage>>,
    /// Cross-method call order, for pinning orchestration sequencing.
    pub calls: Mutex<Vec<&'static str>>,
}

impl MockAssistant {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            resting_state: RunState::Completed,
            active_counts: Mutex::new(VecDeque::new()),
            busy_rejections: Mutex::new(0),
            added_messages: Mutex::new(Vec::new()),
            submitted_outputs: Mutex::new(Vec::new()),
            cancelled_runs: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn scripted(handles: Vec<RunHandle>, resting_state: RunState) -> Self {
        let mut mock = Self::new();
        mock.script = Mutex::new(handles.into());
        mock.resting_state = resting_state;
        mock
    }

    fn next_handle(&self) -> RunHandle {
        self.script.lock().pop_front().unwrap_or(RunHandle {
            id: "run_1".into(),
            state: self.resting_state,
            pending_tool_calls: Vec::new(),
            last_error: None,
        })
    }
}

pub fn handle(state: RunState) -> RunHandle {
    RunHandle {
        id: "run_1".into(),
        state,
        pending_tool_calls: Vec::new(),
        last_error: None,
    }
}

#[async_trait]
impl RunProvider for MockAssistant {
    async fn create_thread(&self) -> Result<String> {
        Ok("thread_test".into())
    }

    async fn add_message(
        &self,
        _thread_id: &str,
        text: &str,
        _attachments: &[String],
        metadata: Option<Map<String, Value>>,
    ) -> Result<String> {
        self.calls.lock().push("add_message");
        {
            let mut busy = self.busy_rejections.lock();
            if *busy > 0 {
                *busy -= 1;
                return Err(Error::ThreadBusy("a run is active".into()));
            }
        }
        let mut added = self.added_messages.lock();
        added.push((text.to_string(), metadata));
        Ok(format!("msg_{}", added.len()))
    }

    async fn active_runs(&self, _thread_id: &str) -> Result<usize> {
        self.calls.lock().push("active_runs");
        Ok(self.active_counts.lock().pop_front().unwrap_or(0))
    }

    async fn create_run(
        &self,
        _thread_id: &str,
        _tools: &[ToolDefinition],
        _instructions: &str,
    ) -> Result<RunHandle> {
        self.calls.lock().push("create_run");
        Ok(self.next_handle())
    }

    async fn run_status(&self, _thread_id: &str, _run_id: &str) -> Result<RunHandle> {
        Ok(self.next_handle())
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<()> {
        self.submitted_outputs.lock().push(outputs.to_vec());
        Ok(())
    }

    async fn cancel_run(&self, _thread_id: &str, run_id: &str) -> Result<()> {
        self.cancelled_runs.lock().push(run_id.to_string());
        Ok(())
    }

    async fn list_messages(&self, _thread_id: &str, limit: usize) -> Result<Vec<ThreadMessage>> {
        Ok(self.messages.lock().iter().take(limit).cloned().collect())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mail and registry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct MockMail(pub Vec<MailMessage>);

#[async_trait]
impl MailProvider for MockMail {
    async fn list_inbox(&self, top: usize) -> Result<Vec<MailMessage>> {
        Ok(self.0.iter().take(top).cloned().collect())
    }
}

pub struct MockRegistry(pub OfficerLookup);

#[async_trait]
impl CompanyRegistry for MockRegistry {
    async fn officers(&self, _query: &str) -> Result<OfficerLookup> {
        Ok(self.0.clone())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn test_lead() -> Lead {
    Lead {
        id: "lead_42".into(),
        first_name: Some("Jane".into()),
        last_name: "Doe".into(),
        email: Some("jane@acme.example".into()),
        company: "Acme Ltd".into(),
        phone: Some("+44 1234 567890".into()),
        activity: Some("Questionnaire Sent".into()),
        thread_id: None,
        created_time: None,
        modified_time: None,
    }
}

/// Millisecond timings so the orchestration loops run instantly.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.runtime.drain_attempts = 3;
    config.runtime.drain_interval_ms = 1;
    config.runtime.busy_retries = 3;
    config.runtime.busy_backoff_ms = 1;
    config.runtime.poll_interval_ms = 1;
    config.runtime.poll_budget = 10;
    config
}

pub fn build_state(crm: Arc<MockCrm>, assistant: Arc<MockAssistant>) -> AppState {
    build_state_with(test_config(), crm, assistant)
}

pub fn build_state_with(
    config: Config,
    crm: Arc<MockCrm>,
    assistant: Arc<MockAssistant>,
) -> AppState {
    AppState {
        config: Arc::new(config),
        crm,
        assistant,
        mail: None,
        outbound: None,
        registry: Arc::new(MockRegistry(OfficerLookup::Found(Vec::new()))),
    }
}
