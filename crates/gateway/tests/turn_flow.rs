//! End-to-end orchestration tests for conversation turns and tool
//! dispatch, driven against scripted collaborators.

mod support;

use std::sync::Arc;

use serde_json::{json, Map, Value};

use lf_assistant::{MessageRole, RunHandle, RunState, ThreadMessage};
use lf_domain::tool::ToolCall;
use lf_domain::Error;
use lf_gateway::runtime::tools;
use lf_gateway::runtime::{open_thread, submit_turn, TurnInput};

use support::{build_state, build_state_with, handle, test_config, test_lead, MockAssistant, MockCrm};

fn assistant_reply(text: &str) -> ThreadMessage {
    ThreadMessage {
        id: "msg_final".into(),
        role: MessageRole::Assistant,
        text: text.into(),
        metadata: Map::new(),
    }
}

fn turn_input(message: &str) -> TurnInput {
    TurnInput {
        thread_id: "thread_test".into(),
        lead_id: Some("lead_42".into()),
        message: message.into(),
        attachments: Vec::new(),
    }
}

fn parse_output(outputs: &[Vec<lf_domain::tool::ToolOutput>]) -> Value {
    serde_json::from_str(&outputs[0][0].output).unwrap()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn orchestration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn completed_run_returns_latest_assistant_message() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::scripted(
        vec![handle(RunState::InProgress), handle(RunState::Completed)],
        RunState::Completed,
    ));
    assistant
        .messages
        .lock()
        .push(assistant_reply("Here is the summary."));

    let state = build_state(crm, assistant.clone());
    let outcome = submit_turn(&state, turn_input("Summarise this lead"))
        .await
        .unwrap();

    assert_eq!(outcome.message_id, "msg_final");
    assert_eq!(outcome.content, "Here is the summary.");
    assert_eq!(assistant.added_messages.lock().len(), 1);
}

#[tokio::test]
async fn tool_pause_dispatches_and_submits_outputs() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let paused = RunHandle {
        id: "run_1".into(),
        state: RunState::RequiresAction,
        pending_tool_calls: vec![ToolCall {
            call_id: "call_1".into(),
            name: "update_lead_activity_confirmed".into(),
            arguments: json!({
                "leadId": "lead_42",
                "newActivity": "Questionnaire Chasing",
                "reason": "No response after a week",
            }),
        }],
        last_error: None,
    };
    let assistant = Arc::new(MockAssistant::scripted(
        vec![paused, handle(RunState::Completed)],
        RunState::Completed,
    ));
    assistant.messages.lock().push(assistant_reply("Done."));

    let state = build_state(crm.clone(), assistant.clone());
    submit_turn(&state, turn_input("Yes, chase them"))
        .await
        .unwrap();

    let submitted = assistant.submitted_outputs.lock();
    assert_eq!(submitted.len(), 1);
    let payload = parse_output(&submitted);
    assert_eq!(payload["success"], true);
    let message = payload["message"].as_str().unwrap();
    assert!(message.contains("✅ Activity updated successfully!"));
    assert!(message.contains("from \"Questionnaire Sent\" to \"Questionnaire Chasing\""));
    assert!(message.contains("🎯 NEXT ACTION SUGGESTION:"));

    assert_eq!(
        crm.values_for("Activity"),
        vec![json!("Questionnaire Chasing")]
    );
}

#[tokio::test]
async fn busy_thread_is_drained_before_appending() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::scripted(
        vec![handle(RunState::Completed)],
        RunState::Completed,
    ));
    // Two status checks still report an active run before it clears.
    assistant.active_counts.lock().extend([1, 1, 0]);
    assistant.messages.lock().push(assistant_reply("Hi."));

    let state = build_state(crm, assistant.clone());
    submit_turn(&state, turn_input("Hello")).await.unwrap();

    assert!(assistant.active_counts.lock().is_empty());
    assert_eq!(assistant.added_messages.lock().len(), 1);
}

#[tokio::test]
async fn second_turn_drains_before_creating_its_run() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::new());
    // First turn sees an idle thread; the second finds the first
    // turn's run still active for two checks before it clears.
    assistant.active_counts.lock().extend([0, 1, 1, 0]);
    assistant.messages.lock().push(assistant_reply("Hi."));

    let state = build_state(crm, assistant.clone());
    submit_turn(&state, turn_input("First question"))
        .await
        .unwrap();
    submit_turn(&state, turn_input("Second question"))
        .await
        .unwrap();

    assert_eq!(assistant.added_messages.lock().len(), 2);
    assert_eq!(
        *assistant.calls.lock(),
        vec![
            "active_runs",
            "add_message",
            "create_run",
            "active_runs",
            "active_runs",
            "active_runs",
            "add_message",
            "create_run",
        ],
    );
}

#[tokio::test]
async fn busy_append_retries_until_accepted() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::scripted(
        vec![handle(RunState::Completed)],
        RunState::Completed,
    ));
    *assistant.busy_rejections.lock() = 2;
    assistant.messages.lock().push(assistant_reply("Hi."));

    let state = build_state(crm, assistant.clone());
    submit_turn(&state, turn_input("Hello")).await.unwrap();

    assert_eq!(assistant.added_messages.lock().len(), 1);
}

#[tokio::test]
async fn busy_append_gives_up_after_retry_budget() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::new());
    *assistant.busy_rejections.lock() = 10;

    let state = build_state(crm, assistant.clone());
    let err = submit_turn(&state, turn_input("Hello")).await.unwrap_err();

    assert!(matches!(err, Error::ThreadBusy(_)), "{err:?}");
    assert!(assistant.added_messages.lock().is_empty());
}

#[tokio::test]
async fn stuck_run_is_cancelled_on_timeout() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::scripted(
        Vec::new(),
        RunState::InProgress,
    ));

    let mut config = test_config();
    config.runtime.poll_budget = 3;
    let state = build_state_with(config, crm, assistant.clone());
    let err = submit_turn(&state, turn_input("Hello")).await.unwrap_err();

    assert!(matches!(err, Error::Timeout(_)), "{err:?}");
    assert_eq!(assistant.cancelled_runs.lock().as_slice(), ["run_1"]);
}

#[tokio::test]
async fn failed_run_surfaces_last_error() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let failed = RunHandle {
        id: "run_1".into(),
        state: RunState::Failed,
        pending_tool_calls: Vec::new(),
        last_error: Some("rate_limit_exceeded".into()),
    };
    let assistant = Arc::new(MockAssistant::scripted(vec![failed], RunState::Failed));

    let state = build_state(crm, assistant);
    let err = submit_turn(&state, turn_input("Hello")).await.unwrap_err();

    match err {
        Error::Upstream { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("rate_limit_exceeded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn unknown_tool_reports_available_functions() {
    let state = build_state(
        Arc::new(MockCrm::with_lead(test_lead())),
        Arc::new(MockAssistant::new()),
    );
    let call = ToolCall {
        call_id: "call_1".into(),
        name: "format_hard_drive".into(),
        arguments: json!({}),
    };
    let output = tools::dispatch(&state, &call, None).await;
    let payload: Value = serde_json::from_str(&output.output).unwrap();
    let error = payload["error"].as_str().unwrap();
    assert!(error.contains("Unknown function: format_hard_drive"));
    assert!(error.contains("draft_email"));
    assert!(error.contains("search_emails"));
}

#[tokio::test]
async fn draft_email_never_sends() {
    let state = build_state(
        Arc::new(MockCrm::with_lead(test_lead())),
        Arc::new(MockAssistant::new()),
    );
    let call = ToolCall {
        call_id: "call_1".into(),
        name: "draft_email".into(),
        arguments: json!({
            "to": "jane@acme.example",
            "subject": "Quick question",
            "body": "Hello Jane",
            "emailType": "general",
        }),
    };
    let output = tools::dispatch(&state, &call, None).await;
    let payload: Value = serde_json::from_str(&output.output).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["requiresConfirmation"], true);
    assert_eq!(payload["draft"]["to"], "jane@acme.example");
}

#[tokio::test]
async fn confirmed_quotation_send_stamps_the_lead_once() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let state = build_state(crm.clone(), Arc::new(MockAssistant::new()));
    let call = ToolCall {
        call_id: "call_1".into(),
        name: "send_email_confirmed".into(),
        arguments: json!({
            "to": "jane@acme.example",
            "subject": "Your quote",
            "body": "Please find our quote attached.",
            "emailType": "quotation",
        }),
    };
    let output = tools::dispatch(&state, &call, Some("lead_42")).await;
    let payload: Value = serde_json::from_str(&output.output).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["emailType"], "quotation");

    let stamps = crm.values_for("Informal_Quote_Sent");
    assert_eq!(stamps.len(), 1);
    let stamp = stamps[0].as_str().unwrap();
    assert_eq!(stamp, chrono::Utc::now().format("%Y-%m-%d").to_string());
    assert!(crm.values_for("Questionnaire_Date_Sent").is_empty());
}

#[tokio::test]
async fn fresh_lead_progression_suggestion() {
    let state = build_state(
        Arc::new(MockCrm::with_lead(test_lead())),
        Arc::new(MockAssistant::new()),
    );
    let call = ToolCall {
        call_id: "call_1".into(),
        name: "suggest_activity_progression".into(),
        arguments: json!({
            "leadId": "lead_42",
            "currentActivity": "Fresh",
            "reason": "Lead has just come in",
        }),
    };
    let output = tools::dispatch(&state, &call, None).await;
    let payload: Value = serde_json::from_str(&output.output).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(
        payload["nextActivity"],
        "Attempting to make contact with lead"
    );
    let message = payload["message"].as_str().unwrap();
    assert!(message.contains("🔄 ACTIVITY PROGRESSION SUGGESTION:"));
    assert!(message.contains("Current Activity: \"Fresh\""));
}

#[tokio::test]
async fn terminal_stage_has_no_progression() {
    let state = build_state(
        Arc::new(MockCrm::with_lead(test_lead())),
        Arc::new(MockAssistant::new()),
    );
    let call = ToolCall {
        call_id: "call_1".into(),
        name: "suggest_activity_progression".into(),
        arguments: json!({
            "leadId": "lead_42",
            "currentActivity": "See Case Notes",
            "reason": "checking",
        }),
    };
    let output = tools::dispatch(&state, &call, None).await;
    let payload: Value = serde_json::from_str(&output.output).unwrap();
    assert_eq!(payload["success"], false);
    assert_eq!(
        payload["message"],
        "No next activity available for progression"
    );
}

#[tokio::test]
async fn email_search_without_mail_config_degrades_gracefully() {
    let state = build_state(
        Arc::new(MockCrm::with_lead(test_lead())),
        Arc::new(MockAssistant::new()),
    );
    let call = ToolCall {
        call_id: "call_1".into(),
        name: "search_emails".into(),
        arguments: json!({ "senderEmail": "jane@acme.example" }),
    };
    let output = tools::dispatch(&state, &call, None).await;
    let payload: Value = serde_json::from_str(&output.output).unwrap();
    assert_eq!(payload["success"], false);
    assert!(payload["message"]
        .as_str()
        .unwrap()
        .contains("📧 Email search functionality requires"));
}

#[tokio::test]
async fn email_search_formats_matches_from_the_inbox() {
    use chrono::TimeZone;
    let inbox = vec![
        lf_mail::MailMessage {
            id: "e1".into(),
            subject: "Re: questionnaire".into(),
            sender_name: "Jane Doe".into(),
            sender_address: "jane@acme.example".into(),
            received_at: chrono::Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap(),
            body_preview: "Thanks, attached as requested.".into(),
            has_attachments: true,
        },
        lf_mail::MailMessage {
            id: "e2".into(),
            subject: "Newsletter".into(),
            sender_name: "Marketing".into(),
            sender_address: "news@other.example".into(),
            received_at: chrono::Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap(),
            body_preview: "This week in business".into(),
            has_attachments: false,
        },
    ];
    let mut state = build_state(
        Arc::new(MockCrm::with_lead(test_lead())),
        Arc::new(MockAssistant::new()),
    );
    state.mail = Some(Arc::new(support::MockMail(inbox)));

    let call = ToolCall {
        call_id: "call_1".into(),
        name: "search_emails".into(),
        arguments: json!({ "senderEmail": "Jane@Acme.example" }),
    };
    let output = tools::dispatch(&state, &call, None).await;
    let payload: Value = serde_json::from_str(&output.output).unwrap();
    assert_eq!(payload["success"], true);
    assert_eq!(payload["emailCount"], 1);
    let message = payload["message"].as_str().unwrap();
    assert!(message.contains("📧 Found 1 email(s):"));
    assert!(message.contains("Subject: Re: questionnaire"));
    assert!(message.contains("📎 Has attachments"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Thread bootstrap
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn new_thread_is_persisted_and_primed() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::new());
    let state = build_state(crm.clone(), assistant.clone());

    let bootstrap = open_thread(&state, "lead_42", None).await.unwrap();

    assert_eq!(bootstrap.thread_id, "thread_test");
    assert!(!bootstrap.is_existing);
    assert!(bootstrap.messages.is_empty());

    let field = state.config.crm.thread_id_field.clone();
    assert_eq!(crm.values_for(&field), vec![json!("thread_test")]);

    let added = assistant.added_messages.lock();
    assert_eq!(added.len(), 1);
    let (text, metadata) = &added[0];
    assert!(text.contains("Lead Record Information:"));
    assert!(text.contains("Current Activity: Questionnaire Sent"));
    assert_eq!(
        metadata.as_ref().and_then(|m| m.get("leadflow.init")),
        Some(&json!("true"))
    );
}

#[tokio::test]
async fn existing_thread_is_reused_with_priming_hidden() {
    let crm = Arc::new(MockCrm::with_lead(test_lead()));
    let assistant = Arc::new(MockAssistant::new());
    let mut init_metadata = Map::new();
    init_metadata.insert("leadflow.init".into(), json!("true"));
    // Newest-first, as the provider returns them.
    *assistant.messages.lock() = vec![
        ThreadMessage {
            id: "m2".into(),
            role: MessageRole::Assistant,
            text: "How can I help?".into(),
            metadata: Map::new(),
        },
        ThreadMessage {
            id: "m1".into(),
            role: MessageRole::User,
            text: "Lead Record Information:\nName: Jane Doe".into(),
            metadata: init_metadata,
        },
    ];
    let state = build_state(crm.clone(), assistant);

    let bootstrap = open_thread(&state, "lead_42", Some("thread_old"))
        .await
        .unwrap();

    assert_eq!(bootstrap.thread_id, "thread_old");
    assert!(bootstrap.is_existing);
    assert_eq!(bootstrap.messages.len(), 1);
    assert_eq!(bootstrap.messages[0].id, "m2");
    assert!(crm.updates.lock().is_empty());
}
