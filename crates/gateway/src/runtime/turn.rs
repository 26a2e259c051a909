//! Turn orchestration: drain the thread, append the user message,
//! drive the run through its tool pauses, and return the assistant's
//! reply.

use std::time::Duration;

use lf_assistant::{MessageRole, RunState};
use lf_domain::{Error, Result};

use crate::state::AppState;

use super::instructions;
use super::tools;

#[derive(Debug, Clone)]
pub struct TurnInput {
    pub thread_id: String,
    pub lead_id: Option<String>,
    pub message: String,
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub message_id: String,
    pub content: String,
}

/// Run one conversation turn to completion.
///
/// All intervals and budgets come from `RuntimeConfig`, so tests can
/// run the whole loop with millisecond timings.
pub async fn submit_turn(state: &AppState, input: TurnInput) -> Result<TurnOutcome> {
    let rt = &state.config.runtime;
    let thread_id = input.thread_id.as_str();

    if thread_id.is_empty() || input.message.is_empty() {
        return Err(Error::Validation(
            "Thread ID and message are required".into(),
        ));
    }

    // ── Phase 1: drain ────────────────────────────────────────────────
    // Wait for any leftover run to release the thread. Status-endpoint
    // failures are non-fatal; the append below is the real gate.
    for attempt in 0..rt.drain_attempts {
        match state.assistant.active_runs(thread_id).await {
            Ok(0) => break,
            Ok(active) => {
                tracing::debug!(thread_id, active, attempt, "waiting for thread to drain");
                tokio::time::sleep(Duration::from_millis(rt.drain_interval_ms)).await;
            }
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "run status check failed, proceeding anyway");
                break;
            }
        }
    }

    // ── Phase 2: append the user message ──────────────────────────────
    let metadata = None;
    let mut appended = false;
    for attempt in 0..=rt.busy_retries {
        match state
            .assistant
            .add_message(thread_id, &input.message, &input.attachments, metadata.clone())
            .await
        {
            Ok(_) => {
                appended = true;
                break;
            }
            Err(Error::ThreadBusy(_)) if attempt < rt.busy_retries => {
                tracing::info!(thread_id, attempt, "thread still busy, backing off");
                tokio::time::sleep(Duration::from_millis(rt.busy_backoff_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
    if !appended {
        return Err(Error::ThreadBusy(
            "thread still busy after all append retries".into(),
        ));
    }

    // ── Phase 3: create the run ───────────────────────────────────────
    let catalog = tools::tool_catalog();
    let run_instructions = instructions::run_instructions(input.attachments.len());
    let run = state
        .assistant
        .create_run(thread_id, &catalog, &run_instructions)
        .await?;
    let run_id = run.id.clone();
    tracing::info!(thread_id, run_id = %run_id, "assistant run started");

    // ── Phase 4: poll, dispatching tool pauses ────────────────────────
    let mut handle = run;
    let mut budget = rt.poll_budget;
    while handle.state.is_active() {
        if budget == 0 {
            // Best-effort cancel so the thread isn't left held.
            if let Err(e) = state.assistant.cancel_run(thread_id, &run_id).await {
                tracing::warn!(thread_id, run_id = %run_id, error = %e, "cancel after timeout failed");
            }
            return Err(Error::Timeout("assistant response timeout".into()));
        }
        budget -= 1;

        if handle.state == RunState::RequiresAction && !handle.pending_tool_calls.is_empty() {
            let outputs =
                tools::dispatch_all(state, &handle.pending_tool_calls, input.lead_id.as_deref())
                    .await;
            state
                .assistant
                .submit_tool_outputs(thread_id, &run_id, &outputs)
                .await?;
        }

        tokio::time::sleep(Duration::from_millis(rt.poll_interval_ms)).await;
        handle = state.assistant.run_status(thread_id, &run_id).await?;
    }

    // ── Phase 5: collect the reply ────────────────────────────────────
    if handle.state != RunState::Completed {
        return Err(Error::Upstream {
            status: 502,
            body: format!(
                "assistant run ended with status {:?}{}",
                handle.state,
                handle
                    .last_error
                    .map(|e| format!(": {e}"))
                    .unwrap_or_default()
            ),
        });
    }

    let messages = state.assistant.list_messages(thread_id, 1).await?;
    let latest = messages
        .into_iter()
        .next()
        .ok_or_else(|| Error::Other("no assistant response found".into()))?;
    if latest.role != MessageRole::Assistant {
        return Err(Error::Other("no assistant response found".into()));
    }

    Ok(TurnOutcome {
        message_id: latest.id,
        content: latest.text,
    })
}
