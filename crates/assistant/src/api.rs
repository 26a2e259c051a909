//! REST adapter for the assistants-v2-shaped API: threads, messages,
//! runs, tool-output submission.

use std::time::Duration;

use serde_json::{json, Map, Value};

use lf_domain::config::AssistantConfig;
use lf_domain::tool::{ToolCall, ToolDefinition, ToolOutput};
use lf_domain::{Error, Result};

use crate::runs::{MessageRole, RunHandle, RunProvider, RunState, ThreadMessage};

const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

pub struct AssistantApi {
    base_url: String,
    api_key: String,
    assistant_id: String,
    temperature: f32,
    max_completion_tokens: u32,
    client: reqwest::Client,
}

impl AssistantApi {
    pub fn new(cfg: &AssistantConfig) -> Result<Self> {
        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("assistant.api_key is required".into()))?;
        if cfg.assistant_id.is_empty() {
            return Err(Error::Config("assistant.assistant_id is required".into()));
        }
        let assistant_id = cfg.assistant_id.clone();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            assistant_id,
            temperature: cfg.temperature,
            max_completion_tokens: cfg.max_completion_tokens,
            client,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<Value> {
        let resp = req.send().await.map_err(|e| Error::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !(200..300).contains(&status) {
            // A message appended while a run holds the thread comes
            // back as a 400 naming the active run.
            if status == 400 && body.contains("while a run") && body.contains("is active") {
                return Err(Error::ThreadBusy(body));
            }
            return Err(Error::from_status(status, body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn run_from_value(value: &Value) -> RunHandle {
        let state = value
            .get("status")
            .and_then(Value::as_str)
            .map(RunState::from_str)
            .unwrap_or(RunState::Failed);
        let pending_tool_calls = value
            .pointer("/required_action/submit_tool_outputs/tool_calls")
            .and_then(Value::as_array)
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|call| {
                        let call_id = call.get("id")?.as_str()?.to_string();
                        let name = call.pointer("/function/name")?.as_str()?.to_string();
                        let raw_args = call
                            .pointer("/function/arguments")
                            .and_then(Value::as_str)
                            .unwrap_or("{}");
                        let arguments =
                            serde_json::from_str(raw_args).unwrap_or(Value::Object(Map::new()));
                        Some(ToolCall {
                            call_id,
                            name,
                            arguments,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        RunHandle {
            id: value
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            state,
            pending_tool_calls,
            last_error: value
                .pointer("/last_error/message")
                .and_then(Value::as_str)
                .map(String::from),
        }
    }

    fn message_from_value(value: &Value) -> ThreadMessage {
        let role = match value.get("role").and_then(Value::as_str) {
            Some("assistant") => MessageRole::Assistant,
            Some("system") => MessageRole::System,
            _ => MessageRole::User,
        };
        // Concatenate the text parts; other content types are skipped.
        let text = value
            .get("content")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.pointer("/text/value").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        let metadata = value
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        ThreadMessage {
            id: value
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            role,
            text,
            metadata,
        }
    }
}

#[async_trait::async_trait]
impl RunProvider for AssistantApi {
    async fn create_thread(&self) -> Result<String> {
        let value = self
            .execute(self.request(reqwest::Method::POST, "/threads").json(&json!({})))
            .await?;
        value
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| Error::Other("thread creation returned no id".into()))
    }

    async fn add_message(
        &self,
        thread_id: &str,
        text: &str,
        attachments: &[String],
        metadata: Option<Map<String, Value>>,
    ) -> Result<String> {
        let mut body = json!({ "role": "user", "content": text });
        if !attachments.is_empty() {
            let attached: Vec<Value> = attachments
                .iter()
                .map(|file_id| {
                    json!({ "file_id": file_id, "tools": [{ "type": "file_search" }] })
                })
                .collect();
            body["attachments"] = Value::Array(attached);
        }
        if let Some(metadata) = metadata {
            body["metadata"] = Value::Object(metadata);
        }
        let value = self
            .execute(
                self.request(
                    reqwest::Method::POST,
                    &format!("/threads/{thread_id}/messages"),
                )
                .json(&body),
            )
            .await?;
        value
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| Error::Other("message creation returned no id".into()))
    }

    async fn active_runs(&self, thread_id: &str) -> Result<usize> {
        let value = self
            .execute(
                self.request(
                    reqwest::Method::GET,
                    &format!("/threads/{thread_id}/runs?limit=10"),
                ),
            )
            .await?;
        let count = value
            .get("data")
            .and_then(Value::as_array)
            .map(|runs| {
                runs.iter()
                    .filter(|run| {
                        run.get("status")
                            .and_then(Value::as_str)
                            .map(RunState::from_str)
                            .map(|s| s.is_active())
                            .unwrap_or(false)
                    })
                    .count()
            })
            .unwrap_or(0);
        Ok(count)
    }

    async fn create_run(
        &self,
        thread_id: &str,
        tools: &[ToolDefinition],
        instructions: &str,
    ) -> Result<RunHandle> {
        let mut tools: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        // Attached documents are retrieved through the built-in file_search tool.
        tools.push(json!({ "type": "file_search" }));
        let body = json!({
            "assistant_id": self.assistant_id,
            "instructions": instructions,
            "tools": tools,
            "temperature": self.temperature,
            "max_completion_tokens": self.max_completion_tokens,
        });
        let value = self
            .execute(
                self.request(reqwest::Method::POST, &format!("/threads/{thread_id}/runs"))
                    .json(&body),
            )
            .await?;
        Ok(Self::run_from_value(&value))
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunHandle> {
        let value = self
            .execute(self.request(
                reqwest::Method::GET,
                &format!("/threads/{thread_id}/runs/{run_id}"),
            ))
            .await?;
        Ok(Self::run_from_value(&value))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<()> {
        let outputs: Vec<Value> = outputs
            .iter()
            .map(|o| json!({ "tool_call_id": o.call_id, "output": o.output }))
            .collect();
        self.execute(
            self.request(
                reqwest::Method::POST,
                &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            )
            .json(&json!({ "tool_outputs": outputs })),
        )
        .await?;
        Ok(())
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<()> {
        tracing::warn!(thread_id, run_id, "cancelling run");
        self.execute(self.request(
            reqwest::Method::POST,
            &format!("/threads/{thread_id}/runs/{run_id}/cancel"),
        ))
        .await?;
        Ok(())
    }

    async fn list_messages(&self, thread_id: &str, limit: usize) -> Result<Vec<ThreadMessage>> {
        let value = self
            .execute(self.request(
                reqwest::Method::GET,
                &format!("/threads/{thread_id}/messages?order=desc&limit={limit}"),
            ))
            .await?;
        let messages = value
            .get("data")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Self::message_from_value).collect())
            .unwrap_or_default();
        Ok(messages)
    }
}
