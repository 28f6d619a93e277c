// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! V2RX transcription sessions.
//!
//! Once audio is uploaded and the platform webhook fires, the session status
//! carries one output per requested template.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::client::{path_segment, read_value, ApiRequest, EkaCareClient};
use crate::error::{EkaCareError, Result};

const STATUS_PATH: &str = "/voice/api/v3/status";

pub struct V2Rx<'a> {
    client: &'a EkaCareClient,
}

/// Processing state of a single template output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemplateStatus {
    InProgress,
    Success,
    PartialSuccess,
    Failure,
    /// Status string this SDK does not know about
    Other(String),
}

impl TemplateStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TemplateStatus::Success | TemplateStatus::PartialSuccess | TemplateStatus::Failure
        )
    }
}

impl From<String> for TemplateStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "in-progress" | "in_progress" => TemplateStatus::InProgress,
            "success" => TemplateStatus::Success,
            "partial_success" => TemplateStatus::PartialSuccess,
            "failure" => TemplateStatus::Failure,
            _ => TemplateStatus::Other(value),
        }
    }
}

impl From<TemplateStatus> for String {
    fn from(status: TemplateStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateStatus::InProgress => write!(f, "in-progress"),
            TemplateStatus::Success => write!(f, "success"),
            TemplateStatus::PartialSuccess => write!(f, "partial_success"),
            TemplateStatus::Failure => write!(f, "failure"),
            TemplateStatus::Other(other) => write!(f, "{}", other),
        }
    }
}

fn default_status() -> TemplateStatus {
    TemplateStatus::InProgress
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateOutput {
    pub template_id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_status")]
    pub status: TemplateStatus,

    #[serde(default)]
    pub errors: Vec<Value>,

    #[serde(default)]
    pub warnings: Vec<Value>,

    /// Template output; usually base64 or JSON depending on `kind`
    #[serde(default)]
    pub value: Option<Value>,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Snapshot of a transcription session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    /// 202 while the platform is still processing
    pub http_status: u16,
    pub output: Vec<TemplateOutput>,
    /// Full response body
    pub raw: Value,
}

impl SessionStatus {
    /// Build a status from the HTTP status code and body.
    /// Outputs are read from `data.output`, or a top-level `output`.
    pub fn from_response(http_status: u16, raw: Value) -> Result<Self> {
        let output = raw
            .pointer("/data/output")
            .or_else(|| raw.get("output"))
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));

        let output = if output.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(output)?
        };

        Ok(Self {
            http_status,
            output,
            raw,
        })
    }

    /// Every template has finished, successfully or not
    pub fn is_complete(&self) -> bool {
        self.http_status != StatusCode::ACCEPTED.as_u16()
            && !self.output.is_empty()
            && self.output.iter().all(|o| o.status.is_terminal())
    }

    pub fn failed_templates(&self) -> impl Iterator<Item = &TemplateOutput> {
        self.output
            .iter()
            .filter(|o| o.status == TemplateStatus::Failure)
    }

    pub fn template(&self, template_id: &str) -> Option<&TemplateOutput> {
        self.output.iter().find(|o| o.template_id == template_id)
    }
}

/// How often and how long to poll a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(300),
        }
    }
}

impl<'a> V2Rx<'a> {
    pub(crate) fn new(client: &'a EkaCareClient) -> Self {
        Self { client }
    }

    /// Fetch the current status of a transcription session.
    pub async fn get_session_status(&self, txn_id: &str, action: &str) -> Result<SessionStatus> {
        let encoded = path_segment("txn_id", txn_id)?;

        let mut request = ApiRequest::get(format!("{}/{}", STATUS_PATH, encoded));
        if !action.is_empty() {
            request = request.query("action", action);
        }

        let response = self.client.execute(&request).await?;
        let http_status = response.status().as_u16();
        let body = read_value(response).await?;

        SessionStatus::from_response(http_status, body)
    }

    /// Poll until every template output is terminal or the timeout elapses.
    pub async fn wait_for_session(
        &self,
        txn_id: &str,
        action: &str,
        options: PollOptions,
    ) -> Result<SessionStatus> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let status = self.get_session_status(txn_id, action).await?;
            if status.is_complete() {
                info!(txn_id = %txn_id, attempts, "Session complete");
                return Ok(status);
            }

            let elapsed = started.elapsed();
            if elapsed.saturating_add(options.interval) >= options.timeout {
                return Err(EkaCareError::Timeout(format!(
                    "session {} still processing after {:?} ({} polls)",
                    txn_id, elapsed, attempts
                )));
            }

            debug!(txn_id = %txn_id, attempts, "Session still processing");
            sleep(options.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_body(statuses: &[&str]) -> Value {
        let output: Vec<Value> = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                json!({
                    "template_id": format!("template_{}", i),
                    "name": "Clinical notes",
                    "status": status,
                    "errors": [],
                    "warnings": [{"code": "low_audio"}],
                    "value": "eyJrIjoidiJ9",
                    "type": "json"
                })
            })
            .collect();
        json!({ "data": { "output": output } })
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(TemplateStatus::from("in-progress".to_string()), TemplateStatus::InProgress);
        assert_eq!(
            TemplateStatus::from("partial_success".to_string()),
            TemplateStatus::PartialSuccess
        );
        assert_eq!(
            TemplateStatus::from("queued".to_string()),
            TemplateStatus::Other("queued".into())
        );
        assert_eq!(TemplateStatus::Failure.to_string(), "failure");
        assert!(!TemplateStatus::Other("queued".into()).is_terminal());
    }

    #[test]
    fn test_parse_complete_session() {
        let status = SessionStatus::from_response(200, sample_body(&["success", "failure"])).unwrap();
        assert_eq!(status.output.len(), 2);
        assert!(status.is_complete());
        assert_eq!(status.failed_templates().count(), 1);

        let first = status.template("template_0").unwrap();
        assert_eq!(first.name.as_deref(), Some("Clinical notes"));
        assert_eq!(first.kind.as_deref(), Some("json"));
        assert_eq!(first.warnings.len(), 1);
    }

    #[test]
    fn test_accepted_is_never_complete() {
        let status = SessionStatus::from_response(202, sample_body(&["success"])).unwrap();
        assert!(!status.is_complete());
    }

    #[test]
    fn test_in_progress_template_blocks_completion() {
        let status =
            SessionStatus::from_response(206, sample_body(&["success", "in-progress"])).unwrap();
        assert!(!status.is_complete());
    }

    #[test]
    fn test_top_level_output_and_empty_body() {
        let status = SessionStatus::from_response(
            200,
            json!({"output": [{"template_id": "t", "status": "success"}]}),
        )
        .unwrap();
        assert_eq!(status.output[0].status, TemplateStatus::Success);
        assert!(status.is_complete());

        let empty = SessionStatus::from_response(202, Value::Null).unwrap();
        assert!(empty.output.is_empty());
        assert!(!empty.is_complete());
    }
}
