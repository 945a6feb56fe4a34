//! Execution client abstraction.
//!
//! The [`ExecutionClient`] trait decouples the controller from the remote
//! execution service. Each call is exactly one request/response round trip:
//! no retries and no client-side timeout beyond the transport default. Tests
//! use scripted clients that never touch the network.

use std::error::Error as _;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::types::{ExecutionFailure, ExecutionOutcome, ExecutionRequest, ExecutionResult};
use crate::io::config::validate_origin;

/// Path of the run endpoint, appended to the configured origin.
pub const RUN_PATH: &str = "/api/compiler/run";

/// Response bodies are cut to this many characters in failure diagnostics.
const BODY_EXCERPT_CHARS: usize = 512;

/// Abstraction over execution backends.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Issue one execution request and wait for it to settle.
    async fn execute(&self, request: ExecutionRequest) -> ExecutionOutcome;
}

/// Client that POSTs JSON to `<origin>/api/compiler/run`.
#[derive(Debug, Clone)]
pub struct HttpExecutionClient {
    http: reqwest::Client,
    url: Url,
}

impl HttpExecutionClient {
    pub fn new(origin: &str) -> Result<Self> {
        let url = run_url(origin)?;
        let http = reqwest::Client::builder()
            .build()
            .context("build http client")?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Full run endpoint URL for `origin`. A trailing `/` on the origin is ignored.
pub fn run_url(origin: &str) -> Result<Url> {
    validate_origin("endpoint", origin)?;
    let joined = format!("{}{}", origin.trim_end_matches('/'), RUN_PATH);
    Url::parse(&joined).with_context(|| format!("build run url from `{origin}`"))
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    #[instrument(skip_all, fields(url = %self.url, language = %request.language))]
    async fn execute(&self, request: ExecutionRequest) -> ExecutionOutcome {
        debug!(
            code_bytes = request.source_code.len(),
            input_bytes = request.stdin.len(),
            "posting execution request"
        );
        let response = self
            .http
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_failure)?;
        if !status.is_success() {
            return Err(ExecutionFailure::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let result = parse_response_body(&body)?;
        debug!(
            status = status.as_u16(),
            output_bytes = result.output.len(),
            "execution request settled"
        );
        Ok(result)
    }
}

/// Parse a 2xx body.
///
/// The body must be a JSON object. A string `output` is the result; a missing
/// or `null` `output` counts as empty output. Any other shape is a failure.
pub fn parse_response_body(body: &str) -> ExecutionOutcome {
    let value: Value = serde_json::from_str(body).map_err(|err| ExecutionFailure::MalformedBody {
        reason: format!("invalid json ({err}): {}", excerpt(body)),
    })?;
    let Value::Object(fields) = &value else {
        return Err(ExecutionFailure::MalformedBody {
            reason: format!("expected a JSON object, got {}", json_type(&value)),
        });
    };
    match fields.get("output") {
        None | Some(Value::Null) => Ok(ExecutionResult::new("")),
        Some(Value::String(output)) => Ok(ExecutionResult::new(output.as_str())),
        Some(other) => Err(ExecutionFailure::MalformedBody {
            reason: format!("`output` must be a string, got {}", json_type(other)),
        }),
    }
}

/// Flatten a reqwest error and its source chain into one diagnostic line.
fn transport_failure(err: reqwest::Error) -> ExecutionFailure {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    if err.is_timeout() {
        message.push_str(" (timed out)");
    }
    ExecutionFailure::Transport { message }
}

fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
