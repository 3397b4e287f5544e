//! Workflow execution client.
//!
//! The single public entry point for running a workflow on the remote
//! execution endpoint, in either of two modes:
//!
//! - [`WorkflowClient::execute_stream`] returns a lazy, single-pass sequence
//!   of [`StreamEvent`]s produced as the remote connection delivers them;
//! - [`WorkflowClient::execute`] drives that same sequence to completion and
//!   returns the full ordered list.
//!
//! Each call opens exactly one HTTP connection, owns its own parser state,
//! and closes the connection on every exit path (exhaustion, error, or the
//! caller dropping the stream early).

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::event::StreamEvent;
use crate::parser::{FrameParser, LineBuffer};
use crate::transport::HttpSession;
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde_json::{Map, Value};
use std::pin::Pin;
use tracing::debug;

/// Lazy stream of execution events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Reserved key the caller's parameters are merged under.
const PARAMETERS_KEY: &str = "parameters";

/// A workflow definition as supplied by the caller.
///
/// The client never interprets its contents beyond merging parameters in
/// before transmission. A JSON string is accepted and decoded first; the
/// outbound request body is byte-identical either way.
#[derive(Debug, Clone)]
pub enum WorkflowDefinition {
    /// An already-decoded JSON object.
    Object(Map<String, Value>),

    /// A JSON document that must decode to an object.
    Json(String),
}

impl WorkflowDefinition {
    fn into_object(self) -> Result<Map<String, Value>> {
        match self {
            WorkflowDefinition::Object(map) => Ok(map),
            WorkflowDefinition::Json(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => Ok(map),
                Ok(other) => Err(ClientError::Execution(format!(
                    "workflow definition must be a JSON object, got {}",
                    json_type_name(&other)
                ))),
                Err(err) => Err(ClientError::Execution(format!(
                    "workflow definition is not valid JSON: {}",
                    err
                ))),
            },
        }
    }
}

impl From<Map<String, Value>> for WorkflowDefinition {
    fn from(map: Map<String, Value>) -> Self {
        WorkflowDefinition::Object(map)
    }
}

impl From<String> for WorkflowDefinition {
    fn from(text: String) -> Self {
        WorkflowDefinition::Json(text)
    }
}

impl From<&str> for WorkflowDefinition {
    fn from(text: &str) -> Self {
        WorkflowDefinition::Json(text.to_string())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Client for executing workflows on a remote execution endpoint.
///
/// Cheap to clone; configuration and retry policy are shared read-only, and
/// every execution owns its own session state, so concurrent calls on one
/// instance do not interfere.
#[derive(Clone)]
pub struct WorkflowClient {
    config: ClientConfig,
    session: HttpSession,
}

impl WorkflowClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Self {
        let session = HttpSession::new(config.api_token.clone(), config.retry.clone());
        Self { config, session }
    }

    /// Execute a workflow and return the complete, ordered list of events.
    ///
    /// Blocks (asynchronously) for the full execution duration, bounded by
    /// the configured timeout. Returns either the whole list or an error,
    /// never a partial result.
    pub async fn execute(
        &self,
        definition: impl Into<WorkflowDefinition>,
        parameters: Option<Map<String, Value>>,
    ) -> Result<Vec<StreamEvent>> {
        let timeout = self.config.timeout;

        tokio::time::timeout(timeout, self.drain(definition.into(), parameters))
            .await
            .map_err(|_| {
                ClientError::Timeout(format!(
                    "workflow execution did not complete within {:?}",
                    timeout
                ))
            })?
    }

    /// Execute a workflow and return a lazy stream of events.
    ///
    /// The stream is single-pass and non-restartable. It ends exactly when a
    /// terminal frame is recognized or the connection closes; a close without
    /// an explicit terminal frame is an ordinary end of stream, not an error.
    /// Dropping the stream closes the underlying connection.
    ///
    /// The configured timeout bounds only the wait for the response headers;
    /// a stalled-but-open stream is observable through heartbeat events, not
    /// auto-terminated.
    pub async fn execute_stream(
        &self,
        definition: impl Into<WorkflowDefinition>,
        parameters: Option<Map<String, Value>>,
    ) -> Result<EventStream> {
        let body = build_request_body(definition.into(), parameters)?;
        let url = self.workflow_url();

        debug!(url = %url, runner = %self.config.runner, "dispatching workflow execution");

        let response = self
            .session
            .post(&url, &body, true, self.config.timeout)
            .await?;

        Ok(event_stream(response))
    }

    async fn drain(
        &self,
        definition: WorkflowDefinition,
        parameters: Option<Map<String, Value>>,
    ) -> Result<Vec<StreamEvent>> {
        let body = build_request_body(definition, parameters)?;
        let url = self.workflow_url();

        debug!(url = %url, runner = %self.config.runner, "dispatching workflow execution");

        let response = self
            .session
            .post(&url, &body, false, self.config.timeout)
            .await?;

        let mut stream = event_stream(response);
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event?);
        }
        Ok(events)
    }

    fn workflow_url(&self) -> String {
        format!(
            "{}/api/v1/workflow?runner={}&command=execute_workflow",
            self.config.base_url.trim_end_matches('/'),
            self.config.runner
        )
    }
}

/// Merge parameters into the definition and produce the request body.
fn build_request_body(
    definition: WorkflowDefinition,
    parameters: Option<Map<String, Value>>,
) -> Result<Value> {
    let mut body = definition.into_object()?;

    if let Some(params) = parameters {
        body.insert(PARAMETERS_KEY.to_string(), Value::Object(params));
    }

    Ok(Value::Object(body))
}

/// Turn a live response body into a stream of parsed events.
///
/// The response handle lives inside the stream, so dropping the stream drops
/// the connection on every exit path, including a caller-side early break.
fn event_stream(response: reqwest::Response) -> EventStream {
    Box::pin(try_stream! {
        let mut parser = FrameParser::new();
        let mut lines = LineBuffer::new();
        let mut body = response.bytes_stream();

        'read: while let Some(chunk) = body.next().await {
            let chunk = chunk
                .map_err(|err| ClientError::Execution(format!("stream read failed: {}", err)))?;

            for line in lines.push(&chunk) {
                if let Some(event) = parser.feed_line(&line) {
                    yield event;
                }
                if parser.is_terminated() {
                    break 'read;
                }
            }
        }

        // A trailing line without a newline still counts at end of input.
        if !parser.is_terminated() {
            if let Some(line) = lines.flush() {
                if let Some(event) = parser.feed_line(&line) {
                    yield event;
                }
            }
        }

        debug!(terminated = parser.is_terminated(), "event stream ended");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_definition() -> Map<String, Value> {
        json!({
            "name": "restart-service",
            "steps": [{"action": "restart", "target": "api"}]
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_body_identical_for_string_and_object() {
        let object_body =
            build_request_body(WorkflowDefinition::from(sample_definition()), None).unwrap();

        let text = serde_json::to_string(&Value::Object(sample_definition())).unwrap();
        let string_body = build_request_body(WorkflowDefinition::from(text), None).unwrap();

        assert_eq!(
            serde_json::to_vec(&object_body).unwrap(),
            serde_json::to_vec(&string_body).unwrap()
        );
    }

    #[test]
    fn test_parameters_merged_under_reserved_key() {
        let params = json!({"target": "db"}).as_object().cloned().unwrap();
        let body =
            build_request_body(WorkflowDefinition::from(sample_definition()), Some(params))
                .unwrap();

        assert_eq!(body["parameters"], json!({"target": "db"}));
        assert_eq!(body["name"], "restart-service");
    }

    #[test]
    fn test_no_parameters_key_when_absent() {
        let body = build_request_body(WorkflowDefinition::from(sample_definition()), None).unwrap();
        assert!(body.get("parameters").is_none());
    }

    #[test]
    fn test_invalid_json_string_is_execution_error() {
        let result = build_request_body(WorkflowDefinition::from("not json"), None);
        assert!(matches!(result, Err(ClientError::Execution(_))));
    }

    #[test]
    fn test_non_object_json_is_execution_error() {
        let result = build_request_body(WorkflowDefinition::from("[1, 2, 3]"), None);

        match result {
            Err(ClientError::Execution(msg)) => assert!(msg.contains("array")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_workflow_url_shape() {
        let config = crate::ClientConfig::new("t", "https://wf.example.com/", "runner-7");
        let client = WorkflowClient::new(config);

        assert_eq!(
            client.workflow_url(),
            "https://wf.example.com/api/v1/workflow?runner=runner-7&command=execute_workflow"
        );
    }
}
