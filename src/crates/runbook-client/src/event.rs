//! Parsed stream events.
//!
//! Events are the unit yielded to callers while a workflow executes remotely.
//! Payloads are arbitrary JSON passed through almost unchanged, so the model
//! is a tagged union with an explicit raw arm: the cases that drive client
//! behavior (heartbeats, termination signals, structural markers) stay
//! exhaustively matchable while any additional JSON is still accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminator for the frame a [`StreamEvent`] was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A `data:` frame with a JSON payload.
    Data,

    /// An `event:` frame carrying a structural label (e.g. `end`, `error`).
    #[serde(rename = "event")]
    Structural,

    /// A `retry:` frame. Informational only; it is surfaced to the caller
    /// and never fed back into the client's own backoff.
    RetryDirective,

    /// A `data:` frame whose payload was not valid JSON.
    Raw,
}

/// Payload of a stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    /// Decoded JSON payload.
    Json(Value),

    /// Undecoded text (raw payloads, structural labels, retry values).
    Text(String),
}

impl EventPayload {
    /// Decoded JSON payload, if any.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            EventPayload::Json(value) => Some(value),
            EventPayload::Text(_) => None,
        }
    }

    /// Text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EventPayload::Json(_) => None,
            EventPayload::Text(text) => Some(text),
        }
    }
}

/// One parsed event from the execution stream.
///
/// Immutable once created; yielded to the caller and not retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Frame discriminator.
    pub kind: EventKind,

    /// Frame payload.
    pub payload: EventPayload,

    /// Semantic type extracted from the payload when derivable
    /// (e.g. `heartbeat`, a step lifecycle tag, a structural label).
    pub event_type: Option<String>,
}

impl StreamEvent {
    /// Event for a decoded JSON `data:` payload.
    pub fn data(value: Value) -> Self {
        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            kind: EventKind::Data,
            payload: EventPayload::Json(value),
            event_type,
        }
    }

    /// Event for a `data:` payload that failed to decode as JSON.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Raw,
            payload: EventPayload::Text(text.into()),
            event_type: None,
        }
    }

    /// Event for an `event:` frame.
    pub fn structural(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            kind: EventKind::Structural,
            payload: EventPayload::Text(label.clone()),
            event_type: Some(label),
        }
    }

    /// Event for a `retry:` frame.
    pub fn retry_directive(value: impl Into<String>) -> Self {
        Self {
            kind: EventKind::RetryDirective,
            payload: EventPayload::Text(value.into()),
            event_type: None,
        }
    }

    /// Check whether this event signals liveness only.
    pub fn is_heartbeat(&self) -> bool {
        self.event_type.as_deref() == Some("heartbeat")
    }
}

/// Check whether a decoded `data:` payload carries an explicit termination
/// signal: a truthy `end` field, or a non-empty `finishReason`.
pub fn signals_termination(value: &Value) -> bool {
    if value.get("end").map(is_truthy).unwrap_or(false) {
        return true;
    }

    match value.get("finishReason") {
        Some(Value::String(reason)) => !reason.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
