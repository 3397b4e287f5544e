//! Stream frame parser.
//!
//! Converts the raw lines of a streaming response body into [`StreamEvent`]s.
//! The per-line decision lives in the pure function [`parse_line`]; both the
//! async and blocking client variants consume it through [`FrameParser`], so
//! frame semantics cannot drift between the two.
//!
//! Protocol rules:
//! - `data: ` payloads are JSON-decoded; decode failure degrades to a raw
//!   event, it never aborts the stream.
//! - the literal payload `[DONE]` terminates the session without an event.
//! - a decoded payload with a truthy `end` or a non-empty `finishReason` is
//!   yielded first, then terminates the session.
//! - `event: end` yields a structural event and terminates; `event: error`
//!   and other labels yield without terminating.
//! - `retry: ` frames are surfaced as informational events.
//! - blank lines are frame separators; end of input is itself a valid
//!   terminal condition.

use crate::event::{signals_termination, StreamEvent};
use serde_json::Value;
use std::time::Instant;

/// Explicit end-of-stream sentinel payload.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Lifecycle of one execution session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The session is consuming input.
    Active,

    /// A terminal condition was recognized; no further input is consumed.
    Terminated,
}

/// Decision produced by [`parse_line`] for a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Frame separator or unrecognized line; nothing to emit.
    Skip,

    /// Yield an event and stay active.
    Emit(StreamEvent),

    /// Yield an event, then terminate. The terminating event itself is
    /// never dropped.
    EmitAndTerminate(StreamEvent),

    /// Terminate without yielding (the `[DONE]` sentinel).
    Terminate,
}

/// Parse one line of the stream protocol.
///
/// Pure: no session state is read or written here. Termination is expressed
/// in the returned outcome and applied by [`FrameParser`].
pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.is_empty() {
        return LineOutcome::Skip;
    }

    if let Some(payload) = line.strip_prefix("data: ") {
        if payload == DONE_SENTINEL {
            return LineOutcome::Terminate;
        }

        return match serde_json::from_str::<Value>(payload) {
            Ok(value) => {
                let terminal = signals_termination(&value);
                let event = StreamEvent::data(value);
                if terminal {
                    LineOutcome::EmitAndTerminate(event)
                } else {
                    LineOutcome::Emit(event)
                }
            }
            Err(_) => LineOutcome::Emit(StreamEvent::raw(payload)),
        };
    }

    if let Some(label) = line.strip_prefix("event: ") {
        let event = StreamEvent::structural(label);
        return if label == "end" {
            LineOutcome::EmitAndTerminate(event)
        } else {
            LineOutcome::Emit(event)
        };
    }

    if let Some(value) = line.strip_prefix("retry: ") {
        return LineOutcome::Emit(StreamEvent::retry_directive(value));
    }

    LineOutcome::Skip
}

/// Applies [`LineOutcome`]s to one execution session.
///
/// Owned exclusively by the call driving a single execution; never shared
/// across calls. Once terminated it consumes no further input.
#[derive(Debug)]
pub struct FrameParser {
    state: SessionState,
    last_heartbeat: Option<Instant>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            state: SessionState::Active,
            last_heartbeat: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a terminal condition has been recognized.
    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Instant of the most recent heartbeat, if any was observed.
    ///
    /// Heartbeats are yielded to the caller like any other event; this
    /// accessor only exposes their recency for liveness checks.
    pub fn last_heartbeat(&self) -> Option<Instant> {
        self.last_heartbeat
    }

    /// Feed one line, returning the event to yield, if any.
    pub fn feed_line(&mut self, line: &str) -> Option<StreamEvent> {
        if self.is_terminated() {
            return None;
        }

        match parse_line(line) {
            LineOutcome::Skip => None,
            LineOutcome::Emit(event) => {
                if event.is_heartbeat() {
                    self.last_heartbeat = Some(Instant::now());
                }
                Some(event)
            }
            LineOutcome::EmitAndTerminate(event) => {
                self.state = SessionState::Terminated;
                Some(event)
            }
            LineOutcome::Terminate => {
                self.state = SessionState::Terminated;
                None
            }
        }
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reassembles protocol lines from arbitrary byte chunks.
///
/// Network chunks can split a line anywhere, including inside a CRLF pair or
/// a multi-byte codepoint, so bytes are buffered until a full line is seen.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete line it closes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let tail = self.buf.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.buf, tail);
            line.pop(); // trailing '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Drain the trailing unterminated line at end of input, if any.
    pub fn flush(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(line.trim_end_matches('\r').to_string())
    }
}
