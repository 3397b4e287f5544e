//! Error types for workflow execution.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while executing a workflow.
///
/// This is a closed taxonomy: every failure the client can surface maps onto
/// exactly one of these kinds. The only failures handled internally are the
/// bounded connection-establishment retry and the malformed-frame-to-raw-event
/// degradation in the stream parser.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the credentials (HTTP 401). Never retried.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// DNS/socket/TLS failure before a response was obtained.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The configured timeout elapsed.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// A non-401 HTTP error status after retries were exhausted.
    #[error("API error {status}: {body}")]
    Api {
        status: u16,
        body: serde_json::Value,
    },

    /// Malformed caller input or a failure while draining the stream.
    #[error("execution error: {0}")]
    Execution(String),
}

impl ClientError {
    /// Check if this error is transient and eligible for retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Authentication(_))
    }

    /// Classify a transport-level `reqwest` failure.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Execution(err.to_string())
    }
}
