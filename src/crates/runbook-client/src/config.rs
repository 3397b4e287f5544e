//! Client configuration.

use crate::error::{ClientError, Result};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a workflow execution client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API token sent as a bearer credential.
    pub api_token: String,

    /// Base URL of the remote execution endpoint.
    ///
    /// Example: "https://workflows.example.com"
    pub base_url: String,

    /// Runner identifier. An opaque routing hint the remote endpoint
    /// requires; the client passes it through as a query parameter.
    pub runner: String,

    /// Request timeout duration.
    ///
    /// Bounds the whole call in non-streaming mode, and only the wait for
    /// the response headers in streaming mode.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Retry policy for connection establishment.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Create a new client configuration.
    pub fn new(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        runner: impl Into<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: base_url.into(),
            runner: runner.into(),
            timeout: default_timeout(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create configuration with the token read from an environment variable.
    pub fn from_env(
        env_var: &str,
        base_url: impl Into<String>,
        runner: impl Into<String>,
    ) -> Result<Self> {
        let api_token = std::env::var(env_var).map_err(|_| {
            ClientError::Execution(format!("API token not found in environment: {}", env_var))
        })?;

        Ok(Self::new(api_token, base_url, runner))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}
