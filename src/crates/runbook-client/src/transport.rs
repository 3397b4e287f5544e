//! Retry-aware HTTP session.
//!
//! Sends the single POST that starts a workflow execution, retrying
//! connection establishment on the policy's eligible status codes. An
//! already-started stream is never retried here.

use crate::error::{ClientError, Result};
use crate::retry::RetryPolicy;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP session shared read-only across the executions of one client.
#[derive(Clone)]
pub struct HttpSession {
    client: Client,
    api_token: String,
    retry: RetryPolicy,
}

impl HttpSession {
    /// Create a new session with the given credentials and retry policy.
    pub fn new(api_token: impl Into<String>, retry: RetryPolicy) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_token: api_token.into(),
            retry,
        }
    }

    /// POST a JSON body and return the live response.
    ///
    /// `timeout` bounds only the wait for the response headers; reading the
    /// streaming body afterwards is not separately bounded. Retries apply to
    /// eligible HTTP statuses and to connection-level failures; 401 and
    /// timeouts are surfaced immediately.
    pub async fn post(
        &self,
        url: &str,
        body: &Value,
        streaming: bool,
        timeout: Duration,
    ) -> Result<Response> {
        let mut attempt: u32 = 1;

        loop {
            match self.dispatch(url, body, streaming, timeout).await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        if attempt > 1 {
                            debug!(attempt, url, "request succeeded after retry");
                        }
                        return Ok(response);
                    }

                    if status == StatusCode::UNAUTHORIZED {
                        let body = read_error_body(response).await;
                        return Err(ClientError::Authentication(body.to_string()));
                    }

                    let code = status.as_u16();
                    if self.retry.is_retryable_status(code) && attempt < self.retry.max_attempts {
                        let delay = self.retry.backoff_delay(attempt - 1);
                        warn!(
                            status = code,
                            attempt,
                            max_attempts = self.retry.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            "retryable status, will retry after delay"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    let body = read_error_body(response).await;
                    return Err(ClientError::Api { status: code, body });
                }
                Err(err @ ClientError::Timeout(_)) => return Err(err),
                Err(err) => {
                    if err.is_retryable() && attempt < self.retry.max_attempts {
                        let delay = self.retry.backoff_delay(attempt - 1);
                        warn!(
                            error = %err,
                            attempt,
                            max_attempts = self.retry.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            "transient connection failure, will retry after delay"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn dispatch(
        &self,
        url: &str,
        body: &Value,
        streaming: bool,
        timeout: Duration,
    ) -> Result<Response> {
        let mut request = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .json(body);

        if streaming {
            request = request.header(ACCEPT, "text/event-stream");
        }

        match tokio::time::timeout(timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(ClientError::from_transport(err)),
            Err(_) => Err(ClientError::Timeout(format!(
                "no response headers within {:?}",
                timeout
            ))),
        }
    }
}

/// Best-effort parse of an error response body for diagnostics.
async fn read_error_body(response: Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    parse_error_body(&text)
}

fn parse_error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
