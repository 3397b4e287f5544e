//! Streaming client for remote runbook workflow execution.
//!
//! This crate executes a long-running, server-driven workflow over a single
//! HTTP connection and consumes its progress as a live event stream. It
//! tolerates heartbeats, partial failures, timeouts, and transient network
//! errors, and translates transport/protocol failures into a small typed
//! error taxonomy.
//!
//! The workflow definition itself is an opaque JSON document supplied by the
//! caller; the remote engine that schedules and runs it is a black box
//! reached over HTTP.
//!
//! # Streaming Execution
//!
//! ```rust,ignore
//! use runbook_client::{ClientConfig, WorkflowClient};
//! use futures::StreamExt;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env(
//!         "RUNBOOK_API_TOKEN",
//!         "https://workflows.example.com",
//!         "prod-runner",
//!     )?;
//!     let client = WorkflowClient::new(config);
//!
//!     let definition = json!({
//!         "name": "restart-service",
//!         "steps": [{"action": "restart", "target": "api"}]
//!     });
//!
//!     let mut events = client
//!         .execute_stream(definition.as_object().cloned().unwrap(), None)
//!         .await?;
//!
//!     while let Some(event) = events.next().await {
//!         let event = event?;
//!         println!("{:?}: {:?}", event.kind, event.event_type);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Aggregate Execution
//!
//! ```rust,ignore
//! // Same semantics, collected into one ordered list.
//! let events = client.execute(definition, None).await?;
//! println!("workflow produced {} events", events.len());
//! ```
//!
//! # Blocking Variant
//!
//! ```rust,ignore
//! use runbook_client::blocking::BlockingWorkflowClient;
//!
//! let client = BlockingWorkflowClient::new(config)?;
//! for event in client.execute_stream(definition, None)? {
//!     println!("{:?}", event?);
//! }
//! ```

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod parser;
pub mod retry;
pub mod transport;

// Re-export commonly used types
pub use client::{EventStream, WorkflowClient, WorkflowDefinition};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use event::{EventKind, EventPayload, StreamEvent};
pub use parser::{FrameParser, LineBuffer, LineOutcome, SessionState};
pub use retry::RetryPolicy;
