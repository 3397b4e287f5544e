//! Blocking façade over the async client.
//!
//! Same semantics as [`WorkflowClient`](crate::WorkflowClient), iterated on
//! the calling thread. Both variants drive the exact same frame parser, so
//! event content, ordering, and termination are observably identical; only
//! the way the next chunk of input is awaited differs.
//!
//! Must not be used from inside an async runtime; it owns one of its own.

use crate::client::{EventStream, WorkflowClient, WorkflowDefinition};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::event::StreamEvent;
use futures::StreamExt;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Blocking client for executing workflows.
pub struct BlockingWorkflowClient {
    inner: WorkflowClient,
    runtime: Arc<Runtime>,
}

impl BlockingWorkflowClient {
    /// Create a new blocking client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| {
                ClientError::Execution(format!("failed to start async runtime: {}", err))
            })?;

        Ok(Self {
            inner: WorkflowClient::new(config),
            runtime: Arc::new(runtime),
        })
    }

    /// Execute a workflow, blocking until the complete event list is ready.
    pub fn execute(
        &self,
        definition: impl Into<WorkflowDefinition>,
        parameters: Option<Map<String, Value>>,
    ) -> Result<Vec<StreamEvent>> {
        self.runtime.block_on(self.inner.execute(definition, parameters))
    }

    /// Execute a workflow and iterate its events as they arrive.
    ///
    /// Blocks until the response headers are received, then returns an
    /// iterator that blocks per event. Dropping the iterator closes the
    /// underlying connection.
    pub fn execute_stream(
        &self,
        definition: impl Into<WorkflowDefinition>,
        parameters: Option<Map<String, Value>>,
    ) -> Result<BlockingEventIterator> {
        let stream = self
            .runtime
            .block_on(self.inner.execute_stream(definition, parameters))?;

        Ok(BlockingEventIterator {
            runtime: Arc::clone(&self.runtime),
            stream,
        })
    }
}

/// Blocking iterator over execution events.
///
/// Single-pass and non-restartable, like the async stream it wraps.
pub struct BlockingEventIterator {
    runtime: Arc<Runtime>,
    stream: EventStream,
}

impl Iterator for BlockingEventIterator {
    type Item = Result<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}
