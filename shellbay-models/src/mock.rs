//! Scripted generator for tests and demos.
//!
//! ```rust
//! use shellbay_models::MockGenerator;
//!
//! let generator = MockGenerator::new()
//!     .with_chunks(["import React", " from 'react';"])
//!     .with_open_failure(503, "overloaded");
//! ```

use crate::error::ModelError;
use crate::extract::extract_code;
use crate::generator::{CodeGenerator, TextStream};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use shellbay_core::ProviderTurn;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// A failure the mock can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum MockFailure {
    /// Connection-level failure.
    Transport(String),
    /// Non-success HTTP status.
    Request {
        /// HTTP status.
        status: u16,
        /// Provider message.
        message: String,
    },
}

impl MockFailure {
    fn to_error(&self) -> ModelError {
        match self {
            MockFailure::Transport(msg) => ModelError::transport(msg.clone()),
            MockFailure::Request { status, message } => ModelError::request(*status, message.clone()),
        }
    }
}

/// One scripted response.
#[derive(Debug, Clone, PartialEq)]
pub enum MockScript {
    /// Yield the chunks, then end.
    Chunks(Vec<String>),
    /// Yield the chunks, then fail.
    FailAfter {
        /// Chunks delivered before the failure.
        chunks: Vec<String>,
        /// The failure.
        failure: MockFailure,
    },
    /// Yield the chunks, then never finish.
    Hang(Vec<String>),
    /// Fail before any chunk.
    OpenFailure(MockFailure),
}

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// The new prompt.
    pub prompt: String,
    /// History passed with it.
    pub history: Vec<ProviderTurn>,
    /// Whether it was a streaming call.
    pub streaming: bool,
}

#[derive(Debug, Default)]
struct MockState {
    scripts: VecDeque<MockScript>,
    requests: Vec<RecordedRequest>,
}

/// Generator answering from a queue of scripts.
///
/// Clones share the same queue and request log.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    state: Arc<Mutex<MockState>>,
    chunk_delay: Option<Duration>,
}

impl MockGenerator {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a script.
    #[must_use]
    pub fn with_script(self, script: MockScript) -> Self {
        self.push(script);
        self
    }

    /// Queue a successful stream.
    #[must_use]
    pub fn with_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockScript::Chunks(chunks.into_iter().map(Into::into).collect()))
    }

    /// Queue a stream that fails after some chunks.
    #[must_use]
    pub fn with_failure_after<I, S>(self, chunks: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockScript::FailAfter {
            chunks: chunks.into_iter().map(Into::into).collect(),
            failure: MockFailure::Transport(message.into()),
        })
    }

    /// Queue a stream that never completes after its chunks.
    #[must_use]
    pub fn with_hang<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_script(MockScript::Hang(chunks.into_iter().map(Into::into).collect()))
    }

    /// Queue an HTTP failure when opening.
    #[must_use]
    pub fn with_open_failure(self, status: u16, message: impl Into<String>) -> Self {
        self.with_script(MockScript::OpenFailure(MockFailure::Request {
            status,
            message: message.into(),
        }))
    }

    /// Sleep this long before each chunk.
    #[must_use]
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = Some(delay);
        self
    }

    /// Queue a script on a shared mock.
    pub fn push(&self, script: MockScript) {
        self.state.lock().scripts.push_back(script);
    }

    /// Requests received so far.
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Number of calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Scripts not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.state.lock().scripts.len()
    }

    fn next_script(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
        streaming: bool,
    ) -> Result<MockScript, ModelError> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest {
            prompt: prompt.to_string(),
            history: history.to_vec(),
            streaming,
        });
        state
            .scripts
            .pop_front()
            .ok_or_else(|| ModelError::invalid_response("mock generator has no scripted response"))
    }

    fn chunk_stream(&self, chunks: Vec<String>) -> TextStream {
        let items = stream::iter(chunks.into_iter().map(Ok::<String, ModelError>));
        match self.chunk_delay {
            Some(delay) => Box::pin(items.then(move |item| async move {
                tokio::time::sleep(delay).await;
                item
            })),
            None => Box::pin(items),
        }
    }
}

#[async_trait]
impl CodeGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_generate(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<TextStream, ModelError> {
        match self.next_script(prompt, history, true)? {
            MockScript::Chunks(chunks) => Ok(self.chunk_stream(chunks)),
            MockScript::FailAfter { chunks, failure } => {
                let tail = stream::once(async move { Err(failure.to_error()) });
                Ok(Box::pin(self.chunk_stream(chunks).chain(tail)))
            }
            MockScript::Hang(chunks) => Ok(Box::pin(self.chunk_stream(chunks).chain(stream::pending()))),
            MockScript::OpenFailure(failure) => Err(failure.to_error()),
        }
    }

    async fn generate_code(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<String, ModelError> {
        match self.next_script(prompt, history, false)? {
            MockScript::Chunks(chunks) | MockScript::Hang(chunks) => {
                Ok(extract_code(&chunks.concat()))
            }
            MockScript::FailAfter { failure, .. } | MockScript::OpenFailure(failure) => {
                Err(failure.to_error())
            }
        }
    }
}
