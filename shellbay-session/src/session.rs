//! Generation turns.
//!
//! A turn takes one prompt through the whole cycle: validation, recording
//! the user message, generation, live artifact updates, and a closing
//! assistant message.
//!
//! ```text
//! submit("A todo app")
//!   ├─ reject empty prompt / missing credential / busy project
//!   ├─ history = conversation so far
//!   ├─ append user message
//!   ├─ open stream (retried per RetryConfig)
//!   ├─ for each chunk: accumulator += chunk; artifact = accumulator
//!   └─ append completion, failure or cancellation message
//! ```

use crate::chat::ProjectChat;
use crate::error::SubmitError;
use crate::factory::GeneratorFactory;
use futures::StreamExt;
use shellbay_core::{to_provider_history, ChatMessage, CredentialSource, ProviderTurn};
use shellbay_models::CodeGenerator;
use shellbay_retries::{with_retry, RetryConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How an accepted turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream ended normally.
    Completed,
    /// Generation failed with this description.
    Failed(String),
    /// The turn was cancelled.
    Cancelled,
}

impl TurnOutcome {
    /// Check if the turn completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }

    fn closing_message(&self) -> ChatMessage {
        match self {
            TurnOutcome::Completed => ChatMessage::completion(),
            TurnOutcome::Failed(description) => ChatMessage::failure(description),
            TurnOutcome::Cancelled => ChatMessage::cancelled(),
        }
    }
}

/// Chat session bound to one project.
pub struct ChatSession {
    chat: Arc<ProjectChat>,
    credentials: Arc<dyn CredentialSource>,
    factory: Arc<dyn GeneratorFactory>,
    retry: RetryConfig,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("chat", &self.chat)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Create a session over a loaded project.
    pub fn new(
        chat: Arc<ProjectChat>,
        credentials: Arc<dyn CredentialSource>,
        factory: Arc<dyn GeneratorFactory>,
    ) -> Self {
        Self {
            chat,
            credentials,
            factory,
            retry: RetryConfig::default(),
        }
    }

    /// Retry policy for opening a generation. Defaults to no retries.
    #[must_use]
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// The project's chat state.
    pub fn chat(&self) -> &Arc<ProjectChat> {
        &self.chat
    }

    /// The project ID.
    pub fn project_id(&self) -> &str {
        self.chat.project_id()
    }

    /// Whether a turn is running.
    pub fn is_generating(&self) -> bool {
        self.chat.is_generating()
    }

    /// Run a streaming turn.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] if the prompt was not accepted. Generation
    /// failures are not errors: they end the turn with
    /// [`TurnOutcome::Failed`] and an assistant message describing them.
    pub async fn submit(&self, prompt: &str) -> Result<TurnOutcome, SubmitError> {
        self.submit_with_cancel(prompt, CancellationToken::new())
            .await
    }

    /// Run a streaming turn that stops when `cancel` fires.
    ///
    /// On cancellation the artifact keeps whatever was written last and a
    /// cancellation message closes the turn.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit).
    pub async fn submit_with_cancel(
        &self,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<TurnOutcome, SubmitError> {
        let generator = self.accept(prompt)?;
        let _guard = self
            .chat
            .try_begin_generation()
            .ok_or(SubmitError::Busy)?;
        let history = self.record_prompt(prompt).await?;

        info!(
            project_id = %self.project_id(),
            generator = generator.name(),
            history = history.len(),
            "Generation started"
        );
        let outcome = self
            .stream_turn(generator.as_ref(), prompt, &history, &cancel)
            .await;
        self.finish(&outcome).await;
        Ok(outcome)
    }

    /// Run a turn without streaming: the artifact is replaced once, with
    /// the extracted code.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit).
    pub async fn submit_atomic(&self, prompt: &str) -> Result<TurnOutcome, SubmitError> {
        self.submit_atomic_with_cancel(prompt, CancellationToken::new())
            .await
    }

    /// Non-streaming turn that stops when `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit).
    pub async fn submit_atomic_with_cancel(
        &self,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<TurnOutcome, SubmitError> {
        let generator = self.accept(prompt)?;
        let _guard = self
            .chat
            .try_begin_generation()
            .ok_or(SubmitError::Busy)?;
        let history = self.record_prompt(prompt).await?;

        info!(
            project_id = %self.project_id(),
            generator = generator.name(),
            "Atomic generation started"
        );
        let outcome = self
            .atomic_turn(generator.as_ref(), prompt, &history, &cancel)
            .await;
        self.finish(&outcome).await;
        Ok(outcome)
    }

    /// Validate the prompt and build the generator for the active provider.
    fn accept(&self, prompt: &str) -> Result<Arc<dyn CodeGenerator>, SubmitError> {
        if prompt.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        let (provider, credential) = self.credentials.require_active()?;
        self.factory
            .create(provider, &credential)
            .map_err(SubmitError::from_factory)
    }

    /// Capture the history, then record the prompt.
    async fn record_prompt(&self, prompt: &str) -> Result<Vec<ProviderTurn>, SubmitError> {
        let history = to_provider_history(&self.chat.messages());
        self.chat.append_message(ChatMessage::user(prompt)).await?;
        Ok(history)
    }

    async fn stream_turn(
        &self,
        generator: &dyn CodeGenerator,
        prompt: &str,
        history: &[ProviderTurn],
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => return TurnOutcome::Cancelled,
            result = with_retry(&self.retry, || generator.stream_generate(prompt, history)) => result,
        };
        let mut stream = match opened {
            Ok(stream) => stream,
            Err(e) => {
                warn!(project_id = %self.project_id(), error = %e, "Failed to open generation");
                return TurnOutcome::Failed(e.to_string());
            }
        };

        let mut accumulated = String::new();
        let mut chunks = 0usize;
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(project_id = %self.project_id(), chunks, "Generation cancelled");
                    return TurnOutcome::Cancelled;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    accumulated.push_str(&chunk);
                    chunks += 1;
                    if let Err(e) = self.chat.replace_artifact(accumulated.clone()).await {
                        error!(project_id = %self.project_id(), error = %e, "Failed to write artifact");
                        return TurnOutcome::Failed(e.to_string());
                    }
                    debug!(project_id = %self.project_id(), len = accumulated.len(), "Artifact updated");
                }
                Some(Err(e)) => {
                    warn!(project_id = %self.project_id(), chunks, error = %e, "Generation failed mid-stream");
                    return TurnOutcome::Failed(e.to_string());
                }
                None => {
                    info!(project_id = %self.project_id(), chunks, len = accumulated.len(), "Generation completed");
                    return TurnOutcome::Completed;
                }
            }
        }
    }

    async fn atomic_turn(
        &self,
        generator: &dyn CodeGenerator,
        prompt: &str,
        history: &[ProviderTurn],
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return TurnOutcome::Cancelled,
            result = with_retry(&self.retry, || generator.generate_code(prompt, history)) => result,
        };

        match result {
            Ok(code) => match self.chat.replace_artifact(code).await {
                Ok(()) => TurnOutcome::Completed,
                Err(e) => {
                    error!(project_id = %self.project_id(), error = %e, "Failed to write artifact");
                    TurnOutcome::Failed(e.to_string())
                }
            },
            Err(e) => {
                warn!(project_id = %self.project_id(), error = %e, "Atomic generation failed");
                TurnOutcome::Failed(e.to_string())
            }
        }
    }

    async fn finish(&self, outcome: &TurnOutcome) {
        if let Err(e) = self.chat.append_message(outcome.closing_message()).await {
            error!(project_id = %self.project_id(), error = %e, "Failed to record closing message");
        }
    }
}
