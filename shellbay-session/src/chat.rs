//! Observable per-project chat state.
//!
//! [`ProjectChat`] holds an in-memory copy of a project's conversation and
//! artifact, writes every change through to the [`ProjectStore`] first, and
//! then publishes a [`ChatEvent`] so a preview or message list can redraw.

use crate::error::StoreError;
use crate::store::ProjectStore;
use parking_lot::RwLock;
use shellbay_core::ChatMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CAPACITY: usize = 256;

/// A change to a project's chat state.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// A message was appended to the conversation.
    MessageAppended(ChatMessage),
    /// The artifact was replaced with this value.
    ArtifactReplaced(String),
    /// A generation turn started.
    GenerationStarted,
    /// The generation turn ended, however it ended.
    GenerationFinished,
}

#[derive(Debug, Default)]
struct Snapshot {
    messages: Vec<ChatMessage>,
    artifact: String,
}

/// Conversation, artifact and generating flag of one project.
pub struct ProjectChat {
    project_id: String,
    store: Arc<dyn ProjectStore>,
    snapshot: RwLock<Snapshot>,
    generating: AtomicBool,
    events: broadcast::Sender<ChatEvent>,
}

impl std::fmt::Debug for ProjectChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.read();
        f.debug_struct("ProjectChat")
            .field("project_id", &self.project_id)
            .field("messages", &snapshot.messages.len())
            .field("artifact_len", &snapshot.artifact.len())
            .field("generating", &self.is_generating())
            .finish()
    }
}

impl ProjectChat {
    /// Load a project's state from the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the project does not exist.
    pub async fn load(
        project_id: impl Into<String>,
        store: Arc<dyn ProjectStore>,
    ) -> Result<Self, StoreError> {
        let project_id = project_id.into();
        let project = store
            .get_project(&project_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(project_id.clone()))?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            project_id,
            store,
            snapshot: RwLock::new(Snapshot {
                messages: project.messages,
                artifact: project.code,
            }),
            generating: AtomicBool::new(false),
            events,
        })
    }

    /// The project this chat belongs to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Copy of the conversation.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.snapshot.read().messages.clone()
    }

    /// Number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.snapshot.read().messages.len()
    }

    /// Current artifact.
    pub fn artifact(&self) -> String {
        self.snapshot.read().artifact.clone()
    }

    /// Whether a generation turn is running.
    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// Subscribe to changes.
    ///
    /// A receiver that falls more than a few hundred events behind gets
    /// `RecvError::Lagged`; the current state is always available from
    /// [`messages`](Self::messages) and [`artifact`](Self::artifact).
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// Append a message.
    ///
    /// # Errors
    ///
    /// Returns the store error; the in-memory copy is left unchanged.
    pub async fn append_message(&self, message: ChatMessage) -> Result<(), StoreError> {
        self.store
            .append_message(&self.project_id, message.clone())
            .await?;
        self.snapshot.write().messages.push(message.clone());
        self.publish(ChatEvent::MessageAppended(message));
        Ok(())
    }

    /// Replace the artifact.
    ///
    /// # Errors
    ///
    /// Returns the store error; the in-memory copy is left unchanged.
    pub async fn replace_artifact(&self, code: String) -> Result<(), StoreError> {
        self.store
            .replace_code(&self.project_id, code.clone())
            .await?;
        self.snapshot.write().artifact.clone_from(&code);
        self.publish(ChatEvent::ArtifactReplaced(code));
        Ok(())
    }

    /// Mark the project as generating.
    ///
    /// Returns `None` if a turn is already running. The flag is cleared when
    /// the guard drops.
    pub fn try_begin_generation(&self) -> Option<GenerationGuard<'_>> {
        let guard = self.acquire(true)?;
        self.publish(ChatEvent::GenerationStarted);
        Some(guard)
    }

    /// Hold the generating flag without announcing a turn, so that no turn
    /// can start while the project is being removed.
    pub(crate) fn try_reserve(&self) -> Option<GenerationGuard<'_>> {
        self.acquire(false)
    }

    fn acquire(&self, announce: bool) -> Option<GenerationGuard<'_>> {
        self.generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GenerationGuard {
                chat: self,
                announce,
            })
    }

    fn publish(&self, event: ChatEvent) {
        // No subscribers is fine.
        if self.events.send(event).is_err() {
            debug!(project_id = %self.project_id, "No chat subscribers");
        }
    }
}

/// Clears the generating flag on drop.
#[must_use = "the generating flag is cleared as soon as the guard drops"]
pub struct GenerationGuard<'a> {
    chat: &'a ProjectChat,
    announce: bool,
}

impl std::fmt::Debug for GenerationGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationGuard")
            .field("project_id", &self.chat.project_id)
            .finish()
    }
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        self.chat.generating.store(false, Ordering::Release);
        if self.announce {
            self.chat.publish(ChatEvent::GenerationFinished);
        }
    }
}
