//! Chat messages and role vocabularies.
//!
//! The application speaks in [`MessageRole`] (`user` / `assistant`) while the
//! generation provider speaks in [`ProviderRole`] (`user` / `model`). The two
//! enumerations are kept apart and joined by an explicit mapping.

use crate::identifier::{generate_message_id, now_utc};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Acknowledgment appended after a successful generation turn.
pub const COMPLETION_ACKNOWLEDGMENT: &str =
    "I've generated the code based on your requirements. Check the preview!";

/// Acknowledgment appended when a turn is cancelled.
pub const CANCELLED_ACKNOWLEDGMENT: &str = "Generation cancelled.";

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The person typing prompts.
    User,
    /// The builder answering them.
    Assistant,
}

impl MessageRole {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn role understood by the generation provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    /// A turn authored by the user (also carries the system instruction).
    User,
    /// A turn authored by the model.
    Model,
}

impl ProviderRole {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderRole::User => "user",
            ProviderRole::Model => "model",
        }
    }
}

impl From<MessageRole> for ProviderRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => ProviderRole::User,
            MessageRole::Assistant => ProviderRole::Model,
        }
    }
}

/// A single message in a project conversation.
///
/// Messages are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID.
    pub id: String,
    /// Author role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message with a fresh ID and the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role,
            content: content.into(),
            timestamp: now_utc(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// The assistant acknowledgment for a completed turn.
    #[must_use]
    pub fn completion() -> Self {
        Self::assistant(COMPLETION_ACKNOWLEDGMENT)
    }

    /// The assistant message describing a failed turn.
    pub fn failure(description: impl fmt::Display) -> Self {
        Self::assistant(format!(
            "Error: {}. Please check your API key in Settings.",
            description
        ))
    }

    /// The assistant message for a cancelled turn.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::assistant(CANCELLED_ACKNOWLEDGMENT)
    }

    /// Check if this message was written by the user.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// One history entry in the provider's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderTurn {
    /// Provider role.
    pub role: ProviderRole,
    /// Turn text.
    pub text: String,
}

impl ProviderTurn {
    /// Create a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::User,
            text: text.into(),
        }
    }

    /// Create a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ProviderRole::Model,
            text: text.into(),
        }
    }
}

impl From<&ChatMessage> for ProviderTurn {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.into(),
            text: message.content.clone(),
        }
    }
}

/// Map a conversation into provider history, preserving order.
#[must_use]
pub fn to_provider_history(messages: &[ChatMessage]) -> Vec<ProviderTurn> {
    messages.iter().map(ProviderTurn::from).collect()
}
