//! # shellbay-core
//!
//! Core types for the shellbay code-generation pipeline.
//!
//! - **Messages**: chat messages and the two role vocabularies
//! - **Projects**: the conversation + artifact pair owned by a project
//! - **Settings**: provider selection and credentials
//! - **Errors**: configuration errors that block a turn
//! - **Identifiers**: prefixed UUIDs and timestamps
//!
//! ## Example
//!
//! ```rust
//! use shellbay_core::{ChatMessage, ProviderRole, ProviderTurn, to_provider_history};
//!
//! let history = to_provider_history(&[
//!     ChatMessage::user("Build a pomodoro timer"),
//!     ChatMessage::completion(),
//! ]);
//! assert_eq!(history[1].role, ProviderRole::Model);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod errors;
pub mod identifier;
pub mod messages;
pub mod project;
pub mod settings;

pub use errors::ConfigError;
pub use identifier::{generate_message_id, generate_project_id, now_utc};
pub use messages::{
    to_provider_history, ChatMessage, MessageRole, ProviderRole, ProviderTurn,
    CANCELLED_ACKNOWLEDGMENT, COMPLETION_ACKNOWLEDGMENT,
};
pub use project::{Project, ProjectUpdate, DEFAULT_PROJECT_DESCRIPTION, DEFAULT_PROJECT_NAME};
pub use settings::{AiProvider, CredentialSource, Settings, SharedSettings};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::errors::ConfigError;
    pub use crate::messages::{ChatMessage, MessageRole, ProviderRole, ProviderTurn};
    pub use crate::project::{Project, ProjectUpdate};
    pub use crate::settings::{AiProvider, CredentialSource, Settings, SharedSettings};
}
