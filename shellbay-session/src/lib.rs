//! # shellbay-session
//!
//! Per-project chat sessions for shellbay.
//!
//! A [`ChatSession`] turns a prompt into a live-updating artifact: it records
//! the prompt, streams code from a [`CodeGenerator`](shellbay_models::CodeGenerator),
//! rewrites the project's artifact after every chunk, and closes the turn with
//! an assistant message. A [`Workspace`] owns the [`ProjectStore`] and hands
//! out one session per project.
//!
//! ## Example
//!
//! ```rust,ignore
//! use shellbay_core::{AiProvider, Settings};
//! use shellbay_session::Workspace;
//! use std::sync::Arc;
//!
//! let settings = Settings::new().with_api_key(AiProvider::Gemini, api_key);
//! let workspace = Workspace::in_memory(Arc::new(settings));
//!
//! let project = workspace.create_project(Some("Pomodoro")).await?;
//! let session = workspace.open(&project.id).await?;
//! let mut events = session.chat().subscribe();
//! session.submit("A pomodoro timer with a start button").await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod chat;
pub mod error;
pub mod factory;
pub mod session;
pub mod store;
pub mod workspace;

pub use chat::{ChatEvent, GenerationGuard, ProjectChat};
pub use error::{StoreError, SubmitError, WorkspaceError};
pub use factory::{DefaultGeneratorFactory, FixedGeneratorFactory, GeneratorFactory};
pub use session::{ChatSession, TurnOutcome};
pub use store::{InMemoryProjectStore, ProjectStore};
pub use workspace::Workspace;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ChatEvent, ChatSession, GeneratorFactory, InMemoryProjectStore, ProjectStore,
        SubmitError, TurnOutcome, Workspace,
    };
}
