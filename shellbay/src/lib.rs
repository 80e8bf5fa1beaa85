//! # shellbay
//!
//! Describe an app in plain language and watch its code being written.
//!
//! shellbay keeps one chat per project. Each prompt is sent, together with
//! the conversation so far, to a remote model that streams back source code.
//! The project's artifact is rewritten after every streamed chunk, so a
//! preview subscribed to [`ChatEvent`]s redraws while generation is still
//! running.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shellbay::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let workspace = Workspace::in_memory(Arc::new(settings));
//!
//!     let project = workspace.create_project(Some("Timer")).await?;
//!     let session = workspace.open(&project.id).await?;
//!
//!     let outcome = session.submit("A pomodoro timer with a start button").await?;
//!     println!("{outcome:?}\n{}", session.chat().artifact());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`shellbay_core`] - Messages, projects, settings and configuration errors
//! - [`shellbay_streaming`] - Incremental SSE line decoding
//! - [`shellbay_retries`] - Retry policy for opening a generation
//! - [`shellbay_models`] - The [`CodeGenerator`] trait, Gemini client, code extraction
//! - [`shellbay_session`] - Chat sessions, project store and workspace
//!
//! For one-off requests without a project, see [`direct`].

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod direct;

pub use shellbay_core;
pub use shellbay_models;
pub use shellbay_retries;
pub use shellbay_session;
pub use shellbay_streaming;

pub use shellbay_core::{
    to_provider_history, AiProvider, ChatMessage, ConfigError, CredentialSource, MessageRole,
    Project, ProjectUpdate, ProviderRole, ProviderTurn, Settings, SharedSettings,
};
pub use shellbay_models::{
    collect_text, extract_code, strip_code_fence, CodeGenerator, GeminiGenerator, MockGenerator,
    ModelError, TextStream,
};
pub use shellbay_retries::{RetryConfig, WaitStrategy};
pub use shellbay_session::{
    ChatEvent, ChatSession, DefaultGeneratorFactory, FixedGeneratorFactory, GeneratorFactory,
    InMemoryProjectStore, ProjectChat, ProjectStore, StoreError, SubmitError, TurnOutcome,
    Workspace, WorkspaceError,
};
pub use shellbay_streaming::{SseLineDecoder, SseStreamExt};

pub use direct::{generate_code, generate_code_sync, stream_generate, DirectError, GeneratorSpec};

/// Prelude for common imports.
///
/// ```ignore
/// use shellbay::prelude::*;
/// ```
pub mod prelude {
    pub use crate::direct::{generate_code, stream_generate};
    pub use crate::{
        AiProvider, ChatEvent, ChatMessage, ChatSession, CodeGenerator, CredentialSource,
        GeminiGenerator, MockGenerator, Project, RetryConfig, Settings, SharedSettings,
        SubmitError, TurnOutcome, Workspace,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_with_mock() {
        let settings = Settings::new().with_api_key(AiProvider::Gemini, "key");
        let mock = MockGenerator::new().with_chunks(["export default ", "function App() {}"]);
        let workspace = Workspace::in_memory(std::sync::Arc::new(settings))
            .with_factory(FixedGeneratorFactory::new(mock));

        let project = workspace.create_project(Some("Demo")).await.unwrap();
        let session = workspace.open(&project.id).await.unwrap();
        let outcome = session.submit("An empty app").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(session.chat().artifact(), "export default function App() {}");
    }
}
