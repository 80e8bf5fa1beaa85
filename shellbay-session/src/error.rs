//! Session, store and workspace errors.

use shellbay_core::ConfigError;
use shellbay_models::ModelError;
use thiserror::Error;

/// Errors from a [`ProjectStore`](crate::ProjectStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Project was not found.
    #[error("Project not found: {0}")]
    NotFound(String),

    /// Project already exists.
    #[error("Project already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Backend(String),
}

/// Reasons a prompt was not accepted.
///
/// When one of these is returned nothing was appended to the conversation,
/// except for [`SubmitError::Store`], where the user message could not be
/// written.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The prompt was empty or whitespace-only.
    #[error("Prompt is empty")]
    EmptyInput,

    /// Provider configuration is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A generation is already running for this project.
    #[error("A generation is already in progress for this project")]
    Busy,

    /// The generator could not be constructed.
    #[error("Failed to create generator: {0}")]
    Generator(ModelError),

    /// Recording the user message failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SubmitError {
    /// Map a generator construction failure, keeping configuration problems
    /// as [`ConfigError`].
    pub(crate) fn from_factory(err: ModelError) -> Self {
        match err {
            ModelError::MissingCredential(p) => ConfigError::MissingCredential(p).into(),
            ModelError::UnsupportedProvider(p) => ConfigError::UnsupportedProvider(p).into(),
            other => SubmitError::Generator(other),
        }
    }
}

/// Errors from [`Workspace`](crate::Workspace) operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The project is generating and cannot be removed.
    #[error("Project {0} is generating")]
    Busy(String),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use shellbay_core::AiProvider;

    #[test]
    fn test_factory_errors_become_config_errors() {
        let err = SubmitError::from_factory(ModelError::MissingCredential(AiProvider::Gemini));
        assert!(matches!(
            err,
            SubmitError::Config(ConfigError::MissingCredential(AiProvider::Gemini))
        ));

        let err = SubmitError::from_factory(ModelError::UnsupportedProvider(AiProvider::OpenAi));
        assert!(matches!(
            err,
            SubmitError::Config(ConfigError::UnsupportedProvider(AiProvider::OpenAi))
        ));

        let err = SubmitError::from_factory(ModelError::transport("tls"));
        assert!(matches!(err, SubmitError::Generator(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::NotFound("proj_1".into()).to_string(),
            "Project not found: proj_1"
        );
        assert_eq!(SubmitError::EmptyInput.to_string(), "Prompt is empty");
    }
}
