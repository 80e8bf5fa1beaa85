//! Error types shared across shellbay crates.

use crate::settings::AiProvider;
use thiserror::Error;

/// Configuration problems that block a turn before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The active provider has no credential.
    #[error("Please configure your {} in Settings first", .0.credential_label())]
    MissingCredential(AiProvider),

    /// No generator is available for the provider.
    #[error("Provider '{0}' is not supported for code generation yet")]
    UnsupportedProvider(AiProvider),

    /// The provider name is not recognised.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),
}

impl ConfigError {
    /// The provider this error is about, when known.
    #[must_use]
    pub fn provider(&self) -> Option<AiProvider> {
        match self {
            ConfigError::MissingCredential(p) | ConfigError::UnsupportedProvider(p) => Some(*p),
            ConfigError::UnknownProvider(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_display() {
        let err = ConfigError::MissingCredential(AiProvider::Gemini);
        assert_eq!(
            err.to_string(),
            "Please configure your Google AI Studio API key in Settings first"
        );
        assert_eq!(err.provider(), Some(AiProvider::Gemini));
    }

    #[test]
    fn test_unknown_provider_has_no_provider() {
        let err = ConfigError::UnknownProvider("x".into());
        assert_eq!(err.provider(), None);
    }
}
