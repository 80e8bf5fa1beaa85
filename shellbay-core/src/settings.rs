//! Provider selection and credentials.
//!
//! [`Settings`] is plain data; [`SharedSettings`] is the runtime handle the
//! settings UI writes to and generation turns read from.

use crate::errors::ConfigError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Google Gemini (AI Studio).
    #[default]
    Gemini,
    /// OpenAI.
    OpenAi,
    /// Anthropic.
    Anthropic,
}

impl AiProvider {
    /// Provider name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini",
            AiProvider::OpenAi => "openai",
            AiProvider::Anthropic => "anthropic",
        }
    }

    /// Human-readable credential name.
    #[must_use]
    pub fn credential_label(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "Google AI Studio API key",
            AiProvider::OpenAi => "OpenAI API key",
            AiProvider::Anthropic => "Anthropic API key",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(AiProvider::Gemini),
            "openai" => Ok(AiProvider::OpenAi),
            "anthropic" => Ok(AiProvider::Anthropic),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Anything that can answer "which provider, and what is its key".
pub trait CredentialSource: Send + Sync {
    /// The provider new turns should use.
    fn active_provider(&self) -> AiProvider;

    /// The credential for `provider`, if configured.
    fn credential(&self, provider: AiProvider) -> Option<String>;

    /// Resolve the active provider and its credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when the active provider has
    /// no credential.
    fn require_active(&self) -> Result<(AiProvider, String), ConfigError> {
        let provider = self.active_provider();
        self.credential(provider)
            .map(|key| (provider, key))
            .ok_or(ConfigError::MissingCredential(provider))
    }
}

/// Provider choice and per-provider API keys.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The provider used for generation.
    pub active_provider: AiProvider,
    /// Gemini API key.
    #[serde(default, skip_serializing)]
    pub gemini_api_key: Option<String>,
    /// OpenAI API key.
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<String>,
    /// Anthropic API key.
    #[serde(default, skip_serializing)]
    pub anthropic_api_key: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("active_provider", &self.active_provider)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

impl Settings {
    /// Create empty settings (Gemini, no keys).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from the process environment.
    ///
    /// Reads `SHELLBAY_PROVIDER`, `GEMINI_API_KEY` (falling back to
    /// `GOOGLE_API_KEY`), `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProvider`] for an unrecognised
    /// `SHELLBAY_PROVIDER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProvider`] for an unrecognised provider.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let active_provider = match lookup("SHELLBAY_PROVIDER") {
            Some(name) if !name.trim().is_empty() => name.parse()?,
            _ => AiProvider::default(),
        };

        Ok(Self {
            active_provider,
            gemini_api_key: lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")),
            openai_api_key: lookup("OPENAI_API_KEY"),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY"),
        })
    }

    /// Select the active provider.
    #[must_use]
    pub fn with_provider(mut self, provider: AiProvider) -> Self {
        self.active_provider = provider;
        self
    }

    /// Set the key for a provider.
    #[must_use]
    pub fn with_api_key(mut self, provider: AiProvider, key: impl Into<String>) -> Self {
        self.set_api_key(provider, key);
        self
    }

    /// Set the key for a provider in place.
    pub fn set_api_key(&mut self, provider: AiProvider, key: impl Into<String>) {
        let key = Some(key.into());
        match provider {
            AiProvider::Gemini => self.gemini_api_key = key,
            AiProvider::OpenAi => self.openai_api_key = key,
            AiProvider::Anthropic => self.anthropic_api_key = key,
        }
    }

    /// Get the key for a provider. Blank keys count as absent.
    #[must_use]
    pub fn api_key(&self, provider: AiProvider) -> Option<&str> {
        let key = match provider {
            AiProvider::Gemini => self.gemini_api_key.as_deref(),
            AiProvider::OpenAi => self.openai_api_key.as_deref(),
            AiProvider::Anthropic => self.anthropic_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }
}

impl CredentialSource for Settings {
    fn active_provider(&self) -> AiProvider {
        self.active_provider
    }

    fn credential(&self, provider: AiProvider) -> Option<String> {
        self.api_key(provider).map(str::to_string)
    }
}

/// Settings shared between the settings UI and running sessions.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<Settings>>,
}

impl SharedSettings {
    /// Wrap settings for sharing.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Copy of the current settings.
    #[must_use]
    pub fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }

    /// Mutate the settings in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.inner.write());
    }

    /// Switch the active provider.
    pub fn set_provider(&self, provider: AiProvider) {
        self.update(|s| s.active_provider = provider);
    }

    /// Set the key for a provider.
    pub fn set_api_key(&self, provider: AiProvider, key: impl Into<String>) {
        let key = key.into();
        self.update(|s| s.set_api_key(provider, key));
    }
}

impl CredentialSource for SharedSettings {
    fn active_provider(&self) -> AiProvider {
        self.inner.read().active_provider
    }

    fn credential(&self, provider: AiProvider) -> Option<String> {
        self.inner.read().credential(provider)
    }
}
