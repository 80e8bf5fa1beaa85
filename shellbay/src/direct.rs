//! One-shot generation without a project or conversation.
//!
//! Use these for scripts and quick checks where there is no chat history to
//! keep and no artifact to update.
//!
//! # Examples
//!
//! ## Atomic request
//!
//! ```rust,ignore
//! use shellbay::direct::generate_code;
//! use shellbay::Settings;
//!
//! let settings = Settings::from_env()?;
//! let code = generate_code(settings, "A pomodoro timer").await?;
//! println!("{code}");
//! ```
//!
//! ## Streaming request
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use shellbay::direct::stream_generate;
//!
//! let mut chunks = stream_generate(settings, "A weather card").await?;
//! while let Some(chunk) = chunks.next().await {
//!     print!("{}", chunk?);
//! }
//! ```

use std::sync::Arc;

use shellbay_core::{ConfigError, CredentialSource, Settings};
use shellbay_models::{CodeGenerator, ModelError, TextStream};
use shellbay_session::{DefaultGeneratorFactory, GeneratorFactory};
use thiserror::Error;

/// Error type for direct requests.
#[derive(Debug, Error)]
pub enum DirectError {
    /// The prompt was blank.
    #[error("Prompt is empty")]
    EmptyInput,

    /// Provider configuration is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generator-level error (API, network, etc.).
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Runtime error (e.g., sync functions called in async context).
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Where the generator for a direct request comes from.
#[derive(Clone)]
pub enum GeneratorSpec {
    /// Build the generator for the active provider of these credentials.
    Credentials(Arc<dyn CredentialSource>),
    /// Use this generator as is.
    Instance(Arc<dyn CodeGenerator>),
}

impl std::fmt::Debug for GeneratorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorSpec::Credentials(source) => f
                .debug_tuple("Credentials")
                .field(&source.active_provider())
                .finish(),
            GeneratorSpec::Instance(generator) => {
                f.debug_tuple("Instance").field(&generator.name()).finish()
            }
        }
    }
}

impl From<Settings> for GeneratorSpec {
    fn from(settings: Settings) -> Self {
        GeneratorSpec::Credentials(Arc::new(settings))
    }
}

impl From<Arc<dyn CredentialSource>> for GeneratorSpec {
    fn from(source: Arc<dyn CredentialSource>) -> Self {
        GeneratorSpec::Credentials(source)
    }
}

impl From<Arc<dyn CodeGenerator>> for GeneratorSpec {
    fn from(generator: Arc<dyn CodeGenerator>) -> Self {
        GeneratorSpec::Instance(generator)
    }
}

impl GeneratorSpec {
    /// Wrap a concrete generator.
    pub fn from_generator<G: CodeGenerator + 'static>(generator: G) -> Self {
        GeneratorSpec::Instance(Arc::new(generator))
    }

    fn resolve(self) -> Result<Arc<dyn CodeGenerator>, DirectError> {
        match self {
            GeneratorSpec::Credentials(source) => {
                let (provider, credential) = source.require_active()?;
                DefaultGeneratorFactory::new()
                    .create(provider, &credential)
                    .map_err(|e| match e {
                        ModelError::UnsupportedProvider(p) => ConfigError::UnsupportedProvider(p).into(),
                        ModelError::MissingCredential(p) => ConfigError::MissingCredential(p).into(),
                        other => DirectError::Model(other),
                    })
            }
            GeneratorSpec::Instance(generator) => Ok(generator),
        }
    }
}

fn check_prompt(prompt: &str) -> Result<(), DirectError> {
    if prompt.trim().is_empty() {
        return Err(DirectError::EmptyInput);
    }
    Ok(())
}

/// Generate code in one request and return it with any code fence removed.
///
/// # Errors
///
/// Returns [`DirectError`] for a blank prompt, incomplete configuration, or
/// a failed request.
pub async fn generate_code(
    generator: impl Into<GeneratorSpec>,
    prompt: &str,
) -> Result<String, DirectError> {
    check_prompt(prompt)?;
    let generator = generator.into().resolve()?;
    Ok(generator.generate_code(prompt, &[]).await?)
}

/// Open a stream of raw text chunks for a prompt.
///
/// # Errors
///
/// Returns [`DirectError`] for a blank prompt, incomplete configuration, or
/// a failure while opening the stream. Failures after that arrive as stream
/// items.
pub async fn stream_generate(
    generator: impl Into<GeneratorSpec>,
    prompt: &str,
) -> Result<TextStream, DirectError> {
    check_prompt(prompt)?;
    let generator = generator.into().resolve()?;
    Ok(generator.stream_generate(prompt, &[]).await?)
}

/// Blocking version of [`generate_code`].
///
/// Creates a current-thread runtime for the call.
///
/// # Errors
///
/// Returns [`DirectError::Runtime`] when called from inside a Tokio runtime,
/// otherwise as [`generate_code`].
pub fn generate_code_sync(
    generator: impl Into<GeneratorSpec>,
    prompt: &str,
) -> Result<String, DirectError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(DirectError::Runtime(
            "generate_code_sync cannot be called from async context. Use generate_code instead."
                .to_string(),
        ));
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DirectError::Runtime(format!("Failed to create runtime: {e}")))?;

    let generator = generator.into();
    rt.block_on(generate_code(generator, prompt))
}
