//! Building a generator for the configured provider.

use shellbay_core::AiProvider;
use shellbay_models::{CodeGenerator, GeminiGenerator, ModelError};
use std::sync::Arc;
use std::time::Duration;

/// Creates the generator a turn will use.
///
/// Called once per turn with the provider and credential that were active
/// when the prompt was submitted, so settings changes apply to the next turn.
pub trait GeneratorFactory: Send + Sync {
    /// Build a generator.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnsupportedProvider`] for providers without a
    /// generator, or any error from constructing one.
    fn create(
        &self,
        provider: AiProvider,
        credential: &str,
    ) -> Result<Arc<dyn CodeGenerator>, ModelError>;
}

impl<F> GeneratorFactory for F
where
    F: Fn(AiProvider, &str) -> Result<Arc<dyn CodeGenerator>, ModelError> + Send + Sync,
{
    fn create(
        &self,
        provider: AiProvider,
        credential: &str,
    ) -> Result<Arc<dyn CodeGenerator>, ModelError> {
        self(provider, credential)
    }
}

/// Factory for the built-in generators.
///
/// Gemini is the only provider with a generator; the others are rejected
/// with [`ModelError::UnsupportedProvider`].
#[derive(Debug, Clone, Default)]
pub struct DefaultGeneratorFactory {
    base_url: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
}

impl DefaultGeneratorFactory {
    /// Create a factory using the provider defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the Gemini base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the Gemini model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set a request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl GeneratorFactory for DefaultGeneratorFactory {
    fn create(
        &self,
        provider: AiProvider,
        credential: &str,
    ) -> Result<Arc<dyn CodeGenerator>, ModelError> {
        match provider {
            AiProvider::Gemini => {
                let mut generator = GeminiGenerator::new(credential)?;
                if let Some(url) = &self.base_url {
                    generator = generator.with_base_url(url.clone());
                }
                if let Some(model) = &self.model {
                    generator = generator.with_model(model.clone());
                }
                if let Some(timeout) = self.timeout {
                    generator = generator.with_timeout(timeout);
                }
                Ok(Arc::new(generator))
            }
            other => Err(ModelError::UnsupportedProvider(other)),
        }
    }
}

/// Factory that hands out the same generator for every provider.
///
/// Useful with [`MockGenerator`](shellbay_models::MockGenerator) in tests
/// and demos.
#[derive(Clone)]
pub struct FixedGeneratorFactory {
    generator: Arc<dyn CodeGenerator>,
}

impl FixedGeneratorFactory {
    /// Wrap a generator.
    pub fn new(generator: impl CodeGenerator + 'static) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }
}

impl std::fmt::Debug for FixedGeneratorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedGeneratorFactory")
            .field("generator", &self.generator.name())
            .finish()
    }
}

impl GeneratorFactory for FixedGeneratorFactory {
    fn create(
        &self,
        _provider: AiProvider,
        _credential: &str,
    ) -> Result<Arc<dyn CodeGenerator>, ModelError> {
        Ok(Arc::clone(&self.generator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use shellbay_models::MockGenerator;

    #[test]
    fn test_default_builds_gemini() {
        let factory = DefaultGeneratorFactory::new().with_model("gemini-1.5-pro");
        let generator = factory.create(AiProvider::Gemini, "key").unwrap();
        assert_eq!(generator.name(), "gemini-1.5-pro");
    }

    #[rstest]
    #[case(AiProvider::OpenAi)]
    #[case(AiProvider::Anthropic)]
    fn test_default_rejects_other_providers(#[case] provider: AiProvider) {
        let factory = DefaultGeneratorFactory::new();
        assert!(matches!(
            factory.create(provider, "key"),
            Err(ModelError::UnsupportedProvider(p)) if p == provider
        ));
    }

    #[test]
    fn test_default_rejects_empty_key() {
        let factory = DefaultGeneratorFactory::new();
        assert!(matches!(
            factory.create(AiProvider::Gemini, ""),
            Err(ModelError::MissingCredential(AiProvider::Gemini))
        ));
    }

    #[test]
    fn test_fixed_and_closure_factories() {
        let fixed = FixedGeneratorFactory::new(MockGenerator::new());
        assert_eq!(fixed.create(AiProvider::OpenAi, "k").unwrap().name(), "mock");

        let closure = |_: AiProvider, _: &str| -> Result<Arc<dyn CodeGenerator>, ModelError> {
            Ok(Arc::new(MockGenerator::new()))
        };
        let factory: &dyn GeneratorFactory = &closure;
        assert_eq!(factory.create(AiProvider::Gemini, "k").unwrap().name(), "mock");
    }
}
