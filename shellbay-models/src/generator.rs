//! The code generator trait.
//!
//! A generator takes a prompt plus prior conversation turns and produces
//! source code, either as a stream of text chunks or as one finished string.

use crate::error::ModelError;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use shellbay_core::ProviderTurn;
use std::pin::Pin;
use std::sync::Arc;

/// Stream of generated text chunks.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;

/// A remote (or scripted) code generator.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Generator name, for logs.
    fn name(&self) -> &str;

    /// Open a streaming generation.
    ///
    /// Resolves once the provider has accepted the request; chunks then
    /// arrive through the returned stream.
    async fn stream_generate(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<TextStream, ModelError>;

    /// Generate in one request and return the extracted code.
    async fn generate_code(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<String, ModelError>;
}

#[async_trait]
impl<T: CodeGenerator + ?Sized> CodeGenerator for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn stream_generate(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<TextStream, ModelError> {
        (**self).stream_generate(prompt, history).await
    }

    async fn generate_code(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<String, ModelError> {
        (**self).generate_code(prompt, history).await
    }
}

/// Drain a text stream into one string.
///
/// # Errors
///
/// Returns the first error the stream yields.
pub async fn collect_text(mut stream: TextStream) -> Result<String, ModelError> {
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk?);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn test_collect_text() {
        let chunks: TextStream = Box::pin(stream::iter(vec![
            Ok("export ".to_string()),
            Ok("default App;".to_string()),
        ]));
        assert_eq!(collect_text(chunks).await.unwrap(), "export default App;");
    }

    #[tokio::test]
    async fn test_collect_text_stops_at_error() {
        let chunks: TextStream = Box::pin(stream::iter(vec![
            Ok("partial".to_string()),
            Err(ModelError::transport("reset")),
            Ok("never".to_string()),
        ]));
        assert!(matches!(
            collect_text(chunks).await,
            Err(ModelError::Transport(_))
        ));
    }
}
