//! Gemini code generator.

use super::stream::GeminiTextStream;
use super::types::{error_message, GenerateContentRequest, GenerateContentResponse};
use crate::error::ModelError;
use crate::extract::extract_code;
use crate::generator::{CodeGenerator, TextStream};
use crate::prompt::compose_turns;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Response};
use shellbay_core::{AiProvider, ProviderTurn};
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini (Google AI Studio) code generator.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    /// Create a generator for the default model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingCredential`] for an empty key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ModelError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ModelError::MissingCredential(AiProvider::Gemini));
        }

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        })
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    /// Set a request timeout. For streams this bounds the whole response.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The model in use.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Endpoint path without the key, safe to log.
    fn endpoint(&self, stream: bool) -> String {
        let action = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        format!("{}/models/{}:{}", self.base_url, self.model_name, action)
    }

    /// Build the API URL.
    fn build_url(&self, stream: bool) -> String {
        let mut url = format!("{}?key={}", self.endpoint(stream), self.api_key);
        if stream {
            url.push_str("&alt=sse");
        }
        url
    }

    /// Build the request body. Sampling parameters are always the fixed
    /// [`GenerationConfig`](super::types::GenerationConfig) defaults.
    fn build_request(&self, prompt: &str, history: &[ProviderTurn]) -> GenerateContentRequest {
        GenerateContentRequest::from_turns(&compose_turns(prompt, history))
    }

    /// Send one request and check its status.
    async fn send(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
        stream: bool,
    ) -> Result<Response, ModelError> {
        let body = self.build_request(prompt, history);

        tracing::debug!(
            endpoint = %self.endpoint(stream),
            history = history.len(),
            prompt_len = prompt.len(),
            "Sending Gemini request"
        );

        let mut request = self
            .client
            .post(self.build_url(stream))
            .header(CONTENT_TYPE, "application/json")
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            // reqwest includes the URL, and with it the key, in its Display.
            ModelError::from(e.without_url())
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            tracing::warn!(
                status = status.as_u16(),
                message = %message,
                "Gemini request failed"
            );
            return Err(ModelError::Request {
                status: status.as_u16(),
                message,
                retry_after,
            });
        }

        Ok(response)
    }
}

/// Parse a `Retry-After` header given in seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl CodeGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn stream_generate(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<TextStream, ModelError> {
        let response = self.send(prompt, history, true).await?;
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(reqwest::Error::without_url));
        Ok(Box::pin(GeminiTextStream::new(bytes)))
    }

    async fn generate_code(
        &self,
        prompt: &str,
        history: &[ProviderTurn],
    ) -> Result<String, ModelError> {
        let response = self.send(prompt, history, false).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ModelError::from(e.without_url()))?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ModelError::invalid_response(e.to_string()))?;

        Ok(extract_code(parsed.first_text().unwrap_or_default()))
    }
}
