//! Gemini `generateContent` wire types.

use crate::error::DEFAULT_FAILURE_MESSAGE;
use crate::prompt::{MAX_OUTPUT_TOKENS, TEMPERATURE, TOP_K, TOP_P};
use serde::{Deserialize, Serialize};
use shellbay_core::{ProviderRole, ProviderTurn};

// ============================================================================
// Request Types
// ============================================================================

/// Generate content request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns.
    pub contents: Vec<Content>,
    /// Sampling parameters.
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Create a request from provider turns.
    pub fn from_turns(turns: &[ProviderTurn]) -> Self {
        Self {
            contents: turns.iter().map(Content::from).collect(),
            generation_config: GenerationConfig::default(),
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Turn role. Absent on some response chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ProviderRole>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a single-text-part turn.
    pub fn text(role: ProviderRole, text: impl Into<String>) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }
}

impl From<&ProviderTurn> for Content {
    fn from(turn: &ProviderTurn) -> Self {
        Content::text(turn.role, turn.text.clone())
    }
}

/// Content part. Only text parts are produced or consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Text payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

/// Sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature.
    pub temperature: f64,
    /// Top-k.
    pub top_k: u32,
    /// Top-p.
    pub top_p: f64,
    /// Max output tokens.
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE,
            top_k: TOP_K,
            top_p: TOP_P,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Generate content response, or one streamed chunk of it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Usage metadata.
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    /// Prompt feedback (for blocked prompts).
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if non-empty.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }

    /// Finish reason of the first candidate.
    #[must_use]
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

/// Response candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Content.
    #[serde(default)]
    pub content: Option<Content>,
    /// Finish reason.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Prompt token count.
    #[serde(default)]
    pub prompt_token_count: u64,
    /// Candidates token count.
    #[serde(default)]
    pub candidates_token_count: u64,
    /// Total token count.
    #[serde(default)]
    pub total_token_count: u64,
}

/// Prompt feedback (for blocked prompts).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Block reason.
    #[serde(default)]
    pub block_reason: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleError {
    /// Error details.
    #[serde(default)]
    pub error: Option<GoogleErrorBody>,
}

/// Google error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleErrorBody {
    /// Error code.
    #[serde(default)]
    pub code: Option<u32>,
    /// Error message.
    #[serde(default)]
    pub message: Option<String>,
    /// Error status.
    #[serde(default)]
    pub status: Option<String>,
}

/// Human-readable message for an error body, with the generic fallback.
#[must_use]
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<GoogleError>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = GenerateContentRequest::from_turns(&[
            ProviderTurn::user("system"),
            ProviderTurn::model("ack"),
            ProviderTurn::user("prompt"),
        ]);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "system"}]},
                    {"role": "model", "parts": [{"text": "ack"}]},
                    {"role": "user", "parts": [{"text": "prompt"}]}
                ],
                "generationConfig": {
                    "temperature": 0.7,
                    "topK": 40,
                    "topP": 0.95,
                    "maxOutputTokens": 8192
                }
            })
        );
    }

    #[test]
    fn test_first_text() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hello"}, {"text": "ignored"}]}}]
        }))
        .unwrap();
        assert_eq!(resp.first_text(), Some("Hello"));
    }

    #[test]
    fn test_first_text_missing_or_empty() {
        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert_eq!(empty.first_text(), None);

        let blank: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}, "finishReason": "STOP"}]
        }))
        .unwrap();
        assert_eq!(blank.first_text(), None);
        assert_eq!(blank.finish_reason(), Some("STOP"));

        let usage_only: GenerateContentResponse =
            serde_json::from_value(json!({"usageMetadata": {"totalTokenCount": 12}})).unwrap();
        assert_eq!(usage_only.first_text(), None);
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            error_message(body),
            "API key not valid. Please pass a valid API key."
        );
        assert_eq!(error_message("<html>502</html>"), DEFAULT_FAILURE_MESSAGE);
        assert_eq!(error_message(r#"{"error":{}}"#), DEFAULT_FAILURE_MESSAGE);
    }
}
