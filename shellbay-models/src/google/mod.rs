//! Google AI Studio (Gemini) generator.
//!
//! - [`GeminiGenerator`]: streaming and one-shot code generation
//!
//! ## Example
//!
//! ```rust,ignore
//! use shellbay_models::google::GeminiGenerator;
//! use shellbay_models::CodeGenerator;
//!
//! let generator = GeminiGenerator::new(std::env::var("GEMINI_API_KEY")?)?
//!     .with_timeout(std::time::Duration::from_secs(120));
//!
//! let mut chunks = generator.stream_generate("A pomodoro timer", &[]).await?;
//! ```

pub mod model;
pub mod stream;
pub mod types;

pub use model::{GeminiGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use stream::GeminiTextStream;
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    GoogleError, GoogleErrorBody, Part, PromptFeedback, UsageMetadata,
};

/// Create a Gemini generator for the default model.
///
/// # Errors
///
/// Returns [`ModelError::MissingCredential`](crate::ModelError::MissingCredential)
/// for an empty key.
pub fn gemini(api_key: impl Into<String>) -> Result<GeminiGenerator, crate::ModelError> {
    GeminiGenerator::new(api_key)
}

/// Common Gemini model names.
pub mod models {
    /// Gemini 1.5 Flash (fast, the default)
    pub const GEMINI_1_5_FLASH: &str = "gemini-1.5-flash";
    /// Gemini 1.5 Pro (long context)
    pub const GEMINI_1_5_PRO: &str = "gemini-1.5-pro";
    /// Gemini 2.0 Flash
    pub const GEMINI_2_FLASH: &str = "gemini-2.0-flash";
}
