//! # shellbay-models
//!
//! Code generators for shellbay.
//!
//! The [`CodeGenerator`] trait is the seam between the chat session and a
//! remote model. It has two operations: a streaming one that yields raw text
//! chunks, and an atomic one that returns extracted code.
//!
//! ## Generators
//!
//! - [`GeminiGenerator`](google::GeminiGenerator): Google AI Studio over SSE
//! - [`MockGenerator`]: scripted responses for tests and demos
//!
//! ## Example
//!
//! ```rust,ignore
//! use shellbay_models::{google::GeminiGenerator, CodeGenerator, collect_text};
//!
//! let generator = GeminiGenerator::new(api_key)?;
//! let stream = generator.stream_generate("A landing page for a bakery", &[]).await?;
//! let code = collect_text(stream).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod extract;
pub mod generator;
pub mod google;
pub mod mock;
pub mod prompt;

pub use error::{ModelError, ModelResult, DEFAULT_FAILURE_MESSAGE};
pub use extract::{extract_code, strip_code_fence};
pub use generator::{collect_text, CodeGenerator, TextStream};
pub use google::GeminiGenerator;
pub use mock::{MockFailure, MockGenerator, MockScript, RecordedRequest};
pub use prompt::{compose_turns, SYSTEM_INSTRUCTION};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        collect_text, extract_code, CodeGenerator, GeminiGenerator, MockGenerator, ModelError,
        ModelResult, TextStream,
    };
}
