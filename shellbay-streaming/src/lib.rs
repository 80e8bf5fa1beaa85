//! # shellbay-streaming
//!
//! Transport decoding for shellbay generation streams.
//!
//! Provider responses arrive as Server-Sent Events over HTTP, in chunks that
//! do not line up with line boundaries. This crate turns such a byte stream
//! into a lazy sequence of `data:` payloads, optionally parsed as JSON.
//!
//! ## Core Concepts
//!
//! - **[`SseLineDecoder`]**: synchronous byte-to-payload decoder
//! - **[`SseDataStream`]**: `Stream` of payload strings
//! - **[`SseJsonStream`]**: `Stream` of JSON values; malformed lines are skipped
//!
//! ## Example
//!
//! ```ignore
//! use shellbay_streaming::SseStreamExt;
//! use futures::StreamExt;
//!
//! let mut events = response.bytes_stream().sse_json::<serde_json::Value>();
//! while let Some(event) = events.next().await {
//!     println!("{:?}", event?);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod sse;

pub use error::{StreamError, StreamResult};
pub use sse::{
    data_payload, SseDataStream, SseJsonStream, SseLineDecoder, SseStreamExt, MAX_LINE_SIZE,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{SseDataStream, SseJsonStream, SseStreamExt, StreamError, StreamResult};
}
