//! ID generation utilities.
//!
//! Projects and chat messages carry prefixed UUID v4 identifiers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a unique message ID.
///
/// # Example
///
/// ```rust
/// use shellbay_core::identifier::generate_message_id;
///
/// let id = generate_message_id();
/// assert!(id.starts_with("msg_"));
/// assert_eq!(id.len(), 36); // "msg_" + 32 hex chars
/// ```
#[must_use]
pub fn generate_message_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

/// Generate a unique project ID.
///
/// Returns a UUID v4 string prefixed with "proj_".
#[must_use]
pub fn generate_project_id() -> String {
    format!("proj_{}", Uuid::new_v4().simple())
}

/// Get the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as ISO 8601.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse a timestamp from an ISO 8601 string.
///
/// # Errors
///
/// Returns an error if the string is not a valid ISO 8601 timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    s.parse()
}
