//! Decoding error types.

use thiserror::Error;

/// Errors produced while decoding a notification frame.
#[derive(Debug, Error)]
pub enum EventsError {
    /// The frame was not valid JSON.
    #[error("invalid notification JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The frame (or its `NotificationContainer`) was not a JSON object.
    #[error("notification frame is not a JSON object")]
    NotAnObject,
    /// The frame had no string `type` field.
    #[error("notification frame has no `type` field")]
    MissingType,
    /// A payload section did not match its record shape.
    #[error("malformed `{name}` section: {source}")]
    Section {
        /// Section name as it appears on the wire.
        name: String,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, EventsError>;
