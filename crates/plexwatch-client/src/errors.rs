//! Session error types.

use plexwatch_events::EventsError;
use thiserror::Error;

/// Everything that can end a notification session other than a normal
/// closure.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The server address could not be turned into a notification URL.
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl {
        /// The address as given.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The WebSocket upgrade failed (refused, TLS, HTTP status, bad header).
    #[error("websocket handshake with {url} failed: {reason}")]
    Handshake {
        /// The notification URL that was dialed.
        url: String,
        /// Underlying failure.
        reason: String,
    },

    /// Reading or writing the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server closed the stream with a code other than 1000.
    #[error("connection closed by server with code {code}: {reason}")]
    AbnormalClose {
        /// Close code (1005 when the close frame carried none).
        code: u16,
        /// Close reason, possibly empty.
        reason: String,
    },

    /// The stream ended without a close frame.
    #[error("connection ended without a close frame")]
    StreamEnded,

    /// A frame could not be decoded into a notification.
    #[error("undecodable notification frame: {0}")]
    Decode(#[from] EventsError),

    /// The server did not acknowledge our close frame in time; the connection
    /// was dropped.
    #[error("server did not acknowledge close within {timeout_ms}ms")]
    CloseTimeout {
        /// The bound that elapsed.
        timeout_ms: u64,
    },

    /// The read task ended without reporting an outcome (a handler panicked).
    #[error("read task stopped without reporting an outcome")]
    ReaderStopped,
}

impl NotifyError {
    /// Whether the error happened before any task was started.
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::Handshake { .. })
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl { .. } => "invalid_url",
            Self::Handshake { .. } => "handshake",
            Self::Transport(_) => "transport",
            Self::AbnormalClose { .. } => "abnormal_close",
            Self::StreamEnded => "stream_ended",
            Self::Decode(_) => "decode",
            Self::CloseTimeout { .. } => "close_timeout",
            Self::ReaderStopped => "reader_stopped",
        }
    }
}
