//! The [`EventKind`] discriminant carried in every notification's `type`
//! field.
//!
//! The server's set of kinds is open: new releases add kinds without notice.
//! The ones this crate knows about get a named variant, everything else is
//! preserved verbatim in [`EventKind::Other`] so it can still be routed.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Notification category, as sent in the frame's `type` field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Playback state change (play, pause, stop) for a client.
    Playing,
    /// Playback progress.
    Progress,
    /// Remote-access reachability changed.
    Reachability,
    /// A transcode job ended.
    TranscodeEnd,
    /// A transcode session started.
    TranscodeSessionStart,
    /// A transcode session ended.
    TranscodeSessionEnd,
    /// A transcode session changed parameters.
    TranscodeSessionUpdate,
    /// A server preference changed.
    Preference,
    /// Server update state changed.
    UpdateStateChange,
    /// Background activity progress (scans, refreshes).
    Activity,
    /// Background processing queue event.
    BackgroundProcessingQueue,
    /// Server status message.
    Status,
    /// Library timeline (item added, updated, deleted).
    Timeline,
    /// Account change.
    Account,
    /// Any kind not listed above.
    Other(String),
}

/// Every named kind, in definition order.
pub const KNOWN_EVENT_KINDS: [EventKind; 14] = [
    EventKind::Playing,
    EventKind::Progress,
    EventKind::Reachability,
    EventKind::TranscodeEnd,
    EventKind::TranscodeSessionStart,
    EventKind::TranscodeSessionEnd,
    EventKind::TranscodeSessionUpdate,
    EventKind::Preference,
    EventKind::UpdateStateChange,
    EventKind::Activity,
    EventKind::BackgroundProcessingQueue,
    EventKind::Status,
    EventKind::Timeline,
    EventKind::Account,
];

impl EventKind {
    /// Wire string for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Playing => "playing",
            Self::Progress => "progress",
            Self::Reachability => "reachability",
            Self::TranscodeEnd => "transcode.end",
            Self::TranscodeSessionStart => "transcodeSession.start",
            Self::TranscodeSessionEnd => "transcodeSession.end",
            Self::TranscodeSessionUpdate => "transcodeSession.update",
            Self::Preference => "preference",
            Self::UpdateStateChange => "update.statechange",
            Self::Activity => "activity",
            Self::BackgroundProcessingQueue => "backgroundProcessingQueue",
            Self::Status => "status",
            Self::Timeline => "timeline",
            Self::Account => "account",
            Self::Other(kind) => kind,
        }
    }

    /// Whether this is one of the named kinds.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Whether this is a transcode kind (`transcode.*` / `transcodeSession.*`).
    #[must_use]
    pub fn is_transcode(&self) -> bool {
        matches!(
            self,
            Self::TranscodeEnd
                | Self::TranscodeSessionStart
                | Self::TranscodeSessionEnd
                | Self::TranscodeSessionUpdate
        )
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        KNOWN_EVENT_KINDS
            .iter()
            .find(|k| k.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Other(s.to_owned()))
    }
}

impl From<String> for EventKind {
    fn from(s: String) -> Self {
        match Self::from(s.as_str()) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
