//! Typed records for the payload sections of a notification.
//!
//! Each record type names the section it is decoded from via
//! [`NotificationSection::NAME`], so [`crate::Notification::section`] can find
//! it without the caller repeating wire strings.

use serde::de::DeserializeOwned;

pub mod library;
pub mod playback;
pub mod server;

pub use library::{
    Activity, ActivityNotification, BackgroundProcessingQueueEventNotification, TimelineEntry,
};
pub use playback::{PlaySessionStateNotification, TranscodeSession};
pub use server::{ReachabilityNotification, Setting, StatusNotification};

/// A record type that lives in a named array section of a notification.
pub trait NotificationSection: DeserializeOwned {
    /// Section key on the wire (e.g. `"TimelineEntry"`).
    const NAME: &'static str;
}

/// Section names of every record type in this module.
pub const SECTION_NAMES: [&str; 8] = [
    TimelineEntry::NAME,
    ActivityNotification::NAME,
    StatusNotification::NAME,
    PlaySessionStateNotification::NAME,
    ReachabilityNotification::NAME,
    BackgroundProcessingQueueEventNotification::NAME,
    TranscodeSession::NAME,
    Setting::NAME,
];
