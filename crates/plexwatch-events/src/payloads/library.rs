//! Library-side sections: timeline changes and background activity.

use serde::{Deserialize, Serialize};

use super::NotificationSection;
use crate::de::opt_i64_lenient;
use crate::timestamp::Timestamp;

/// One entry of a `timeline` notification: an item was added, changed or
/// removed in a library section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    /// Agent identifier (e.g. `com.plexapp.plugins.library`).
    pub identifier: String,
    /// Library item id. Sent as a numeric string.
    #[serde(rename = "itemID", deserialize_with = "opt_i64_lenient")]
    pub item_id: Option<i64>,
    /// Metadata processing state (e.g. `"created"`, `"deleted"`).
    #[serde(rename = "metadataState", skip_serializing_if = "Option::is_none")]
    pub metadata_state: Option<String>,
    /// Library section id. Sent as a numeric string.
    #[serde(rename = "sectionID", deserialize_with = "opt_i64_lenient")]
    pub section_id: Option<i64>,
    /// Numeric timeline state.
    pub state: i64,
    /// Item title.
    pub title: String,
    /// Numeric metadata type.
    #[serde(rename = "type")]
    pub item_type: i64,
    /// When the item was last updated.
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl NotificationSection for TimelineEntry {
    const NAME: &'static str = "TimelineEntry";
}

/// Progress details of a background activity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    /// Whether the activity can be cancelled by a client.
    pub cancellable: bool,
    /// Percent complete.
    pub progress: i64,
    /// Secondary description line.
    pub subtitle: String,
    /// Primary description line.
    pub title: String,
    /// Activity type (e.g. `"library.update.section"`).
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Owning user id.
    #[serde(rename = "userID")]
    pub user_id: i64,
    /// Activity id.
    pub uuid: String,
}

/// Entry of an `activity` notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityNotification {
    /// Activity details.
    #[serde(rename = "Activity")]
    pub activity: Activity,
    /// Lifecycle event (`"started"`, `"updated"`, `"ended"`).
    pub event: String,
    /// Activity id.
    pub uuid: String,
}

impl NotificationSection for ActivityNotification {
    const NAME: &'static str = "ActivityNotification";
}

/// Entry of a `backgroundProcessingQueue` notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundProcessingQueueEventNotification {
    /// Queue event name.
    pub event: String,
    /// Queue id.
    #[serde(rename = "queueID")]
    pub queue_id: i64,
}

impl NotificationSection for BackgroundProcessingQueueEventNotification {
    const NAME: &'static str = "BackgroundProcessingQueueEventNotification";
}
