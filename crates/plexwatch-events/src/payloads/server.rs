//! Server-side sections: status messages, reachability, preferences.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::NotificationSection;

/// Entry of a `status` notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatusNotification {
    /// Human-readable description.
    pub description: String,
    /// Machine name (e.g. `"LIBRARY_UPDATE"`).
    pub notification_name: String,
    /// Short title.
    pub title: String,
}

impl NotificationSection for StatusNotification {
    const NAME: &'static str = "StatusNotification";
}

/// Entry of a `reachability` notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachabilityNotification {
    /// Whether the server is reachable from outside its network.
    pub reachability: bool,
}

impl NotificationSection for ReachabilityNotification {
    const NAME: &'static str = "ReachabilityNotification";
}

/// Entry of a `preference` notification: one server setting.
///
/// `value` and `default` vary in type per setting (bool, number, string) and
/// are kept as raw JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Setting {
    /// Whether this is an advanced setting.
    pub advanced: bool,
    /// Default value.
    pub default: Value,
    /// Settings group.
    pub group: String,
    /// Whether the setting is hidden in UIs.
    pub hidden: bool,
    /// Setting id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Help text.
    pub summary: String,
    /// Value type (`"bool"`, `"int"`, `"text"`...).
    #[serde(rename = "type")]
    pub setting_type: String,
    /// Current value.
    pub value: Value,
}

impl NotificationSection for Setting {
    const NAME: &'static str = "Setting";
}
