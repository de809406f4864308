//! Playback sections: play-session state and transcoder sessions.

use serde::{Deserialize, Serialize};

use super::NotificationSection;

/// Entry of a `playing` notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaySessionStateNotification {
    /// Identifier of the playing client.
    pub client_identifier: String,
    /// Item GUID.
    pub guid: String,
    /// Item key (`/library/metadata/...`).
    pub key: String,
    /// Play-queue item id.
    #[serde(rename = "playQueueItemID")]
    pub play_queue_item_id: i64,
    /// Play-queue id.
    #[serde(rename = "playQueueID")]
    pub play_queue_id: i64,
    /// Rating key of the item.
    pub rating_key: String,
    /// Server session key.
    pub session_key: String,
    /// `"playing"`, `"paused"`, `"stopped"` or `"buffering"`.
    pub state: String,
    /// Item URL, if any.
    pub url: String,
    /// Playback offset in milliseconds.
    pub view_offset: i64,
    /// Transcode session key, when the stream is transcoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcode_session: Option<String>,
}

impl NotificationSection for PlaySessionStateNotification {
    const NAME: &'static str = "PlaySessionStateNotification";
}

impl PlaySessionStateNotification {
    /// Whether the session is actively playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == "playing"
    }
}

/// Entry of a `transcodeSession.*` notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranscodeSession {
    /// Output audio channel count.
    pub audio_channels: i64,
    /// Output audio codec.
    pub audio_codec: String,
    /// `"transcode"`, `"copy"` or `"direct play"`.
    pub audio_decision: String,
    /// Whether the transcode finished.
    pub complete: bool,
    /// Output container.
    pub container: String,
    /// Transcode context (`"streaming"`, `"static"`).
    pub context: String,
    /// Media duration in milliseconds.
    pub duration: i64,
    /// Transcode session key.
    pub key: String,
    /// Percent complete.
    pub progress: f64,
    /// Output protocol (`"hls"`, `"dash"`, `"http"`).
    pub protocol: String,
    /// Estimated seconds remaining.
    pub remaining: i64,
    /// Source audio codec.
    pub source_audio_codec: String,
    /// Source video codec.
    pub source_video_codec: String,
    /// Transcode speed relative to realtime.
    pub speed: f64,
    /// Whether the transcoder is throttled.
    pub throttled: bool,
    /// Whether hardware transcoding was requested.
    pub transcode_hw_requested: bool,
    /// Output video codec.
    pub video_codec: String,
    /// `"transcode"`, `"copy"` or `"direct play"`.
    pub video_decision: String,
}

impl NotificationSection for TranscodeSession {
    const NAME: &'static str = "TranscodeSession";
}
