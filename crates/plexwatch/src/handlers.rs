//! Handlers that log each notification.

use plexwatch_client::NotificationEvents;
use plexwatch_events::{KNOWN_EVENT_KINDS, Notification};
use tracing::{info, warn};

/// Dispatch table that logs every known kind, with detail for the common ones.
pub fn logging_events() -> NotificationEvents {
    let mut events = NotificationEvents::empty();
    for kind in KNOWN_EVENT_KINDS {
        let _ = events.register(kind, log_summary);
    }
    let _ = events
        .on_playing(log_playing)
        .on_timeline(log_timeline)
        .on_activity(log_activity)
        .on_reachability(log_reachability)
        .on_status(log_status)
        .on_transcode_update(log_transcode);
    events
}

fn log_summary(n: &Notification) {
    let sections: Vec<&str> = n.section_names().collect();
    info!(kind = %n.kind(), size = ?n.size(), ?sections, "notification");
}

fn log_playing(n: &Notification) {
    match n.play_sessions() {
        Ok(sessions) => {
            for s in sessions {
                info!(
                    session_key = %s.session_key,
                    rating_key = %s.rating_key,
                    state = %s.state,
                    view_offset = s.view_offset,
                    transcoding = s.transcode_session.is_some(),
                    "playback"
                );
            }
        }
        Err(e) => warn!(kind = %n.kind(), error = %e, "bad play session section"),
    }
}

fn log_timeline(n: &Notification) {
    match n.timeline_entries() {
        Ok(entries) => {
            for e in entries {
                info!(
                    title = %e.title,
                    item_id = ?e.item_id,
                    section_id = ?e.section_id,
                    state = e.state,
                    updated_at = ?e.updated_at.map(|t| t.unix()),
                    "timeline"
                );
            }
        }
        Err(e) => warn!(kind = %n.kind(), error = %e, "bad timeline section"),
    }
}

fn log_activity(n: &Notification) {
    match n.activities() {
        Ok(activities) => {
            for a in activities {
                info!(
                    event = %a.event,
                    uuid = %a.uuid,
                    activity = %a.activity.activity_type,
                    title = %a.activity.title,
                    progress = a.activity.progress,
                    "activity"
                );
            }
        }
        Err(e) => warn!(kind = %n.kind(), error = %e, "bad activity section"),
    }
}

fn log_reachability(n: &Notification) {
    match n.reachability() {
        Ok(entries) => {
            for r in entries {
                info!(reachable = r.reachability, "reachability");
            }
        }
        Err(e) => warn!(kind = %n.kind(), error = %e, "bad reachability section"),
    }
}

fn log_status(n: &Notification) {
    match n.statuses() {
        Ok(statuses) => {
            for s in statuses {
                info!(name = %s.notification_name, title = %s.title, "status");
            }
        }
        Err(e) => warn!(kind = %n.kind(), error = %e, "bad status section"),
    }
}

fn log_transcode(n: &Notification) {
    match n.transcode_sessions() {
        Ok(sessions) => {
            for t in sessions {
                info!(
                    key = %t.key,
                    progress = t.progress,
                    speed = t.speed,
                    throttled = t.throttled,
                    video = %t.video_decision,
                    audio = %t.audio_decision,
                    "transcode"
                );
            }
        }
        Err(e) => warn!(kind = %n.kind(), error = %e, "bad transcode section"),
    }
}
