//! The decoded notification envelope.
//!
//! A frame is one JSON object with a `type` string, an optional `size`, and
//! zero or more named sections, each an array of records. The server wraps
//! the object as `{"NotificationContainer": {...}}`; bare objects are accepted
//! too. One frame may carry several unrelated sections at once.
//!
//! Decoding is two-stage: [`decode_notification`] only extracts the kind and
//! keeps the sections as raw JSON, and [`Notification::section`] decodes a
//! section into typed records when a handler asks for it. A section the
//! handler never reads can never fail the frame.

use serde_json::{Map, Value};

use crate::errors::{EventsError, Result};
use crate::event_kind::EventKind;
use crate::payloads::{
    ActivityNotification, BackgroundProcessingQueueEventNotification, NotificationSection,
    PlaySessionStateNotification, ReachabilityNotification, Setting, StatusNotification,
    TimelineEntry, TranscodeSession,
};

const CONTAINER_KEY: &str = "NotificationContainer";
const TYPE_KEY: &str = "type";
const SIZE_KEY: &str = "size";

/// One decoded inbound notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    kind: EventKind,
    size: Option<i64>,
    sections: Map<String, Value>,
}

/// Decode one inbound frame into a [`Notification`].
pub fn decode_notification(frame: &[u8]) -> Result<Notification> {
    let value: Value = serde_json::from_slice(frame)?;
    Notification::from_value(value)
}

impl Notification {
    /// Build a notification with no sections.
    pub fn new(kind: impl Into<EventKind>) -> Self {
        Self {
            kind: kind.into(),
            size: None,
            sections: Map::new(),
        }
    }

    /// Add (or replace) a raw section.
    #[must_use]
    pub fn with_section(mut self, name: impl Into<String>, value: Value) -> Self {
        let _ = self.sections.insert(name.into(), value);
        self
    }

    /// Decode from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(EventsError::NotAnObject);
        };

        if let Some(container) = object.remove(CONTAINER_KEY) {
            let Value::Object(inner) = container else {
                return Err(EventsError::NotAnObject);
            };
            object = inner;
        }

        let kind = match object.remove(TYPE_KEY) {
            Some(Value::String(kind)) => EventKind::from(kind),
            _ => return Err(EventsError::MissingType),
        };
        let size = object.remove(SIZE_KEY).and_then(|v| v.as_i64());

        Ok(Self {
            kind,
            size,
            sections: object,
        })
    }

    /// The `type` discriminant.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// The `size` field, when present.
    pub fn size(&self) -> Option<i64> {
        self.size
    }

    /// Names of the sections present in this frame.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Whether a section with this name is present.
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// A section as raw JSON.
    pub fn raw_section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    /// Decode the section for `T`.
    ///
    /// A missing or `null` section is an empty list. A lone object is treated
    /// as a one-element list.
    pub fn section<T: NotificationSection>(&self) -> Result<Vec<T>> {
        self.section_named(T::NAME)
    }

    /// Decode an arbitrary named section into records of type `T`.
    pub fn section_named<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let section_err = |source| EventsError::Section {
            name: name.to_owned(),
            source,
        };
        match self.sections.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(array @ Value::Array(_)) => {
                serde_json::from_value(array.clone()).map_err(section_err)
            }
            Some(single) => serde_json::from_value(single.clone())
                .map(|record| vec![record])
                .map_err(section_err),
        }
    }

    /// `TimelineEntry` section.
    pub fn timeline_entries(&self) -> Result<Vec<TimelineEntry>> {
        self.section()
    }

    /// `ActivityNotification` section.
    pub fn activities(&self) -> Result<Vec<ActivityNotification>> {
        self.section()
    }

    /// `StatusNotification` section.
    pub fn statuses(&self) -> Result<Vec<StatusNotification>> {
        self.section()
    }

    /// `PlaySessionStateNotification` section.
    pub fn play_sessions(&self) -> Result<Vec<PlaySessionStateNotification>> {
        self.section()
    }

    /// `ReachabilityNotification` section.
    pub fn reachability(&self) -> Result<Vec<ReachabilityNotification>> {
        self.section()
    }

    /// `BackgroundProcessingQueueEventNotification` section.
    pub fn queue_events(&self) -> Result<Vec<BackgroundProcessingQueueEventNotification>> {
        self.section()
    }

    /// `TranscodeSession` section.
    pub fn transcode_sessions(&self) -> Result<Vec<TranscodeSession>> {
        self.section()
    }

    /// `Setting` section.
    pub fn settings(&self) -> Result<Vec<Setting>> {
        self.section()
    }
}
