//! # plexwatch-events
//!
//! Decoding of the notification frames a Plex Media Server pushes over its
//! `/:/websockets/notifications` endpoint.
//!
//! - **Envelope**: [`Notification`] carries the `type` discriminant and the
//!   raw payload sections of one frame
//! - **Event kinds**: [`EventKind`] names the kinds the server is known to emit
//!   and keeps everything else as [`EventKind::Other`]
//! - **Payloads**: typed records for each section, decoded lazily on request
//! - **Timestamps**: [`Timestamp`] for epoch-seconds fields

#![deny(unsafe_code)]

mod de;
pub mod errors;
pub mod event_kind;
pub mod notification;
pub mod payloads;
pub mod timestamp;

pub use errors::{EventsError, Result};
pub use event_kind::{EventKind, KNOWN_EVENT_KINDS};
pub use notification::{Notification, decode_notification};
pub use payloads::*;
pub use timestamp::Timestamp;
