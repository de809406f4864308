//! # plexwatch-client
//!
//! Persistent subscription to a Plex Media Server's notification socket.
//!
//! A session is two tasks sharing one connection:
//!
//! - **read task**: decodes each inbound frame and runs the handler registered
//!   for its kind, in arrival order
//! - **heartbeat task**: sends a liveness frame every interval; on cancellation
//!   sends a close frame and waits a bounded time for the server to answer
//!
//! However the session ends, exactly one of the caller's `on_error` / `on_done`
//! callbacks runs.
//!
//! ```ignore
//! let mut events = NotificationEvents::new();
//! events.on_playing(|n| println!("{:?}", n.play_sessions()));
//! let cancel = CancellationToken::new();
//! let sub = NotificationClient::new("http://127.0.0.1:32400", token)
//!     .subscribe(events, cancel.clone(), |e| eprintln!("{e}"), || println!("done"))
//!     .await;
//! ```

#![deny(unsafe_code)]

pub mod connection;
pub mod dispatch;
pub mod endpoint;
pub mod errors;
pub mod heartbeat;
mod outcome;
pub mod reader;
pub mod session;
#[cfg(test)]
mod testutil;
pub mod websocket;

pub use connection::{Connection, Connector, Frame, FrameReader, FrameWriter, NORMAL_CLOSURE};
pub use dispatch::{Handler, NotificationEvents};
pub use endpoint::{
    CLIENT_IDENTIFIER_HEADER, DialRequest, NOTIFICATIONS_PATH, TOKEN_HEADER, dial_request,
    notifications_url,
};
pub use errors::NotifyError;
pub use heartbeat::HeartbeatExit;
pub use reader::ReaderExit;
pub use session::{NotificationClient, SessionOptions, SessionReport, Subscription};
pub use websocket::{TungsteniteConnector, client_request, websocket_connection};
