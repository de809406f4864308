//! Transport seam between the session and the WebSocket library.
//!
//! The session only needs four things from a connection: read the next frame,
//! write a text frame, write a close frame, and drop the transport. Splitting
//! them into a reader half and a writer half lets the read task and the
//! heartbeat task own their side without sharing a lock.

use async_trait::async_trait;

use crate::endpoint::DialRequest;
use crate::errors::NotifyError;

/// Close code for a normal closure.
pub const NORMAL_CLOSURE: u16 = 1000;

/// One inbound frame as the read task sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text or binary payload.
    Data(Vec<u8>),
    /// The server sent a close frame with code 1000.
    NormalClosure,
}

/// Inbound half of a connection.
#[async_trait]
pub trait FrameReader: Send {
    /// Wait for the next payload or closure.
    ///
    /// Control frames are handled below this layer. A close with any code
    /// other than 1000 is [`NotifyError::AbnormalClose`]; a stream that ends
    /// without one is [`NotifyError::StreamEnded`].
    async fn read_frame(&mut self) -> Result<Frame, NotifyError>;
}

/// Outbound half of a connection.
#[async_trait]
pub trait FrameWriter: Send {
    /// Send a text frame.
    async fn write_frame(&mut self, text: String) -> Result<(), NotifyError>;

    /// Send a close frame with the given code.
    async fn write_close_frame(&mut self, code: u16) -> Result<(), NotifyError>;

    /// Shut the transport down. Called exactly once per session.
    async fn close(&mut self) -> Result<(), NotifyError>;
}

/// An open notification socket, split into halves.
pub struct Connection {
    /// Owned by the read task.
    pub reader: Box<dyn FrameReader>,
    /// Owned by the heartbeat task.
    pub writer: Box<dyn FrameWriter>,
}

impl Connection {
    /// Pair two halves into a connection.
    pub fn new(reader: impl FrameReader + 'static, writer: impl FrameWriter + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            writer: Box::new(writer),
        }
    }
}

/// Opens notification sockets.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Perform the upgrade handshake described by `request`.
    async fn dial(&self, request: DialRequest) -> Result<Connection, NotifyError>;
}
