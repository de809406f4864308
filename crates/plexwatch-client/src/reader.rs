//! Read task: decode inbound frames and dispatch them in order.

use std::sync::Arc;

use plexwatch_events::decode_notification;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::{Frame, FrameReader};
use crate::dispatch::NotificationEvents;
use crate::errors::NotifyError;
use crate::outcome::Outcome;

/// How the read task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// The server closed the stream normally; `on_done` was reported.
    PeerClosed,
    /// Reading or decoding failed; the error was reported.
    Failed,
    /// The connection was dropped under the read task without an outcome.
    ForcedClose,
    /// The task panicked or was aborted.
    Aborted,
}

/// Read frames until the stream ends, a frame fails to decode, or
/// `force_close` fires.
///
/// Handlers run inline, so the next frame is not read until the previous
/// handler returns. Kinds without a handler are skipped.
pub(crate) async fn run_reader(
    mut reader: Box<dyn FrameReader>,
    mut events: NotificationEvents,
    outcome: Arc<Outcome>,
    force_close: CancellationToken,
) -> ReaderExit {
    let mut dispatched: u64 = 0;

    let exit = loop {
        let frame = tokio::select! {
            biased;
            () = force_close.cancelled() => break ReaderExit::ForcedClose,
            frame = reader.read_frame() => frame,
        };

        match frame {
            Ok(Frame::Data(bytes)) => match decode_notification(&bytes) {
                Ok(notification) => {
                    if events.dispatch(&notification) {
                        dispatched += 1;
                    } else {
                        debug!(kind = %notification.kind(), "no handler for notification kind");
                    }
                }
                Err(err) => {
                    warn!(error = %err, len = bytes.len(), "undecodable notification frame");
                    let _ = outcome.fail(NotifyError::Decode(err));
                    break ReaderExit::Failed;
                }
            },
            Ok(Frame::NormalClosure) => {
                info!("server closed notification stream");
                let _ = outcome.complete();
                break ReaderExit::PeerClosed;
            }
            Err(err) => {
                warn!(error = %err, kind = err.error_kind(), "notification stream failed");
                let _ = outcome.fail(err);
                break ReaderExit::Failed;
            }
        }
    };

    debug!(?exit, dispatched, "read loop finished");
    exit
}
