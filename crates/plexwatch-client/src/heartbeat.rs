//! Heartbeat and shutdown task.
//!
//! Owns the writer half. While running it sends a liveness frame every
//! interval. On cancellation it sends a single close frame and waits a bounded
//! time for the server's answer, then drops the connection. If the read task
//! finishes first the connection is dropped without a close frame.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::{FrameWriter, NORMAL_CLOSURE};
use crate::errors::NotifyError;
use crate::outcome::Outcome;

/// How the heartbeat task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatExit {
    /// Cancelled; the server acknowledged the close frame in time.
    Acknowledged,
    /// Cancelled; the server did not answer within the close timeout.
    TimedOut,
    /// The read task finished first.
    ReaderFinished,
    /// The task panicked or was aborted.
    Aborted,
}

/// Signals shared between the session tasks.
#[derive(Clone)]
pub(crate) struct ShutdownSignals {
    /// Caller's cancellation.
    pub(crate) cancel: CancellationToken,
    /// Fired when the read task returns, however it returns.
    pub(crate) reader_done: CancellationToken,
    /// Fired by the heartbeat task once the connection is dropped.
    pub(crate) force_close: CancellationToken,
}

impl ShutdownSignals {
    pub(crate) fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            reader_done: CancellationToken::new(),
            force_close: CancellationToken::new(),
        }
    }
}

enum Trigger {
    Cancelled,
    ReaderFinished,
}

/// Run the heartbeat state machine to completion.
pub(crate) async fn run_heartbeat(
    mut writer: Box<dyn FrameWriter>,
    outcome: Arc<Outcome>,
    signals: ShutdownSignals,
    interval: Duration,
    close_timeout: Duration,
) -> HeartbeatExit {
    let period = interval.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sent: u64 = 0;

    // Running
    let trigger = loop {
        tokio::select! {
            biased;
            () = signals.cancel.cancelled() => break Trigger::Cancelled,
            () = signals.reader_done.cancelled() => break Trigger::ReaderFinished,
            _ = ticker.tick() => {
                // A peer that stops reading can stall the send indefinitely.
                let send = writer.write_frame(liveness_frame());
                tokio::select! {
                    biased;
                    () = signals.cancel.cancelled() => break Trigger::Cancelled,
                    () = signals.reader_done.cancelled() => break Trigger::ReaderFinished,
                    result = send => match result {
                        Ok(()) => sent += 1,
                        Err(err) => {
                            warn!(error = %err, "heartbeat send failed");
                            let _ = outcome.fail(err);
                        }
                    },
                }
            }
        }
    };
    debug!(heartbeats = sent, "heartbeat stopped");

    // Closing
    let deadline = Instant::now() + close_timeout;
    let exit = match trigger {
        Trigger::Cancelled => {
            info!("cancellation requested, closing notification stream");
            let handshake = async {
                if let Err(err) = writer.write_close_frame(NORMAL_CLOSURE).await {
                    debug!(error = %err, "close frame not sent");
                }
                signals.reader_done.cancelled().await;
            };
            if time::timeout_at(deadline, handshake).await.is_ok() {
                HeartbeatExit::Acknowledged
            } else {
                let timeout_ms = u64::try_from(close_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms, "server did not acknowledge close, dropping connection");
                let _ = outcome.fail(NotifyError::CloseTimeout { timeout_ms });
                HeartbeatExit::TimedOut
            }
        }
        Trigger::ReaderFinished => {
            if !outcome.is_settled() {
                let _ = outcome.fail(NotifyError::ReaderStopped);
            }
            HeartbeatExit::ReaderFinished
        }
    };

    // Closed. The transport gets whatever remains of the close budget; a
    // stalled shutdown is abandoned and the writer dropped.
    match time::timeout_at(deadline, writer.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => debug!(error = %err, "transport close failed"),
        Err(_) => debug!("transport close stalled, dropping connection"),
    }
    signals.force_close.cancel();
    debug!(?exit, "notification connection closed");
    exit
}

fn liveness_frame() -> String {
    Utc::now().to_rfc3339()
}
