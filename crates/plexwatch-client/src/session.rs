//! Notification session wiring.
//!
//! [`NotificationClient::subscribe`] dials the server, then splits the
//! connection between a read task (dispatch) and a heartbeat task (liveness
//! and shutdown). Exactly one of the caller's terminal callbacks runs per
//! session.

use std::time::Duration;

use plexwatch_settings::{PlexwatchSettings, SessionSettings};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

use crate::connection::{Connection, Connector};
use crate::dispatch::NotificationEvents;
use crate::endpoint::dial_request;
use crate::errors::NotifyError;
use crate::heartbeat::{HeartbeatExit, ShutdownSignals, run_heartbeat};
use crate::outcome::Outcome;
use crate::reader::{ReaderExit, run_reader};
use crate::websocket::TungsteniteConnector;

/// Session timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Interval between liveness frames.
    pub heartbeat_interval: Duration,
    /// How long to wait for the server to acknowledge a close frame.
    pub close_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(1),
            close_timeout: Duration::from_secs(1),
        }
    }
}

impl From<&SessionSettings> for SessionOptions {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            heartbeat_interval: settings.heartbeat_interval(),
            close_timeout: settings.close_timeout(),
        }
    }
}

/// Where and how to subscribe.
#[derive(Clone)]
pub struct NotificationClient {
    base_url: String,
    token: String,
    client_identifier: Option<String>,
    options: SessionOptions,
}

impl std::fmt::Debug for NotificationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationClient")
            .field("base_url", &self.base_url)
            .field("client_identifier", &self.client_identifier)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl NotificationClient {
    /// Client for the server at `base_url` using `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            client_identifier: None,
            options: SessionOptions::default(),
        }
    }

    /// Client configured from loaded settings.
    pub fn from_settings(settings: &PlexwatchSettings) -> Self {
        Self {
            base_url: settings.server.url.clone(),
            token: settings.server.token.clone(),
            client_identifier: settings.server.client_identifier.clone(),
            options: SessionOptions::from(&settings.session),
        }
    }

    /// Send `X-Plex-Client-Identifier` on the upgrade request.
    #[must_use]
    pub fn with_client_identifier(mut self, id: impl Into<String>) -> Self {
        self.client_identifier = Some(id.into());
        self
    }

    /// Override session timing.
    #[must_use]
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Session timing in use.
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Subscribe over a real WebSocket.
    ///
    /// Returns once the connection is open (or failed to open). Setup
    /// failures are reported through `on_error` before this returns, and no
    /// task is started. Otherwise the session runs in the background until
    /// `cancel` fires or the stream ends, and exactly one of `on_error` /
    /// `on_done` runs when it does.
    pub async fn subscribe<E, D>(
        &self,
        events: NotificationEvents,
        cancel: CancellationToken,
        on_error: E,
        on_done: D,
    ) -> Subscription
    where
        E: FnOnce(NotifyError) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        self.subscribe_with(&TungsteniteConnector::new(), events, cancel, on_error, on_done)
            .await
    }

    /// [`subscribe`](Self::subscribe) over a caller-supplied transport.
    pub async fn subscribe_with<C, E, D>(
        &self,
        connector: &C,
        events: NotificationEvents,
        cancel: CancellationToken,
        on_error: E,
        on_done: D,
    ) -> Subscription
    where
        C: Connector + ?Sized,
        E: FnOnce(NotifyError) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        let outcome = Outcome::new(on_error, on_done);

        let request = match dial_request(&self.base_url, &self.token, self.client_identifier.as_deref()) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "cannot derive notification url");
                let _ = outcome.fail(err);
                return Subscription::inert();
            }
        };

        let url = request.url.to_string();
        let connection = match connector.dial(request).await {
            Ok(connection) => connection,
            Err(err) => {
                warn!(%url, error = %err, "notification handshake failed");
                let _ = outcome.fail(err);
                return Subscription::inert();
            }
        };

        info!(%url, "subscribed to server notifications");
        Subscription::start(connection, events, cancel, outcome, self.options, &url)
    }
}

/// Final state of both session tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// How the read task ended.
    pub reader: ReaderExit,
    /// How the heartbeat task ended.
    pub heartbeat: HeartbeatExit,
}

/// Handle on a running (or never-started) session.
#[derive(Debug)]
pub struct Subscription {
    tasks: Option<(JoinHandle<ReaderExit>, JoinHandle<HeartbeatExit>)>,
}

impl Subscription {
    fn inert() -> Self {
        Self { tasks: None }
    }

    fn start(
        connection: Connection,
        events: NotificationEvents,
        cancel: CancellationToken,
        outcome: std::sync::Arc<Outcome>,
        options: SessionOptions,
        url: &str,
    ) -> Self {
        let Connection { reader, writer } = connection;
        let signals = ShutdownSignals::new(cancel);
        let span = info_span!("notifications", %url);

        let reader_done = signals.reader_done.clone();
        let force_close = signals.force_close.clone();
        let reader_outcome = std::sync::Arc::clone(&outcome);
        let read_task = tokio::spawn(
            async move {
                // Fires on return and on unwind.
                let _done = reader_done.drop_guard();
                run_reader(reader, events, reader_outcome, force_close).await
            }
            .instrument(span.clone()),
        );

        let heartbeat_task = tokio::spawn(
            run_heartbeat(
                writer,
                outcome,
                signals,
                options.heartbeat_interval,
                options.close_timeout,
            )
            .instrument(span),
        );

        Self {
            tasks: Some((read_task, heartbeat_task)),
        }
    }

    /// Whether the session's tasks were started.
    pub fn is_started(&self) -> bool {
        self.tasks.is_some()
    }

    /// Whether both tasks have finished (trivially true if never started).
    pub fn is_finished(&self) -> bool {
        self.tasks
            .as_ref()
            .is_none_or(|(read, heartbeat)| read.is_finished() && heartbeat.is_finished())
    }

    /// Wait for both tasks to finish. `None` if the session never started.
    pub async fn wait(self) -> Option<SessionReport> {
        let (read_task, heartbeat_task) = self.tasks?;
        let reader = read_task.await.unwrap_or_else(|e| {
            warn!(error = %e, "read task did not complete");
            ReaderExit::Aborted
        });
        let heartbeat = heartbeat_task.await.unwrap_or_else(|e| {
            warn!(error = %e, "heartbeat task did not complete");
            HeartbeatExit::Aborted
        });
        Some(SessionReport { reader, heartbeat })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use parking_lot::Mutex;
    use plexwatch_events::{EventKind, Notification};
    use tokio::time::Instant;

    use super::*;
    use crate::connection::NORMAL_CLOSURE;
    use crate::endpoint::{NOTIFICATIONS_PATH, TOKEN_HEADER};
    use crate::testutil::{FakeConnector, FakePeer, OutcomeRecorder};

    const REACHABILITY_FRAME: &str = r#"{"NotificationContainer":{"type":"reachability","size":1,"ReachabilityNotification":[{"reachability":true}]}}"#;

    fn client() -> NotificationClient {
        NotificationClient::new("http://192.168.1.20:32400", "tok")
    }

    async fn subscribe(
        ack_close: bool,
        events: NotificationEvents,
    ) -> (FakePeer, OutcomeRecorder, CancellationToken, Subscription) {
        let (connection, peer) = FakePeer::connection(ack_close);
        let connector = FakeConnector::new(connection);
        let recorder = OutcomeRecorder::new();
        let cancel = CancellationToken::new();
        let subscription = client()
            .subscribe_with(
                &connector,
                events,
                cancel.clone(),
                recorder.on_error(),
                recorder.on_done(),
            )
            .await;
        (peer, recorder, cancel, subscription)
    }

    #[tokio::test]
    async fn reachability_scenario() {
        let seen: Arc<Mutex<Vec<Notification>>> = Arc::new(Mutex::new(Vec::new()));
        let mut events = NotificationEvents::new();
        let sink = Arc::clone(&seen);
        let _ = events.on_reachability(move |n| sink.lock().push(n.clone()));

        let (peer, recorder, cancel, subscription) = subscribe(true, events).await;
        assert!(subscription.is_started());

        peer.send_json(REACHABILITY_FRAME);
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let report = subscription.wait().await.unwrap();
        assert_eq!(report.reader, ReaderExit::PeerClosed);
        assert_eq!(report.heartbeat, HeartbeatExit::Acknowledged);

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), &EventKind::Reachability);
        assert_eq!(seen[0].size(), Some(1));
        let reach = seen[0].reachability().unwrap();
        assert_eq!(reach.len(), 1);
        assert!(reach[0].reachability);

        assert_eq!(recorder.done_count(), 1);
        assert!(recorder.error_kinds().is_empty());
        assert_eq!(peer.close_frames(), vec![NORMAL_CLOSURE]);
        assert_eq!(peer.shutdowns(), 1);
    }

    #[tokio::test]
    async fn dial_request_targets_notification_socket() {
        let (connection, _peer) = FakePeer::connection(true);
        let connector = FakeConnector::new(connection);
        let recorder = OutcomeRecorder::new();
        let cancel = CancellationToken::new();
        let subscription = client()
            .with_client_identifier("cid")
            .subscribe_with(
                &connector,
                NotificationEvents::new(),
                cancel.clone(),
                recorder.on_error(),
                recorder.on_done(),
            )
            .await;
        cancel.cancel();
        let _ = subscription.wait().await;

        let dialed = connector.dialed();
        assert_eq!(dialed.len(), 1);
        assert_eq!(dialed[0].url.scheme(), "wss");
        assert_eq!(dialed[0].url.port(), Some(32400));
        assert_eq!(dialed[0].url.path(), NOTIFICATIONS_PATH);
        assert_eq!(dialed[0].header(TOKEN_HEADER), Some("tok"));
        assert_eq!(dialed[0].header("X-Plex-Client-Identifier"), Some("cid"));
    }

    #[tokio::test]
    async fn invalid_url_fails_before_dialing() {
        let connector = FakeConnector::refusing();
        let recorder = OutcomeRecorder::new();
        let subscription = NotificationClient::new("not a url", "tok")
            .subscribe_with(
                &connector,
                NotificationEvents::new(),
                CancellationToken::new(),
                recorder.on_error(),
                recorder.on_done(),
            )
            .await;

        assert!(!subscription.is_started());
        assert!(subscription.is_finished());
        assert!(connector.dialed().is_empty());
        assert_eq!(recorder.error_kinds(), vec!["invalid_url"]);
        assert!(subscription.wait().await.is_none());
    }

    #[tokio::test]
    async fn handshake_failure_reports_once_without_tasks() {
        let connector = FakeConnector::refusing();
        let recorder = OutcomeRecorder::new();
        let subscription = client()
            .subscribe_with(
                &connector,
                NotificationEvents::new(),
                CancellationToken::new(),
                recorder.on_error(),
                recorder.on_done(),
            )
            .await;

        assert!(!subscription.is_started());
        let errors = recorder.take_errors();
        assert_eq!(errors.len(), 1);
        assert_matches!(&errors[0], NotifyError::Handshake { reason, .. } if reason == "connection refused");
        assert_eq!(recorder.done_count(), 0);
    }

    #[tokio::test]
    async fn server_normal_close_reports_done() {
        let (peer, recorder, _cancel, subscription) = subscribe(false, NotificationEvents::new()).await;
        peer.send_json(r#"{"type":"timeline","size":0}"#);
        peer.close_normally();

        let report = subscription.wait().await.unwrap();
        assert_eq!(report.reader, ReaderExit::PeerClosed);
        assert_eq!(report.heartbeat, HeartbeatExit::ReaderFinished);
        assert_eq!(recorder.done_count(), 1);
        assert!(recorder.error_kinds().is_empty());
        // Server closed first, so no close frame from our side.
        assert!(peer.close_frames().is_empty());
        assert_eq!(peer.shutdowns(), 1);
    }

    #[tokio::test]
    async fn transport_error_reports_error() {
        let (peer, recorder, _cancel, subscription) = subscribe(false, NotificationEvents::new()).await;
        peer.send(Err(NotifyError::Transport("connection reset".into())));

        let report = subscription.wait().await.unwrap();
        assert_eq!(report.reader, ReaderExit::Failed);
        assert_eq!(recorder.error_kinds(), vec!["transport"]);
        assert_eq!(recorder.done_count(), 0);
    }

    #[tokio::test]
    async fn decode_error_ends_session() {
        let (peer, recorder, _cancel, subscription) = subscribe(false, NotificationEvents::new()).await;
        peer.send_json("[1,2,3]");

        let report = subscription.wait().await.unwrap();
        assert_eq!(report.reader, ReaderExit::Failed);
        assert_eq!(recorder.error_kinds(), vec!["decode"]);
    }

    #[tokio::test]
    async fn handlers_run_in_order_on_one_task() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut events = NotificationEvents::new();
        for kind in KINDS {
            let order = Arc::clone(&order);
            let _ = events.register(kind, move |n| order.lock().push(n.kind().to_string()));
        }
        let (peer, recorder, _cancel, subscription) = subscribe(false, events).await;
        for kind in KINDS.iter().chain(KINDS.iter().rev()) {
            peer.send_json(&format!(r#"{{"type":"{kind}","size":1}}"#));
        }
        peer.close_normally();
        let _ = subscription.wait().await;

        let order = order.lock();
        let expected: Vec<&str> = KINDS.iter().chain(KINDS.iter().rev()).copied().collect();
        assert_eq!(*order, expected);
        assert_eq!(recorder.done_count(), 1);
    }

    const KINDS: [&str; 4] = ["playing", "activity", "timeline", "status"];

    #[tokio::test(start_paused = true)]
    async fn unacknowledged_close_is_bounded() {
        let (peer, recorder, cancel, subscription) = subscribe(false, NotificationEvents::new()).await;
        let started = Instant::now();
        cancel.cancel();

        let report = subscription.wait().await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1100), "{elapsed:?}");

        assert_eq!(report.heartbeat, HeartbeatExit::TimedOut);
        assert_eq!(report.reader, ReaderExit::ForcedClose);
        assert_eq!(recorder.error_kinds(), vec!["close_timeout"]);
        assert_eq!(recorder.done_count(), 0);
        assert_eq!(peer.close_frames(), vec![NORMAL_CLOSURE]);
        assert_eq!(peer.shutdowns(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_peer_cannot_block_shutdown() {
        let (peer, recorder, cancel, subscription) = subscribe(false, NotificationEvents::new()).await;
        peer.stall_writes();
        // The first heartbeat is now stuck in the writer.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let started = Instant::now();
        cancel.cancel();

        let report = tokio::time::timeout(Duration::from_secs(30), subscription.wait())
            .await
            .expect("session did not shut down")
            .unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(1), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1100), "{elapsed:?}");

        assert_eq!(report.heartbeat, HeartbeatExit::TimedOut);
        assert_eq!(report.reader, ReaderExit::ForcedClose);
        assert_eq!(recorder.error_kinds(), vec!["close_timeout"]);
        assert_eq!(recorder.done_count(), 0);
        assert!(peer.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledged_close_finishes_early() {
        let (peer, recorder, cancel, subscription) = subscribe(true, NotificationEvents::new()).await;
        let started = Instant::now();
        cancel.cancel();

        let report = subscription.wait().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(report.heartbeat, HeartbeatExit::Acknowledged);
        assert_eq!(recorder.done_count(), 1);
        assert!(recorder.error_kinds().is_empty());
        assert_eq!(peer.close_frames().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeats_while_running() {
        let (peer, _recorder, cancel, subscription) = subscribe(true, NotificationEvents::new()).await;
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(peer.heartbeats(), 3);

        cancel.cancel();
        let _ = subscription.wait().await;
        assert_eq!(peer.heartbeats(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_heartbeat_interval() {
        let (connection, peer) = FakePeer::connection(true);
        let connector = FakeConnector::new(connection);
        let recorder = OutcomeRecorder::new();
        let cancel = CancellationToken::new();
        let subscription = client()
            .with_options(SessionOptions {
                heartbeat_interval: Duration::from_millis(250),
                close_timeout: Duration::from_millis(500),
            })
            .subscribe_with(
                &connector,
                NotificationEvents::new(),
                cancel.clone(),
                recorder.on_error(),
                recorder.on_done(),
            )
            .await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(peer.heartbeats(), 4);
        cancel.cancel();
        let _ = subscription.wait().await;
    }

    #[tokio::test]
    async fn cancel_many_times_closes_once() {
        let (peer, recorder, cancel, subscription) = subscribe(true, NotificationEvents::new()).await;
        cancel.cancel();
        cancel.cancel();
        let report = subscription.wait().await.unwrap();
        cancel.cancel();

        assert_eq!(report.heartbeat, HeartbeatExit::Acknowledged);
        assert_eq!(peer.close_frames().len(), 1);
        assert_eq!(peer.shutdowns(), 1);
        assert_eq!(recorder.total(), 1);
    }

    #[tokio::test]
    async fn panicking_handler_still_reports_outcome() {
        let mut events = NotificationEvents::new();
        let _ = events.on_status(|_| panic!("handler bug"));
        let (peer, recorder, _cancel, subscription) = subscribe(false, events).await;
        peer.send_json(r#"{"type":"status","size":1}"#);

        let report = subscription.wait().await.unwrap();
        assert_eq!(report.reader, ReaderExit::Aborted);
        assert_eq!(report.heartbeat, HeartbeatExit::ReaderFinished);
        assert_eq!(recorder.error_kinds(), vec!["reader_stopped"]);
    }

    #[tokio::test]
    async fn waits_for_outcome_callback() {
        let (peer, recorder, _cancel, subscription) = subscribe(false, NotificationEvents::new()).await;
        peer.close_normally();
        recorder.wait().await;
        assert_eq!(recorder.done_count(), 1);
        let _ = subscription.wait().await;
    }

    #[test]
    fn options_from_settings() {
        let mut settings = PlexwatchSettings::default();
        settings.server.url = "https://plex.example.net:32400".into();
        settings.server.token = "secret".into();
        settings.server.client_identifier = Some("cid".into());
        settings.session.heartbeat_interval_ms = 500;
        settings.session.close_timeout_ms = 2000;

        let client = NotificationClient::from_settings(&settings);
        assert_eq!(
            client.options(),
            SessionOptions {
                heartbeat_interval: Duration::from_millis(500),
                close_timeout: Duration::from_secs(2),
            }
        );
        let debug = format!("{client:?}");
        assert!(debug.contains("plex.example.net"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn default_options() {
        let options = SessionOptions::default();
        assert_eq!(options.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(options.close_timeout, Duration::from_secs(1));
    }
}
