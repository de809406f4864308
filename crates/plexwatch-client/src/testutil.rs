//! In-memory transport and callback recorders for session tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, mpsc};

use crate::connection::{Connection, Connector, Frame, FrameReader, FrameWriter, NORMAL_CLOSURE};
use crate::endpoint::DialRequest;
use crate::errors::NotifyError;

type Inbound = Result<Frame, NotifyError>;

/// What the session wrote to the fake server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    Text(String),
    FailedText,
    Close(u16),
    Shutdown,
}

/// Server side of an in-memory connection.
#[derive(Clone)]
pub(crate) struct FakePeer {
    inbound: mpsc::UnboundedSender<Inbound>,
    sent: Arc<Mutex<Vec<Sent>>>,
    fail_writes: Arc<AtomicBool>,
    stall_writes: Arc<AtomicBool>,
}

impl FakePeer {
    /// A connection whose peer answers a close frame with a normal closure
    /// when `ack_close` is set, and never answers otherwise.
    pub(crate) fn connection(ack_close: bool) -> (Connection, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let peer = Self {
            inbound: tx,
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
            stall_writes: Arc::new(AtomicBool::new(false)),
        };
        let writer = FakeWriter {
            peer: peer.clone(),
            ack_close,
        };
        (Connection::new(FakeReader { rx }, writer), peer)
    }

    pub(crate) fn send_json(&self, json: &str) {
        self.send(Ok(Frame::Data(json.as_bytes().to_vec())));
    }

    pub(crate) fn send(&self, item: Inbound) {
        let _ = self.inbound.send(item);
    }

    pub(crate) fn close_normally(&self) {
        self.send(Ok(Frame::NormalClosure));
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every later write, close frame and shutdown hang, like a peer
    /// that stopped reading its socket.
    pub(crate) fn stall_writes(&self) {
        self.stall_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub(crate) fn heartbeats(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|s| matches!(s, Sent::Text(_)))
            .count()
    }

    pub(crate) fn failed_writes(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|s| matches!(s, Sent::FailedText))
            .count()
    }

    pub(crate) fn close_frames(&self) -> Vec<u16> {
        self.sent
            .lock()
            .iter()
            .filter_map(|s| match s {
                Sent::Close(code) => Some(*code),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|s| matches!(s, Sent::Shutdown))
            .count()
    }
}

struct FakeReader {
    rx: mpsc::UnboundedReceiver<Inbound>,
}

#[async_trait]
impl FrameReader for FakeReader {
    async fn read_frame(&mut self) -> Result<Frame, NotifyError> {
        match self.rx.recv().await {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }
}

struct FakeWriter {
    peer: FakePeer,
    ack_close: bool,
}

impl FakeWriter {
    async fn stall_if_requested(&self) {
        if self.peer.stall_writes.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl FrameWriter for FakeWriter {
    async fn write_frame(&mut self, text: String) -> Result<(), NotifyError> {
        self.stall_if_requested().await;
        if self.peer.fail_writes.load(Ordering::SeqCst) {
            self.peer.sent.lock().push(Sent::FailedText);
            return Err(NotifyError::Transport("broken pipe".into()));
        }
        self.peer.sent.lock().push(Sent::Text(text));
        Ok(())
    }

    async fn write_close_frame(&mut self, code: u16) -> Result<(), NotifyError> {
        self.stall_if_requested().await;
        self.peer.sent.lock().push(Sent::Close(code));
        if self.ack_close && code == NORMAL_CLOSURE {
            self.peer.close_normally();
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), NotifyError> {
        self.stall_if_requested().await;
        self.peer.sent.lock().push(Sent::Shutdown);
        Ok(())
    }
}

/// Hands out one prepared connection, or refuses.
pub(crate) struct FakeConnector {
    connection: Mutex<Option<Connection>>,
    dialed: Mutex<Vec<DialRequest>>,
}

impl FakeConnector {
    pub(crate) fn new(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(Some(connection)),
            dialed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn refusing() -> Self {
        Self {
            connection: Mutex::new(None),
            dialed: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn dialed(&self) -> Vec<DialRequest> {
        self.dialed.lock().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn dial(&self, request: DialRequest) -> Result<Connection, NotifyError> {
        let url = request.url.to_string();
        self.dialed.lock().push(request);
        self.connection
            .lock()
            .take()
            .ok_or_else(|| NotifyError::Handshake {
                url,
                reason: "connection refused".into(),
            })
    }
}

/// Records terminal callback invocations.
#[derive(Clone, Default)]
pub(crate) struct OutcomeRecorder {
    errors: Arc<Mutex<Vec<NotifyError>>>,
    dones: Arc<AtomicUsize>,
    fired: Arc<Notify>,
}

impl OutcomeRecorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_error(&self) -> impl FnOnce(NotifyError) + Send + 'static {
        let errors = Arc::clone(&self.errors);
        let fired = Arc::clone(&self.fired);
        move |err| {
            errors.lock().push(err);
            fired.notify_one();
        }
    }

    pub(crate) fn on_done(&self) -> impl FnOnce() + Send + 'static {
        let dones = Arc::clone(&self.dones);
        let fired = Arc::clone(&self.fired);
        move || {
            let _ = dones.fetch_add(1, Ordering::SeqCst);
            fired.notify_one();
        }
    }

    /// Wait until either callback has run.
    pub(crate) async fn wait(&self) {
        if self.total() > 0 {
            return;
        }
        self.fired.notified().await;
    }

    pub(crate) fn error_kinds(&self) -> Vec<&'static str> {
        self.errors.lock().iter().map(NotifyError::error_kind).collect()
    }

    pub(crate) fn take_errors(&self) -> Vec<NotifyError> {
        std::mem::take(&mut *self.errors.lock())
    }

    pub(crate) fn done_count(&self) -> usize {
        self.dones.load(Ordering::SeqCst)
    }

    pub(crate) fn total(&self) -> usize {
        self.errors.lock().len() + self.done_count()
    }
}
