//! `tokio-tungstenite` implementation of the transport seam.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{WebSocketStream, connect_async};
use tracing::{debug, trace};

use crate::connection::{Connection, Connector, Frame, FrameReader, FrameWriter};
use crate::endpoint::DialRequest;
use crate::errors::NotifyError;

/// Close code reported when a close frame carries no status.
const NO_STATUS_RECEIVED: u16 = 1005;

/// Dials notification sockets over TCP/TLS with `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    /// Create a connector, installing the process-wide TLS crypto provider if
    /// none is installed yet.
    pub fn new() -> Self {
        // Fails only when a provider is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();
        Self
    }
}

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn dial(&self, request: DialRequest) -> Result<Connection, NotifyError> {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let url = request.url.to_string();
        let client_request = client_request(url.as_str(), &request.headers)?;
        debug!(%url, "opening notification socket");

        let (ws, response) = connect_async(client_request)
            .await
            .map_err(|e| NotifyError::Handshake {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        debug!(%url, status = response.status().as_u16(), "notification socket open");

        Ok(websocket_connection(ws))
    }
}

/// Build an upgrade request for `url` carrying `headers`.
pub fn client_request(url: &str, headers: &[(String, String)]) -> Result<Request, NotifyError> {
    let handshake = |reason: String| NotifyError::Handshake {
        url: url.to_owned(),
        reason,
    };

    let mut request = url
        .into_client_request()
        .map_err(|e| handshake(e.to_string()))?;
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| handshake(format!("header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| handshake(format!("header value for '{name}': {e}")))?;
        let _ = request.headers_mut().insert(name, value);
    }
    Ok(request)
}

/// Split an open WebSocket into a [`Connection`].
pub fn websocket_connection<S>(ws: WebSocketStream<S>) -> Connection
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sink, stream) = ws.split();
    Connection::new(WsReader { stream }, WsWriter { sink, closed: false })
}

struct WsReader<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

#[async_trait]
impl<S> FrameReader for WsReader<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn read_frame(&mut self) -> Result<Frame, NotifyError> {
        loop {
            let Some(message) = self.stream.next().await else {
                return Err(NotifyError::StreamEnded);
            };
            match message {
                Ok(Message::Text(text)) => return Ok(Frame::Data(text.as_str().as_bytes().to_vec())),
                Ok(Message::Binary(data)) => return Ok(Frame::Data(data.to_vec())),
                Ok(Message::Close(frame)) => return close_outcome(frame),
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                    trace!("control frame");
                }
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                    return Err(NotifyError::StreamEnded);
                }
                Err(e) => return Err(NotifyError::Transport(e.to_string())),
            }
        }
    }
}

fn close_outcome(frame: Option<CloseFrame>) -> Result<Frame, NotifyError> {
    match frame {
        Some(frame) if frame.code == CloseCode::Normal => Ok(Frame::NormalClosure),
        Some(frame) => Err(NotifyError::AbnormalClose {
            code: u16::from(frame.code),
            reason: frame.reason.as_str().to_owned(),
        }),
        None => Err(NotifyError::AbnormalClose {
            code: NO_STATUS_RECEIVED,
            reason: String::new(),
        }),
    }
}

struct WsWriter<S> {
    sink: SplitSink<WebSocketStream<S>, Message>,
    closed: bool,
}

#[async_trait]
impl<S> FrameWriter for WsWriter<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn write_frame(&mut self, text: String) -> Result<(), NotifyError> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }

    async fn write_close_frame(&mut self, code: u16) -> Result<(), NotifyError> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: String::new().into(),
        };
        self.sink
            .send(Message::Close(Some(frame)))
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), NotifyError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(NotifyError::Transport(e.to_string())),
        }
    }
}
