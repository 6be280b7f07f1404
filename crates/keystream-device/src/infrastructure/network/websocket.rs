//! WebSocket transport to the collection server.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use keystream_core::{decode_reply, ServerReply};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, trace, warn};

use crate::application::session::{Connector, Transport};
use crate::error::BoxError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens plain `ws://` connections.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: &str) -> Result<WsTransport, BoxError> {
        let (stream, response) = connect_async(url).await?;
        debug!("websocket upgrade to {url} complete ({})", response.status());
        Ok(WsTransport::new(stream))
    }
}

/// The write half of an open WebSocket plus the task draining its read half.
pub struct WsTransport {
    sink: SplitSink<WsStream, WsMessage>,
    drain: JoinHandle<()>,
    closed: bool,
}

impl WsTransport {
    fn new(stream: WsStream) -> Self {
        let (sink, source) = stream.split();
        Self {
            sink,
            drain: tokio::spawn(drain_replies(source)),
            closed: false,
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), BoxError> {
        self.sink.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Sends a Close frame; the server may already be gone.
        match self.sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {}
            Err(e) => debug!("error while closing websocket: {e}"),
        }
        self.drain.abort();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.drain.abort();
    }
}

/// Reads and logs everything the server sends until the socket closes.
///
/// Replies are informational; nothing here feeds back into the session.
async fn drain_replies(mut source: SplitStream<WsStream>) {
    while let Some(frame) = source.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => log_reply(&text),
            Ok(WsMessage::Close(frame)) => {
                info!("server closed the connection: {frame:?}");
                break;
            }
            Ok(_) => {}
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => break,
            Err(e) => {
                warn!("websocket read error: {e}");
                break;
            }
        }
    }
    debug!("reply drain finished");
}

fn log_reply(text: &str) {
    match decode_reply(text) {
        Ok(ServerReply::Registered { server, note, .. }) => {
            info!(
                "server registration reply: {server} ({})",
                note.as_deref().unwrap_or("no note")
            );
        }
        Ok(ServerReply::Ack { ack, server_ts }) => {
            trace!(?ack, server_ts, "server ack");
        }
        Ok(ServerReply::Other(value)) => debug!("unrecognised server message: {value}"),
        Err(e) => debug!("{e}"),
    }
}
