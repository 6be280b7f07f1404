//! DeviceSession: the connection to the collection server and its sequencer.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect──► Connecting ──ok──► Identified ──► Streaming ─┐
//!      │                        │                  │              ▲    │ send_event
//!      │                        └─ConnectError─┐   └─SendError─┐  └────┘
//!      │                                       ▼               ▼
//!      └──────────────────────────────────►  Closed  ◄── SendError / close()
//! ```
//!
//! The handshake is fire-and-forget: as soon as the frame is written the
//! session is `Identified` and moves straight on to `Streaming`.  Any reply
//! the server sends is drained and logged by the transport, never awaited.
//!
//! Each call to [`DeviceSession::send_event`] consumes exactly one sequence
//! number and produces exactly one network write.  A failed write closes the
//! session; the number it consumed is not reused because nothing is sent
//! after it.

use async_trait::async_trait;
use keystream_core::{
    encode_event, encode_handshake, DeviceIdentity, EventMessage, Handshake, KeyEvent, Sequencer,
};
use tracing::{debug, info, trace, warn};

use crate::domain::{ConnectPolicy, DeviceConfig};
use crate::error::{BoxError, StreamError};

/// Connection states.  `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Identified,
    Streaming,
    Closed,
}

/// A connected, message-oriented transport to the server.
///
/// One call to `send_text` is one frame on the wire.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send {
    /// Writes one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), BoxError>;

    /// Closes the transport.  Must be safe to call more than once.
    async fn close(&mut self);
}

/// Opens a [`Transport`] to a server URL.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    /// Establishes the transport.  Performs no keystream-level handshake.
    async fn connect(&self, url: &str) -> Result<Self::Transport, BoxError>;
}

/// Connects with `connector`, retrying per `policy`.
///
/// # Errors
///
/// Returns [`StreamError::ConnectError`] carrying the last failure once all
/// attempts are used up.
pub async fn connect_with_policy<C: Connector>(
    connector: &C,
    url: &str,
    policy: &ConnectPolicy,
) -> Result<C::Transport, StreamError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match connector.connect(url).await {
            Ok(transport) => {
                info!("connected to {url} (attempt {attempt}/{attempts})");
                return Ok(transport);
            }
            Err(source) if attempt >= attempts => {
                return Err(StreamError::ConnectError {
                    url: url.to_string(),
                    source,
                });
            }
            Err(e) => {
                let delay = policy.delay_before_retry(attempt);
                warn!("connect to {url} failed (attempt {attempt}/{attempts}): {e}; retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// The device's single connection, its identity, and its sequence counter.
pub struct DeviceSession<T> {
    identity: DeviceIdentity,
    transport: T,
    seq: Sequencer,
    state: SessionState,
}

impl<T: Transport> DeviceSession<T> {
    /// Drives the session from `Disconnected` to `Streaming`.
    ///
    /// Connects to `config.server_url` (honouring the connect policy) and
    /// sends the handshake.
    ///
    /// # Errors
    ///
    /// - [`StreamError::ConnectError`] if the transport cannot be established.
    /// - [`StreamError::SendError`] if the handshake cannot be written.
    pub async fn open<C>(connector: &C, config: &DeviceConfig) -> Result<Self, StreamError>
    where
        C: Connector<Transport = T>,
    {
        log_transition(SessionState::Disconnected, SessionState::Connecting);
        let transport =
            match connect_with_policy(connector, &config.server_url, &config.connect_policy).await
            {
                Ok(t) => t,
                Err(e) => {
                    log_transition(SessionState::Connecting, SessionState::Closed);
                    return Err(e);
                }
            };
        Self::identify(config.device_id.clone(), transport).await
    }

    /// Sends the handshake on an already connected transport.
    ///
    /// On success the session is in [`SessionState::Streaming`].  On failure
    /// the transport is closed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SendError`] or [`StreamError::Protocol`].
    pub async fn identify(identity: DeviceIdentity, mut transport: T) -> Result<Self, StreamError> {
        let text = match encode_handshake(&Handshake::device(&identity)) {
            Ok(text) => text,
            Err(e) => {
                transport.close().await;
                return Err(e.into());
            }
        };

        if let Err(source) = transport.send_text(text).await {
            log_transition(SessionState::Connecting, SessionState::Closed);
            transport.close().await;
            return Err(StreamError::SendError {
                what: "handshake",
                source,
            });
        }
        log_transition(SessionState::Connecting, SessionState::Identified);
        info!("identified to server as device {identity}");

        log_transition(SessionState::Identified, SessionState::Streaming);
        Ok(Self {
            identity,
            transport,
            seq: Sequencer::new(),
            state: SessionState::Streaming,
        })
    }

    /// Assigns the next sequence number to `event` and transmits it.
    ///
    /// Returns the sequence number used.
    ///
    /// # Errors
    ///
    /// - [`StreamError::SendError`] if the write fails; the session is then
    ///   `Closed` and every further call fails without touching the network.
    /// - [`StreamError::Protocol`] if the event cannot be serialized; the
    ///   session is closed as well.
    pub async fn send_event(&mut self, event: KeyEvent) -> Result<u64, StreamError> {
        if self.state != SessionState::Streaming {
            return Err(StreamError::SendError {
                what: "event",
                source: format!("session is {:?}", self.state).into(),
            });
        }

        let seq = self.seq.next();
        let msg = EventMessage::new(&self.identity, seq, event);
        let text = match encode_event(&msg) {
            Ok(text) => text,
            Err(e) => {
                self.close().await;
                return Err(e.into());
            }
        };

        trace!(seq, kind = ?msg.kind, code = %msg.code, "sending event");
        if let Err(source) = self.transport.send_text(text).await {
            warn!("send of event seq={seq} failed: {source}");
            self.close().await;
            return Err(StreamError::SendError {
                what: "event",
                source,
            });
        }
        Ok(seq)
    }

    /// Closes the transport and moves to `Closed`.  Idempotent.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        log_transition(self.state, SessionState::Closed);
        self.transport.close().await;
        self.state = SessionState::Closed;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Number of events attempted so far (sequence numbers issued).
    pub fn events_sent(&self) -> u64 {
        self.seq.issued()
    }
}

fn log_transition(from: SessionState, to: SessionState) {
    debug!("session state {from:?} -> {to:?}");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
