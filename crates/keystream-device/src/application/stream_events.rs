//! Streaming pipeline: input source → classifier → session.
//!
//! # Task layout
//!
//! ```text
//!  input task (tokio::spawn)                 session task (caller)
//!  ─────────────────────────                 ─────────────────────
//!  source.next_transition().await            rx.recv().await
//!  classify()  ── KeyEvent ──► mpsc(N) ──►   session.send_event()
//! ```
//!
//! The channel is a bounded FIFO with a single consumer, so events reach the
//! session in classification order and the sequence numbers the session
//! assigns follow that order.
//!
//! # Termination
//!
//! - **Send failure**: the session task stops at once, aborts the input task
//!   (it is parked on an `.await`, so cancellation is immediate), and drops
//!   whatever is still queued.
//! - **Read failure**: the input task returns its error and drops its sender.
//!   Events it had already queued are still sent; then the channel reports
//!   closed, the session closes, and the read error is returned.
//! - **Shutdown**: the `shutdown` future resolving closes the session
//!   cleanly and the run returns `Ok`.

use std::future::Future;
use std::path::Path;

use async_trait::async_trait;
use keystream_core::{classify, KeyEvent, RawInputTransition};
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use crate::application::session::{Connector, DeviceSession, Transport};
use crate::domain::DeviceConfig;
use crate::error::StreamError;

/// A lazy, infinite source of raw key transitions.
///
/// Implementations block (asynchronously) until the next transition arrives.
/// Only key transitions are yielded; other input categories are filtered out
/// by the implementation.
#[async_trait]
pub trait InputSource: Send {
    /// Waits for the next key transition.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ReadError`] if the device fails or disappears.
    async fn next_transition(&mut self) -> Result<RawInputTransition, StreamError>;
}

/// Outcome of a run that ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Events attempted, equal to the number of sequence numbers issued.
    pub events_sent: u64,
}

/// Full device run: connect, identify, open the input device, stream.
///
/// The input device is opened only after the handshake, so a missing device
/// is reported after the server has seen the device identify itself.
///
/// # Errors
///
/// Any [`StreamError`]; all are fatal.
pub async fn run<C, S, O, F>(
    config: &DeviceConfig,
    connector: &C,
    open_source: O,
    shutdown: F,
) -> Result<RunSummary, StreamError>
where
    C: Connector,
    S: InputSource + 'static,
    O: FnOnce(&Path) -> Result<S, StreamError>,
    F: Future<Output = ()>,
{
    let mut session = DeviceSession::open(connector, config).await?;

    let source = match open_source(&config.device_path) {
        Ok(source) => source,
        Err(e) => {
            session.close().await;
            return Err(e);
        }
    };
    info!("reading key events from {}", config.device_path.display());

    stream_events(session, source, config.queue_capacity, shutdown).await
}

/// Streams classified events from `source` over `session` until failure or
/// `shutdown`.
///
/// # Errors
///
/// [`StreamError::SendError`] / [`StreamError::Protocol`] from the session,
/// or [`StreamError::ReadError`] from the input source.
pub async fn stream_events<S, T, F>(
    mut session: DeviceSession<T>,
    source: S,
    queue_capacity: usize,
    shutdown: F,
) -> Result<RunSummary, StreamError>
where
    S: InputSource + 'static,
    T: Transport,
    F: Future<Output = ()>,
{
    let (tx, mut rx) = mpsc::channel::<KeyEvent>(queue_capacity.max(1));
    let mut reader = tokio::spawn(read_input(source, tx));
    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!("shutdown requested; closing connection");
                break Ok(());
            }

            next = rx.recv() => match next {
                Some(event) => {
                    if let Err(e) = session.send_event(event).await {
                        break Err(e);
                    }
                }
                None => {
                    // The input task dropped its sender: it has finished.
                    break match (&mut reader).await {
                        Ok(result) => result,
                        Err(join_err) => Err(StreamError::ReadError(std::io::Error::other(
                            format!("input task failed: {join_err}"),
                        ))),
                    };
                }
            },
        }
    };

    reader.abort();
    session.close().await;

    let events_sent = session.events_sent();
    let device = session.identity();
    match &outcome {
        Ok(()) => info!("stream for {device} closed after {events_sent} events"),
        Err(e) => info!("stream for {device} terminated after {events_sent} events: {e}"),
    }
    outcome.map(|()| RunSummary { events_sent })
}

/// Input task body: read, classify, enqueue.
async fn read_input<S: InputSource>(
    mut source: S,
    tx: mpsc::Sender<KeyEvent>,
) -> Result<(), StreamError> {
    loop {
        let transition = source.next_transition().await?;
        let Some(event) = classify(&transition) else {
            continue;
        };
        trace!(kind = ?event.kind, code = %event.code, "classified");
        if tx.send(event).await.is_err() {
            debug!("session task gone; input task stopping");
            return Ok(());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
