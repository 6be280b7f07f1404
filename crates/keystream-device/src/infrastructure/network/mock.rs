//! Mock connector and transport for testing.
//!
//! Records every frame in shared memory instead of writing to a socket, and
//! can be told to fail connects or a specific send.  Clones share state, so a
//! test keeps one handle for assertions while the session owns another.

use std::sync::{
    atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;

use crate::application::session::{Connector, Transport};
use crate::error::BoxError;

#[derive(Debug, Default)]
struct Shared {
    frames: Mutex<Vec<String>>,
    send_attempts: AtomicUsize,
    connect_attempts: AtomicU32,
    closed: AtomicBool,
}

/// A [`Connector`] whose transports record frames in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingConnector {
    shared: Arc<Shared>,
    failing_connects: u32,
    fail_send_at: Option<usize>,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first `n` connect attempts fail.
    pub fn failing_connects(mut self, n: u32) -> Self {
        self.failing_connects = n;
        self
    }

    /// The send attempt with 0-based index `index` fails (index 0 is the
    /// handshake).  Later sends fail too, like a broken socket.
    pub fn failing_send_at(mut self, index: usize) -> Self {
        self.fail_send_at = Some(index);
        self
    }

    /// Frames successfully "sent", in order.
    pub fn frames(&self) -> Vec<String> {
        self.shared.frames.lock().expect("lock poisoned").clone()
    }

    /// Every call to `send_text`, including failed ones.
    pub fn send_attempts(&self) -> usize {
        self.shared.send_attempts.load(Ordering::SeqCst)
    }

    pub fn connect_attempts(&self) -> u32 {
        self.shared.connect_attempts.load(Ordering::SeqCst)
    }

    pub fn was_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    type Transport = RecordingTransport;

    async fn connect(&self, url: &str) -> Result<RecordingTransport, BoxError> {
        let attempt = self.shared.connect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failing_connects {
            return Err(format!("{url}: connection refused (attempt {attempt})").into());
        }
        Ok(RecordingTransport {
            shared: Arc::clone(&self.shared),
            fail_send_at: self.fail_send_at,
        })
    }
}

/// The [`Transport`] handed out by [`RecordingConnector`].
#[derive(Debug)]
pub struct RecordingTransport {
    shared: Arc<Shared>,
    fail_send_at: Option<usize>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&mut self, text: String) -> Result<(), BoxError> {
        let index = self.shared.send_attempts.fetch_add(1, Ordering::SeqCst);
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err("transport closed".into());
        }
        if self.fail_send_at.is_some_and(|at| index >= at) {
            return Err("broken pipe".into());
        }
        self.shared.frames.lock().expect("lock poisoned").push(text);
        Ok(())
    }

    async fn close(&mut self) {
        self.shared.closed.store(true, Ordering::SeqCst);
    }
}
