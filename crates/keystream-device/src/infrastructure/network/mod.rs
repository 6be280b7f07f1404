//! Network infrastructure for the device client.
//!
//! Architecture:
//! - [`websocket::WsConnector`] opens a WebSocket to the collection server.
//! - [`websocket::WsTransport`] owns the write half; each `send_text` is one
//!   text frame.  The read half is drained by a background task that logs
//!   server replies (registration notices and acks) and otherwise ignores
//!   them.
//! - [`mock::RecordingConnector`] stands in for the server in tests.

pub mod mock;
pub mod websocket;

pub use mock::RecordingConnector;
pub use websocket::{WsConnector, WsTransport};
