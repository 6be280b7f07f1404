//! Application layer use cases for the device client.
//!
//! - **`session`** – The connection state machine: connect (with optional
//!   bounded retry), handshake, and per-event sequencing and transmission.
//!   The transport is injected through the [`session::Connector`] and
//!   [`session::Transport`] traits.
//!
//! - **`stream_events`** – The pipeline that runs the input source in its own
//!   task, classifies transitions, and feeds them in order to the session.
//!   The input device is injected through [`stream_events::InputSource`].

pub mod session;
pub mod stream_events;

pub use session::{connect_with_policy, Connector, DeviceSession, SessionState, Transport};
pub use stream_events::{run, stream_events, InputSource, RunSummary};
