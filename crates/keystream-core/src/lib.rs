//! # keystream-core
//!
//! Shared library for keystream containing the domain types, the key event
//! classifier, and the JSON wire protocol spoken to the collection server.
//!
//! This crate has zero dependencies on OS input APIs, async runtimes, or
//! network sockets.  Everything here is a plain function or value type.
//!
//! # Architecture overview
//!
//! A keystream device reads raw key transitions from a local keyboard and
//! forwards each press and release, in order, to a remote server:
//!
//! ```text
//! raw transition ──► classify ──► KeyEvent ──► Sequencer + EventMessage ──► JSON frame
//! ```
//!
//! - **`domain`** – Identity of the device and the raw/classified event types.
//! - **`classify`** – The pure mapping from a raw key state to `keydown` /
//!   `keyup`, discarding auto-repeat.
//! - **`protocol`** – The handshake and event messages, their JSON codec, and
//!   the per-run sequence counter.

pub mod classify;
pub mod domain;
pub mod protocol;

pub use classify::{classify, classify_at, now_millis};
pub use domain::{DeviceIdentity, EventKind, KeyEvent, KeyState, RawInputTransition};
pub use protocol::codec::{decode_reply, encode_event, encode_handshake, ProtocolError};
pub use protocol::messages::{EventMessage, Handshake, Role, ServerReply};
pub use protocol::sequence::Sequencer;
