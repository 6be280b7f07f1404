//! Infrastructure layer for the device client.
//!
//! Contains the OS- and network-facing adapters.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keystream_core`, but MUST NOT be imported by the `application` or
//! `domain` layers (tests excepted).
//!
//! # Sub-modules
//!
//! - **`input_source`** – `InputSource` implementations.  On Linux the evdev
//!   adapter reads `/dev/input/event*` asynchronously.  A scripted mock is
//!   provided for tests.
//!
//! - **`network`** – `Connector` / `Transport` implementations.  The
//!   WebSocket adapter speaks to the collection server; a recording mock
//!   captures frames in memory.

pub mod input_source;
pub mod network;
