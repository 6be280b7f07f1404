//! keystream-device library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does keystream-device do? (for beginners)
//!
//! The *device* is a small machine (typically a Raspberry Pi) with a keyboard
//! or barcode wedge attached.  It watches the keyboard's raw input interface
//! and forwards every key press and release to a remote collection server:
//!
//! 1. Connects to the server over WebSocket and declares itself a device
//!    with a one-off handshake.
//! 2. Opens the local input interface (`/dev/input/eventN` on Linux).
//! 3. Classifies each raw transition as `keydown` / `keyup`, dropping
//!    auto-repeat ticks.
//! 4. Tags each event with the next sequence number and sends it as one
//!    JSON text frame.
//!
//! Any failure (device missing, read error, connect error, send error) ends
//! the run; there is no reconnection once streaming has started.

/// Domain layer: configuration.
pub mod domain;

/// Application layer: connection state machine and streaming pipeline.
pub mod application;

/// Infrastructure layer: input device and WebSocket adapters.
pub mod infrastructure;

/// Error taxonomy shared by every layer.
pub mod error;

pub use error::StreamError;
