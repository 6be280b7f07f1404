//! Domain layer for keystream-device.
//!
//! Holds the runtime configuration as a plain value.  No environment reads,
//! no I/O: the binary builds a [`DeviceConfig`] once from CLI arguments and
//! environment variables, then passes it explicitly to the session and the
//! input source.

pub mod config;

pub use config::{ConfigError, ConnectPolicy, DeviceConfig};
