//! keystream device client entry point.
//!
//! Reads key presses from a local input device and streams them to a
//! collection server over WebSocket.
//!
//! # Usage
//!
//! ```text
//! keystream-device [OPTIONS]
//!
//! Options:
//!   --server <URL>                WebSocket URL of the collection server
//!   --device-id <ID>              Identity sent in every message
//!   --device-path <PATH>          Input event device to read
//!   --queue-capacity <N>          Events buffered between reader and sender
//!   --connect-attempts <N>        Connect attempts before giving up
//!   --connect-backoff-ms <MS>     Delay before the first connect retry
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence when both are present.
//!
//! | Variable                        | Default               |
//! |---------------------------------|-----------------------|
//! | `SERVER`                        | `ws://server-ip:4000` |
//! | `DEVICE_ID`                     | `raspi-01`            |
//! | `DEVICE_PATH`                   | `/dev/input/event0`   |
//! | `KEYSTREAM_QUEUE_CAPACITY`      | `64`                  |
//! | `KEYSTREAM_CONNECT_ATTEMPTS`    | `1`                   |
//! | `KEYSTREAM_CONNECT_BACKOFF_MS`  | `1000`                |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).  A fatal error is
//! printed once on stderr and the process exits non-zero.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keystream_core::DeviceIdentity;
use keystream_device::domain::config::{
    DEFAULT_DEVICE_ID, DEFAULT_DEVICE_PATH, DEFAULT_QUEUE_CAPACITY, DEFAULT_SERVER_URL,
};
use keystream_device::domain::{ConnectPolicy, DeviceConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// keystream device client.
///
/// Streams key press and release events from a local keyboard to a remote
/// collection server.
#[derive(Debug, Parser)]
#[command(
    name = "keystream-device",
    about = "Streams local key events to a keystream collection server",
    version
)]
struct Cli {
    /// WebSocket URL of the collection server (ws://host:port).
    #[arg(long, default_value = DEFAULT_SERVER_URL, env = "SERVER")]
    server: String,

    /// Identity declared in the handshake and carried by every event.
    #[arg(long, default_value = DEFAULT_DEVICE_ID, env = "DEVICE_ID")]
    device_id: String,

    /// Input event device node to read key transitions from.
    #[arg(long, default_value = DEFAULT_DEVICE_PATH, env = "DEVICE_PATH")]
    device_path: PathBuf,

    /// Classified events buffered between the input reader and the sender.
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, env = "KEYSTREAM_QUEUE_CAPACITY")]
    queue_capacity: usize,

    /// Connect attempts before giving up.  `1` means no retry.
    #[arg(long, default_value_t = 1, env = "KEYSTREAM_CONNECT_ATTEMPTS")]
    connect_attempts: u32,

    /// Delay before the first connect retry, in milliseconds; doubles per retry.
    #[arg(long, default_value_t = 1000, env = "KEYSTREAM_CONNECT_BACKOFF_MS")]
    connect_backoff_ms: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a validated [`DeviceConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if any value fails [`DeviceConfig::validate`].
    fn into_config(self) -> anyhow::Result<DeviceConfig> {
        let config = DeviceConfig {
            server_url: self.server,
            device_id: DeviceIdentity::new(self.device_id),
            device_path: self.device_path,
            queue_capacity: self.queue_capacity,
            connect_policy: ConnectPolicy {
                attempts: self.connect_attempts,
                backoff: Duration::from_millis(self.connect_backoff_ms),
            },
        };
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config()?;

    info!(
        "keystream device {} starting: server={}, input={}",
        config.device_id,
        config.server_url,
        config.device_path.display()
    );

    let events_sent = run(&config).await?;

    info!("keystream device stopped after {events_sent} events");
    Ok(())
}

#[cfg(target_os = "linux")]
async fn run(config: &DeviceConfig) -> anyhow::Result<u64> {
    use keystream_device::application::run as run_device;
    use keystream_device::infrastructure::input_source::EvdevInputSource;
    use keystream_device::infrastructure::network::WsConnector;

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    let summary = run_device(config, &WsConnector::new(), EvdevInputSource::open, shutdown)
        .await
        .context("device stream failed")?;
    Ok(summary.events_sent)
}

#[cfg(not(target_os = "linux"))]
async fn run(_config: &DeviceConfig) -> anyhow::Result<u64> {
    anyhow::bail!("keystream-device reads Linux input event devices and only runs on Linux")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
