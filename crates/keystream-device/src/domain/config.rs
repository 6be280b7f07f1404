//! Device configuration types.
//!
//! [`DeviceConfig`] is the single source of truth for all runtime settings.
//! It is constructed once at start-up (from CLI arguments and environment
//! variables, see `main.rs`) and handed explicitly to the components that
//! need it.  Nothing in the library reads the environment on its own.

use std::path::PathBuf;
use std::time::Duration;

use keystream_core::DeviceIdentity;
use thiserror::Error;
use tokio_tungstenite::tungstenite::http::uri::{Authority, Uri};

/// Placeholder server URL used when `SERVER` is not set.
pub const DEFAULT_SERVER_URL: &str = "ws://server-ip:4000";
/// Placeholder identity used when `DEVICE_ID` is not set.
pub const DEFAULT_DEVICE_ID: &str = "raspi-01";
/// Input interface opened when `DEVICE_PATH` is not set.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/input/event0";
/// Classified events buffered between the input task and the session task.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Upper bound for a single connect backoff, however many retries precede it.
const MAX_CONNECT_BACKOFF: Duration = Duration::from_secs(30);

/// Errors raised while validating a [`DeviceConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("server URL '{0}' must use the ws:// scheme and name a host")]
    InvalidServerUrl(String),
    #[error("device id must not be empty")]
    EmptyDeviceId,
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,
    #[error("connect attempts must be at least 1")]
    ZeroConnectAttempts,
}

/// Bounded retry policy for the initial connect.
///
/// Only establishing the transport is retried.  Once the handshake has been
/// sent, any failure ends the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPolicy {
    /// Total connect attempts, including the first.  `1` disables retry.
    pub attempts: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub backoff: Duration,
}

impl ConnectPolicy {
    /// A policy that tries exactly once.
    pub fn single_attempt() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::from_secs(1),
        }
    }

    /// Delay to wait before retry number `retry` (1-based).
    ///
    /// | retry | delay            |
    /// |-------|------------------|
    /// | 1     | `backoff`        |
    /// | 2     | `backoff * 2`    |
    /// | n     | `backoff * 2^(n-1)`, capped at 30 s |
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.backoff
            .checked_mul(factor)
            .unwrap_or(MAX_CONNECT_BACKOFF)
            .min(MAX_CONNECT_BACKOFF)
    }
}

impl Default for ConnectPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

/// All runtime configuration for a device.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// WebSocket endpoint of the collection server (`ws://host:port/path`).
    pub server_url: String,
    /// Identity declared in the handshake and stamped on every event.
    pub device_id: DeviceIdentity,
    /// Input interface to read key transitions from.
    pub device_path: PathBuf,
    /// Capacity of the FIFO between the input task and the session task.
    pub queue_capacity: usize,
    pub connect_policy: ConnectPolicy,
}

impl DeviceConfig {
    /// Checks the invariants the rest of the crate relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_ws_url(&self.server_url) {
            return Err(ConfigError::InvalidServerUrl(self.server_url.clone()));
        }
        if self.device_id.is_blank() {
            return Err(ConfigError::EmptyDeviceId);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.connect_policy.attempts == 0 {
            return Err(ConfigError::ZeroConnectAttempts);
        }
        Ok(())
    }
}

/// `true` if `url` parses as a URI with scheme `ws`, a non-empty host, and
/// either no port or a numeric one.
fn is_ws_url(url: &str) -> bool {
    let Ok(uri) = url.parse::<Uri>() else {
        return false;
    };
    let Some(authority) = uri.authority() else {
        return false;
    };
    uri.scheme_str() == Some("ws") && !authority.host().is_empty() && !has_bad_port(authority)
}

/// `Uri` accepts any text after the host's `:`; only a `u16` is usable.
fn has_bad_port(authority: &Authority) -> bool {
    let host_port = authority.as_str().rsplit('@').next().unwrap_or_default();
    match host_port.rfind(':') {
        // A colon inside `[...]` belongs to an IPv6 literal.
        Some(i) if !host_port[i..].contains(']') => authority.port_u16().is_none(),
        _ => false,
    }
}

impl Default for DeviceConfig {
    /// Returns the placeholder configuration.
    ///
    /// | Field           | Default               |
    /// |-----------------|-----------------------|
    /// | server_url      | `ws://server-ip:4000` |
    /// | device_id       | `raspi-01`            |
    /// | device_path     | `/dev/input/event0`   |
    /// | queue_capacity  | 64                    |
    /// | connect_policy  | one attempt           |
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            device_id: DeviceIdentity::new(DEFAULT_DEVICE_ID),
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            connect_policy: ConnectPolicy::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        // Arrange / Act
        let cfg = DeviceConfig::default();
        // Assert
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_default_placeholders() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.server_url, "ws://server-ip:4000");
        assert_eq!(cfg.device_id.as_str(), "raspi-01");
        assert_eq!(cfg.device_path, PathBuf::from("/dev/input/event0"));
    }

    #[test]
    fn test_default_policy_does_not_retry() {
        assert_eq!(DeviceConfig::default().connect_policy.attempts, 1);
    }

    #[test]
    fn test_url_with_path_and_query_is_valid() {
        let cfg = DeviceConfig {
            server_url: "ws://10.0.0.5:4000/ingest?x=1".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_ipv6_literal_with_port_is_valid() {
        let cfg = DeviceConfig {
            server_url: "ws://[::1]:4000".to_string(),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_non_ws_scheme_is_rejected() {
        for url in [
            "http://host:4000",
            "wss://host:4000",
            "host:4000",
            "ws://",
            "ws://:4000",
            "ws://exa mple.com:4000",
            "ws://host:notaport",
            "ws://user@:4000",
        ] {
            let cfg = DeviceConfig {
                server_url: url.to_string(),
                ..Default::default()
            };
            assert_eq!(
                cfg.validate(),
                Err(ConfigError::InvalidServerUrl(url.to_string())),
                "{url} must be rejected"
            );
        }
    }

    #[test]
    fn test_blank_device_id_is_rejected() {
        let cfg = DeviceConfig {
            device_id: DeviceIdentity::new("  "),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyDeviceId));
    }

    #[test]
    fn test_zero_queue_capacity_is_rejected() {
        let cfg = DeviceConfig {
            queue_capacity: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroQueueCapacity));
    }

    #[test]
    fn test_zero_connect_attempts_is_rejected() {
        let cfg = DeviceConfig {
            connect_policy: ConnectPolicy {
                attempts: 0,
                backoff: Duration::from_millis(10),
            },
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroConnectAttempts));
    }

    #[test]
    fn test_backoff_doubles_per_retry() {
        let policy = ConnectPolicy {
            attempts: 5,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(100));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(200));
        assert_eq!(policy.delay_before_retry(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = ConnectPolicy {
            attempts: 100,
            backoff: Duration::from_secs(10),
        };
        assert_eq!(policy.delay_before_retry(50), Duration::from_secs(30));
    }
}
