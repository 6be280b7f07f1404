//! Error taxonomy of a streaming run.
//!
//! Every variant is fatal: the run stops, the connection closes, and the
//! binary exits non-zero after logging the error.  Nothing is retried except
//! the initial connect, and only when a [`crate::domain::ConnectPolicy`] asks
//! for more than one attempt.

use std::path::PathBuf;

use keystream_core::ProtocolError;
use thiserror::Error;

/// Boxed error used as the `source` of transport failures.
///
/// Keeps the taxonomy independent of the WebSocket library so mock
/// transports can report failures too.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that terminate a streaming run.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The input interface could not be opened (missing device, permission denied).
    #[error("input device {} unavailable: {source}", path.display())]
    DeviceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input interface failed after streaming started.
    #[error("input device read failed: {0}")]
    ReadError(#[source] std::io::Error),

    /// The transport to the server could not be established.
    #[error("failed to connect to {url}: {source}")]
    ConnectError {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Writing the handshake or an event to the transport failed.
    #[error("failed to send {what}: {source}")]
    SendError {
        what: &'static str,
        #[source]
        source: BoxError,
    },

    /// A message could not be serialized.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_unavailable_message_names_path() {
        let err = StreamError::DeviceUnavailable {
            path: PathBuf::from("/dev/input/event9"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/dev/input/event9"));
    }

    #[test]
    fn test_send_error_message_names_message_kind() {
        let err = StreamError::SendError {
            what: "handshake",
            source: "broken pipe".into(),
        };
        assert_eq!(err.to_string(), "failed to send handshake: broken pipe");
    }
}
