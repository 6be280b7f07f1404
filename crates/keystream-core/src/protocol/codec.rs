//! JSON codec for keystream protocol messages.
//!
//! Wire format: one compact JSON object per WebSocket text frame.  Framing is
//! the transport's job, so encoded messages contain no trailing newline.

use thiserror::Error;

use crate::protocol::messages::{EventMessage, Handshake, ServerReply};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A message could not be serialized.
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A server frame was not valid JSON.
    #[error("malformed server reply: {0}")]
    Decode(#[source] serde_json::Error),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes the handshake into a text frame payload.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_handshake(msg: &Handshake) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|source| ProtocolError::Encode {
        what: "handshake",
        source,
    })
}

/// Encodes an event message into a text frame payload.
///
/// The sequence number is **not** assigned here – it must already be set
/// from a [`crate::protocol::Sequencer`].
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use keystream_core::{encode_event, DeviceIdentity, EventKind, EventMessage, KeyEvent};
///
/// let event = KeyEvent { kind: EventKind::KeyDown, code: "KEY_A".into(), ts: 5 };
/// let msg = EventMessage::new(&DeviceIdentity::new("d"), 0, event);
/// let text = encode_event(&msg).unwrap();
/// assert!(text.starts_with(r#"{"deviceId":"d","seq":0,"type":"keydown""#));
/// ```
pub fn encode_event(msg: &EventMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|source| ProtocolError::Encode {
        what: "event",
        source,
    })
}

/// Decodes a text frame received from the server.
///
/// # Errors
///
/// Returns [`ProtocolError::Decode`] if the frame is not JSON.  Valid JSON of
/// an unknown shape decodes as [`ServerReply::Other`].
pub fn decode_reply(text: &str) -> Result<ServerReply, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeviceIdentity, EventKind, KeyEvent};

    #[test]
    fn test_encode_handshake_is_single_line() {
        let text = encode_handshake(&Handshake::device(&DeviceIdentity::new("dev-A"))).unwrap();
        assert!(!text.contains('\n'));
        assert_eq!(text, r#"{"role":"device","deviceId":"dev-A"}"#);
    }

    #[test]
    fn test_encode_event_scenario_keydown() {
        // Arrange
        let id = DeviceIdentity::new("dev-A");
        let event = KeyEvent {
            kind: EventKind::KeyDown,
            code: "A".to_string(),
            ts: 1000,
        };

        // Act
        let text = encode_event(&EventMessage::new(&id, 0, event)).unwrap();

        // Assert
        assert_eq!(
            text,
            r#"{"deviceId":"dev-A","seq":0,"type":"keydown","code":"A","char":null,"ts":1000}"#
        );
    }

    #[test]
    fn test_decode_ack() {
        let reply = decode_reply(r#"{"ack":7,"serverTs":99}"#).unwrap();
        assert_eq!(
            reply,
            ServerReply::Ack {
                ack: Some(7),
                server_ts: 99
            }
        );
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode_reply("not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }
}
