//! JSON message types exchanged with the collection server.
//!
//! Every message is a single JSON object carried in one WebSocket text frame.
//! The device speaks first and speaks almost exclusively:
//!
//! ```text
//! Device → Server:  {"role":"device","deviceId":"raspi-01"}                  (once)
//! Device → Server:  {"deviceId":"raspi-01","seq":0,"type":"keydown",
//!                    "code":"KEY_A","char":null,"ts":1700000000000}          (per event)
//! Server → Device:  {"server":"ok","note":"registered as device",...}      (informational)
//! Server → Device:  {"ack":0,"serverTs":1700000000003}                      (informational)
//! ```
//!
//! Field order in the serialized output follows struct declaration order, so
//! the bytes on the wire match the layout above.

use serde::{Deserialize, Serialize};

use crate::domain::{DeviceIdentity, EventKind, KeyEvent};

// ── Device → Server ───────────────────────────────────────────────────────────

/// Role a connecting peer declares in its handshake.
///
/// Devices only ever declare [`Role::Device`]; the server treats any peer
/// that does not identify itself as a browser viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Device,
}

/// The identity declaration sent exactly once, immediately after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub role: Role,
    pub device_id: DeviceIdentity,
}

impl Handshake {
    /// Builds the handshake for a device.
    pub fn device(device_id: &DeviceIdentity) -> Self {
        Self {
            role: Role::Device,
            device_id: device_id.clone(),
        }
    }
}

/// One classified key event as transmitted to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMessage {
    pub device_id: DeviceIdentity,
    /// Per-run sequence number, starting at 0.
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub code: String,
    /// Reserved for decoded text.  Always `None`, serialized as `null`.
    #[serde(rename = "char")]
    pub text: Option<String>,
    /// Classification time, milliseconds since the Unix epoch.
    pub ts: u64,
}

impl EventMessage {
    /// Attaches identity and sequence number to a classified event.
    pub fn new(device_id: &DeviceIdentity, seq: u64, event: KeyEvent) -> Self {
        Self {
            device_id: device_id.clone(),
            seq,
            kind: event.kind,
            code: event.code,
            text: None,
            ts: event.ts,
        }
    }
}

// ── Server → Device ───────────────────────────────────────────────────────────

/// Replies the collection server may send back.
///
/// None of these are required by the device: no reply is awaited after the
/// handshake and acks do not gate further sends.  They are decoded only so the
/// device can log them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ServerReply {
    /// Confirmation that the handshake registered this peer as a device.
    Registered {
        server: String,
        #[serde(default)]
        note: Option<String>,
        #[serde(rename = "deviceId", default)]
        device_id: Option<String>,
    },
    /// Acknowledgement of an event message.
    Ack {
        /// Sequence number echoed back; `null` if the server could not read it.
        ack: Option<u64>,
        #[serde(rename = "serverTs")]
        server_ts: u64,
    },
    /// Any other JSON value.
    Other(serde_json::Value),
}
