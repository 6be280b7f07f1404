//! Raw and classified key event types.
//!
//! # Raw vs classified (for beginners)
//!
//! The operating system reports every change of a key's state, including the
//! auto-repeat "hold" ticks a keyboard emits while a key stays pressed.  Those
//! are [`RawInputTransition`]s.  Only clean press and release edges are
//! interesting to the collection server; those become [`KeyEvent`]s after
//! passing through [`crate::classify`].

use serde::{Deserialize, Serialize};

/// The tri-state key state reported by the input subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// The key went down.
    Down,
    /// The key was released.
    Up,
    /// The key is being held and the keyboard emitted an auto-repeat tick.
    Hold,
}

impl KeyState {
    /// Converts the numeric key value used by Linux input devices.
    ///
    /// `0` is a release, `1` a press, `2` an auto-repeat.  Any other value is
    /// not a key state and yields `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keystream_core::KeyState;
    ///
    /// assert_eq!(KeyState::from_raw_value(1), Some(KeyState::Down));
    /// assert_eq!(KeyState::from_raw_value(7), None);
    /// ```
    pub fn from_raw_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Up),
            1 => Some(Self::Down),
            2 => Some(Self::Hold),
            _ => None,
        }
    }
}

/// A hardware-level key state change, consumed immediately by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInputTransition {
    /// Key identifier in the input source's naming scheme (e.g. `KEY_A`).
    ///
    /// Opaque to keystream; forwarded to the server unchanged.
    pub code: String,
    /// What happened to the key.
    pub state: KeyState,
}

impl RawInputTransition {
    /// Convenience constructor.
    pub fn new(code: impl Into<String>, state: KeyState) -> Self {
        Self {
            code: code.into(),
            state,
        }
    }
}

/// The kind of a classified event, as spelled on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Serialized as `"keydown"`.
    KeyDown,
    /// Serialized as `"keyup"`.
    KeyUp,
}

/// A press or release that passed classification, not yet sequenced.
///
/// Sequence number and device identity are attached later, when the event is
/// handed to the connection (see [`crate::protocol::EventMessage`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: EventKind,
    pub code: String,
    /// Milliseconds since the Unix epoch, captured at classification time.
    pub ts: u64,
}
