//! Linux evdev input source.
//!
//! Reads `struct input_event` records from `/dev/input/eventN`.  Each record
//! has a type (`EV_KEY`, `EV_REL`, `EV_SYN`, …), a code, and a value.  Only
//! `EV_KEY` records are key transitions; for those the value is `0` (up),
//! `1` (down), or `2` (auto-repeat).
//!
//! The process needs read access to the device node, usually via membership
//! of the `input` group or running as root.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use evdev::{Device, EventStream, InputEvent, InputEventKind, Key};
use keystream_core::{KeyState, RawInputTransition};
use tracing::{info, trace, warn};

use crate::application::stream_events::InputSource;
use crate::error::StreamError;

/// An [`InputSource`] backed by a Linux input event device.
pub struct EvdevInputSource {
    path: PathBuf,
    events: EventStream,
}

impl EvdevInputSource {
    /// Opens the device at `path` for asynchronous reading.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::DeviceUnavailable`] if the node does not exist,
    /// is not an input device, or cannot be read.
    pub fn open(path: &Path) -> Result<Self, StreamError> {
        let unavailable = |source| StreamError::DeviceUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let device = Device::open(path).map_err(unavailable)?;
        info!(
            "opened input device {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed")
        );
        let events = device.into_event_stream().map_err(unavailable)?;

        Ok(Self {
            path: path.to_path_buf(),
            events,
        })
    }
}

#[async_trait]
impl InputSource for EvdevInputSource {
    async fn next_transition(&mut self) -> Result<RawInputTransition, StreamError> {
        loop {
            let event = self.events.next_event().await.map_err(|e| {
                warn!("reading {} failed: {e}", self.path.display());
                StreamError::ReadError(e)
            })?;
            if let Some(transition) = transition_from_event(&event) {
                return Ok(transition);
            }
        }
    }
}

/// Converts one evdev record into a key transition.
///
/// Returns `None` for non-key records and for key records whose value is not
/// a known key state.  Key codes are rendered with the kernel names
/// (`KEY_A`, `KEY_LEFTSHIFT`, `BTN_LEFT`, …); unnamed codes become `KEY_<n>`.
pub fn transition_from_event(event: &InputEvent) -> Option<RawInputTransition> {
    let InputEventKind::Key(key) = event.kind() else {
        trace!("ignoring non-key event {:?}", event.event_type());
        return None;
    };
    let state = KeyState::from_raw_value(event.value())?;
    Some(RawInputTransition::new(key_name(key), state))
}

/// Kernel name of `key`, or `KEY_<code>` for codes evdev has no name for.
fn key_name(key: Key) -> String {
    let name = format!("{key:?}");
    match name.parse::<Key>() {
        Ok(parsed) if parsed == key => name,
        _ => format!("KEY_{}", key.code()),
    }
}
