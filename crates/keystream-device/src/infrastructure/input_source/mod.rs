//! Input source adapters.
//!
//! # Linux implementation
//!
//! [`linux::EvdevInputSource`] opens an input event device node and reads it
//! through evdev's tokio `EventStream`, so waiting for the next key is an
//! `.await` rather than a blocking syscall, and the input task can be
//! aborted while it waits.
//!
//! # Testability
//!
//! [`mock::ScriptedInputSource`] replays a fixed list of transitions without
//! any device node.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::EvdevInputSource;
pub use mock::ScriptedInputSource;
