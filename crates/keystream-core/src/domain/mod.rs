//! Domain entities shared by every keystream component.
//!
//! The domain layer contains pure value types with no I/O.  They describe
//! *what* flows through the pipeline; the device crate decides *how* it is
//! read and transmitted.

pub mod event;
pub mod identity;

pub use event::{EventKind, KeyEvent, KeyState, RawInputTransition};
pub use identity::DeviceIdentity;
