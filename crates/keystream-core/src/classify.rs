//! Event classifier: raw key transitions to press/release events.
//!
//! The mapping is deliberately narrow.  A `Down` becomes `keydown`, an `Up`
//! becomes `keyup`, and auto-repeat `Hold` ticks are dropped so the server
//! only ever sees edges.  Non-key input (pointer motion, sync markers) never
//! reaches this module; the input source filters it out.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::trace;

use crate::domain::{EventKind, KeyEvent, KeyState, RawInputTransition};

/// Classifies `transition` using an explicit timestamp.
///
/// Returns `None` for `Hold` transitions.
///
/// # Examples
///
/// ```rust
/// use keystream_core::{classify_at, EventKind, KeyState, RawInputTransition};
///
/// let down = RawInputTransition::new("KEY_A", KeyState::Down);
/// let event = classify_at(&down, 1_700_000_000_000).unwrap();
/// assert_eq!(event.kind, EventKind::KeyDown);
///
/// let hold = RawInputTransition::new("KEY_A", KeyState::Hold);
/// assert!(classify_at(&hold, 1_700_000_000_001).is_none());
/// ```
pub fn classify_at(transition: &RawInputTransition, ts: u64) -> Option<KeyEvent> {
    let kind = match transition.state {
        KeyState::Down => EventKind::KeyDown,
        KeyState::Up => EventKind::KeyUp,
        KeyState::Hold => {
            trace!(code = %transition.code, "discarding auto-repeat transition");
            return None;
        }
    };

    Some(KeyEvent {
        kind,
        code: transition.code.clone(),
        ts,
    })
}

/// Classifies `transition`, stamping it with the current wall-clock time.
pub fn classify(transition: &RawInputTransition) -> Option<KeyEvent> {
    classify_at(transition, now_millis())
}

/// Milliseconds since the Unix epoch.
///
/// A system clock set before 1970 yields `0` rather than an error.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
