//! Per-run sequence counter for event messages.
//!
//! # What is a sequence number? (for beginners)
//!
//! Every event message carries an integer that grows by exactly one per
//! event.  The server can use it to spot gaps (a dropped message) and to put
//! events back in order.  The device guarantees three things:
//!
//! - The first event of a run is numbered `0`.
//! - Numbers are handed out in the order events are transmitted.
//! - A number is never reused and never skipped for an attempted send.
//!
//! Numbers are not persisted: a restarted process begins at `0` again.
//!
//! # Ownership
//!
//! A single task owns the connection and therefore the counter, so `next`
//! takes `&mut self` and no atomics or locks are involved.

/// A monotonically increasing counter for event sequence numbers.
///
/// # Examples
///
/// ```rust
/// use keystream_core::Sequencer;
///
/// let mut seq = Sequencer::new();
/// assert_eq!(seq.next(), 0);
/// assert_eq!(seq.next(), 1);
/// assert_eq!(seq.issued(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Sequencer {
    next: u64,
}

impl Sequencer {
    /// Creates a counter whose first value is 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number and advances the counter.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        let seq = self.next;
        // Never wraps: 2^64 key events is unreachable.
        self.next += 1;
        seq
    }

    /// Returns how many numbers have been issued so far.
    ///
    /// Equivalent to the value the next call to [`Sequencer::next`] returns.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_starts_at_zero() {
        // Arrange
        let mut seq = Sequencer::new();

        // Act
        let first = seq.next();

        // Assert
        assert_eq!(first, 0);
    }

    #[test]
    fn test_sequencer_has_no_gaps() {
        // Arrange
        let mut seq = Sequencer::new();

        // Act
        let values: Vec<u64> = (0..100).map(|_| seq.next()).collect();

        // Assert: exactly 0..100, each step +1
        assert_eq!(values, (0..100).collect::<Vec<u64>>());
    }

    #[test]
    fn test_issued_does_not_advance() {
        let mut seq = Sequencer::new();
        seq.next();
        assert_eq!(seq.issued(), 1);
        assert_eq!(seq.issued(), 1);
        assert_eq!(seq.next(), 1);
    }

    #[test]
    fn test_default_creates_counter_at_zero() {
        let mut seq = Sequencer::default();
        assert_eq!(seq.issued(), 0);
        assert_eq!(seq.next(), 0);
    }
}
