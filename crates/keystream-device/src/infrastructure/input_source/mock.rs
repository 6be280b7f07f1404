//! Mock input source for unit and integration testing.
//!
//! Replays a fixed list of [`RawInputTransition`]s without any device node,
//! then either waits forever (like an idle keyboard) or fails (like an
//! unplugged one).

use std::collections::VecDeque;

use async_trait::async_trait;
use keystream_core::RawInputTransition;

use crate::application::stream_events::InputSource;
use crate::error::StreamError;

/// What happens once the script is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptEnd {
    /// Never yield again.
    Idle,
    /// Fail with a read error.
    Fail,
}

/// A scripted [`InputSource`].
pub struct ScriptedInputSource {
    script: VecDeque<RawInputTransition>,
    end: ScriptEnd,
}

impl ScriptedInputSource {
    /// Creates a source that yields `script` in order, then idles forever.
    pub fn new(script: impl IntoIterator<Item = RawInputTransition>) -> Self {
        Self {
            script: script.into_iter().collect(),
            end: ScriptEnd::Idle,
        }
    }

    /// Fails with [`StreamError::ReadError`] once the script is exhausted.
    pub fn then_fail(mut self) -> Self {
        self.end = ScriptEnd::Fail;
        self
    }
}

#[async_trait]
impl InputSource for ScriptedInputSource {
    async fn next_transition(&mut self) -> Result<RawInputTransition, StreamError> {
        if let Some(next) = self.script.pop_front() {
            return Ok(next);
        }
        match self.end {
            ScriptEnd::Idle => std::future::pending().await,
            ScriptEnd::Fail => Err(StreamError::ReadError(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted device disconnected",
            ))),
        }
    }
}
