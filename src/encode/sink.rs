use std::path::Path;

use crate::foundation::core::rgb_len;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};

/// Raw-video input contract handed to a [`FrameSink`] before any frame is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Declared frames-per-second.
    pub fps: u32,
}

impl SinkConfig {
    /// Byte length of one RGB24 frame.
    pub fn frame_len(&self) -> usize {
        rgb_len(self.width, self.height)
    }
}

/// How a sink finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkExit {
    pub success: bool,
    /// Process exit code, if the sink was a process that exited normally.
    pub code: Option<i32>,
}

impl SinkExit {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }
}

/// Byte sink for fixed-size RGB24 frames (24-bit interleaved, row-major, no header).
///
/// Lifecycle: `begin` once, `push_frame` any number of times, `end` once. A write that fails
/// because the consumer went away must be reported as [`PlacelapseError::SinkClosed`].
pub trait FrameSink {
    /// Start the sink.
    fn begin(&mut self, cfg: SinkConfig) -> PlacelapseResult<()>;
    /// Write one full frame. May block while the consumer catches up.
    fn push_frame(&mut self, frame: &[u8]) -> PlacelapseResult<()>;
    /// Close the write side and wait for the consumer to finish.
    fn end(&mut self) -> PlacelapseResult<SinkExit>;

    /// Where the consumer writes its own diagnostics, if anywhere.
    fn diagnostics(&self) -> Option<&Path> {
        None
    }
}

/// In-memory sink for tests and debugging.
///
/// Can simulate a consumer that dies after a given number of frames.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Vec<u8>>,
    fail_after: Option<usize>,
    rejected: usize,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `frames` frames, then fail every write as if the reader had closed the pipe.
    pub fn failing_after(frames: usize) -> Self {
        Self {
            fail_after: Some(frames),
            ..Self::default()
        }
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames accepted so far, in write order.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Writes refused after the simulated failure.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PlacelapseResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.rejected = 0;
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &[u8]) -> PlacelapseResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| PlacelapseError::encode("in-memory sink not started"))?;
        if frame.len() != cfg.frame_len() {
            return Err(PlacelapseError::validation(format!(
                "frame size mismatch: got {} bytes, expected {}",
                frame.len(),
                cfg.frame_len()
            )));
        }
        if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
            self.rejected += 1;
            return Err(PlacelapseError::sink_closed("simulated broken pipe"));
        }
        self.frames.push(frame.to_vec());
        Ok(())
    }

    fn end(&mut self) -> PlacelapseResult<SinkExit> {
        self.ended = true;
        if self.fail_after.is_some() && self.rejected > 0 {
            return Ok(SinkExit {
                success: false,
                code: Some(1),
            });
        }
        Ok(SinkExit::ok())
    }
}
