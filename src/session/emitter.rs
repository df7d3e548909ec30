use chrono::{DateTime, Utc};

use crate::canvas::Canvas;
use crate::encode::sink::{FrameSink, SinkConfig, SinkExit};
use crate::footer::FooterRenderer;
use crate::foundation::core::FrameLayout;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};

/// Lifecycle of a [`FrameEmitter`].
///
/// `Idle → Streaming → (Draining) → Closed`. `Draining` is entered when the sink stops
/// accepting frames; no further frames are produced from the action stream after that.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitterState {
    Idle,
    Streaming,
    Draining,
    Closed,
}

/// Frame counters and the sink's final status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmitStats {
    /// Frames written on the sampling cadence.
    pub frames_written: u64,
    /// Trailing copies of the final frame that were written.
    pub hold_frames_written: u64,
    /// `true` when the sink failed mid-stream.
    pub degraded: bool,
    pub sink_exit: SinkExit,
}

/// Samples canvas snapshots on a fixed cadence and writes them, with the footer, to a sink.
pub struct FrameEmitter<'s> {
    state: EmitterState,
    layout: FrameLayout,
    fps: u32,
    step: u64,
    hold_frames: u64,
    footer: FooterRenderer,
    sink: &'s mut dyn FrameSink,
    frame: Vec<u8>,
    drawn: u64,
    frames_written: u64,
    hold_written: u64,
    degraded: bool,
}

impl<'s> FrameEmitter<'s> {
    /// `step` is the number of drawable actions between frames; `hold_frames` copies of the
    /// final frame are appended at the end.
    pub fn new(
        layout: FrameLayout,
        fps: u32,
        step: u64,
        hold_frames: u64,
        footer: FooterRenderer,
        sink: &'s mut dyn FrameSink,
    ) -> PlacelapseResult<Self> {
        if step == 0 {
            return Err(PlacelapseError::validation("frame step must be at least 1"));
        }
        if fps == 0 {
            return Err(PlacelapseError::validation("fps must be non-zero"));
        }
        if footer.width() != layout.width || footer.rows() != layout.footer_rows() {
            return Err(PlacelapseError::validation(format!(
                "footer is {}x{}, frame layout expects {}x{}",
                footer.width(),
                footer.rows(),
                layout.width,
                layout.footer_rows()
            )));
        }

        Ok(Self {
            state: EmitterState::Idle,
            layout,
            fps,
            step,
            hold_frames,
            footer,
            sink,
            frame: vec![0u8; layout.frame_len()],
            drawn: 0,
            frames_written: 0,
            hold_written: 0,
            degraded: false,
        })
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn footer(&self) -> &FooterRenderer {
        &self.footer
    }

    /// Start the sink. A sink that cannot start is fatal.
    pub fn start(&mut self) -> PlacelapseResult<()> {
        if self.state != EmitterState::Idle {
            return Err(PlacelapseError::encode("frame emitter already started"));
        }
        self.sink.begin(SinkConfig {
            width: self.layout.width,
            height: self.layout.total_height,
            fps: self.fps,
        })?;
        self.state = EmitterState::Streaming;
        Ok(())
    }

    /// Record one drawable action that was just applied to `canvas`.
    ///
    /// Every `step`-th call writes a frame. When the action carries a timestamp the footer is
    /// redrawn first; otherwise the previous footer is reused. A sink that stopped reading moves
    /// the emitter to [`EmitterState::Draining`]; any other write error is returned.
    pub fn on_drawable(
        &mut self,
        canvas: &Canvas,
        ts: Option<&DateTime<Utc>>,
    ) -> PlacelapseResult<EmitterState> {
        match self.state {
            EmitterState::Streaming => {}
            EmitterState::Draining => return Ok(EmitterState::Draining),
            EmitterState::Idle | EmitterState::Closed => {
                return Err(PlacelapseError::encode(format!(
                    "frame emitter is {:?}, cannot accept actions",
                    self.state
                )));
            }
        }

        self.drawn += 1;
        if !self.drawn.is_multiple_of(self.step) {
            return Ok(self.state);
        }

        if let Some(ts) = ts {
            self.footer.render(ts);
        }
        self.compose(canvas)?;
        match self.sink.push_frame(&self.frame) {
            Ok(()) => self.frames_written += 1,
            Err(err) if err.is_sink_closed() => {
                match self.sink.diagnostics() {
                    Some(log) => tracing::warn!(
                        error = %err,
                        frames = self.frames_written,
                        log = %log.display(),
                        "video sink stopped accepting frames; see the encoder log"
                    ),
                    None => tracing::warn!(
                        error = %err,
                        frames = self.frames_written,
                        "video sink stopped accepting frames"
                    ),
                }
                self.degraded = true;
                self.state = EmitterState::Draining;
            }
            Err(err) => return Err(err),
        }
        Ok(self.state)
    }

    /// Append the hold sequence built from the final `canvas`, then end the sink.
    ///
    /// Hold frames are best effort: the first failed write stops the sequence. The emitter is
    /// `Closed` afterwards even if ending the sink fails.
    pub fn finish(&mut self, canvas: &Canvas) -> PlacelapseResult<EmitStats> {
        match self.state {
            EmitterState::Streaming | EmitterState::Draining => {}
            EmitterState::Idle | EmitterState::Closed => {
                return Err(PlacelapseError::encode(format!(
                    "frame emitter is {:?}, cannot finish",
                    self.state
                )));
            }
        }

        let composed = self.compose(canvas);
        if let Err(err) = composed {
            self.abort();
            return Err(err);
        }
        for _ in 0..self.hold_frames {
            if let Err(err) = self.sink.push_frame(&self.frame) {
                tracing::debug!(error = %err, "hold frame not written");
                if self.state == EmitterState::Streaming {
                    self.degraded = true;
                }
                break;
            }
            self.hold_written += 1;
        }

        self.state = EmitterState::Closed;
        let sink_exit = self.sink.end()?;
        Ok(EmitStats {
            frames_written: self.frames_written,
            hold_frames_written: self.hold_written,
            degraded: self.degraded,
            sink_exit,
        })
    }

    /// End the sink without writing anything else. Used when the run fails mid-stream.
    pub fn abort(&mut self) {
        if matches!(self.state, EmitterState::Streaming | EmitterState::Draining) {
            if let Err(err) = self.sink.end() {
                tracing::debug!(error = %err, "sink did not close cleanly");
            }
        }
        self.state = EmitterState::Closed;
    }

    fn compose(&mut self, canvas: &Canvas) -> PlacelapseResult<()> {
        if canvas.width() != self.layout.width || canvas.height() != self.layout.canvas_height {
            return Err(PlacelapseError::validation(format!(
                "canvas is {}x{}, frame layout expects {}x{}",
                canvas.width(),
                canvas.height(),
                self.layout.width,
                self.layout.canvas_height
            )));
        }
        let split = canvas.as_bytes().len();
        self.frame[..split].copy_from_slice(canvas.as_bytes());
        self.frame[split..].copy_from_slice(self.footer.pixels());
        Ok(())
    }
}
