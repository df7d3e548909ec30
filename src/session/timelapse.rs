use std::ops::ControlFlow;

use crate::canvas::background::{Background, init_canvas};
use crate::encode::sink::FrameSink;
use crate::footer::FooterRenderer;
use crate::footer::font::{DEFAULT_FONT_SIZE_PX, FontCandidate, default_font_candidates, resolve_font};
use crate::foundation::core::{FrameLayout, Rgb8};
use crate::foundation::error::{PlacelapseError, PlacelapseResult};
use crate::progress::Progress;
use crate::session::emitter::{EmitStats, EmitterState, FrameEmitter};
use crate::session::{RunStats, replay};
use crate::source::ActionSource;

/// Options for [`render_timelapse`].
#[derive(Clone, Debug)]
pub struct TimelapseOpts {
    /// Requested canvas width; rounded up to even.
    pub width: u32,
    /// Requested canvas height; rounded up to even.
    pub height: u32,
    pub footer_height: u32,
    pub fps: u32,
    /// Drawable actions between two frames.
    pub steps: u64,
    /// Length of the trailing still of the final frame.
    pub hold_seconds: u32,
    pub background: Background,
    /// Footer font candidates, tried in order.
    pub fonts: Vec<FontCandidate>,
    pub font_size_px: f32,
}

impl TimelapseOpts {
    /// Defaults: 60-px footer, 60 fps, a frame every 10 actions, 2-second hold, white background.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            footer_height: 60,
            fps: 60,
            steps: 10,
            hold_seconds: 2,
            background: Background::solid(Rgb8::WHITE),
            fonts: default_font_candidates(),
            font_size_px: DEFAULT_FONT_SIZE_PX,
        }
    }

    pub fn hold_frames(&self) -> u64 {
        u64::from(self.fps) * u64::from(self.hold_seconds)
    }
}

/// Result of a timelapse run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelapseStats {
    pub run: RunStats,
    pub layout: FrameLayout,
    pub emit: EmitStats,
}

impl TimelapseStats {
    /// `true` when the video sink failed before every frame was delivered.
    pub fn degraded(&self) -> bool {
        self.emit.degraded
    }
}

/// Replay the log, writing a frame every `opts.steps` drawable actions to `sink`, then the hold
/// sequence.
///
/// A sink that stops accepting frames ends the replay early but is not an error; the returned
/// stats are marked degraded instead. Source errors and sinks that fail to start are fatal.
#[tracing::instrument(
    skip(source, opts, sink, progress),
    fields(width = opts.width, height = opts.height, fps = opts.fps, steps = opts.steps)
)]
pub fn render_timelapse(
    source: &mut dyn ActionSource,
    opts: &TimelapseOpts,
    sink: &mut dyn FrameSink,
    progress: &mut dyn Progress,
) -> PlacelapseResult<TimelapseStats> {
    if opts.fps == 0 {
        return Err(PlacelapseError::validation("fps must be non-zero"));
    }
    if opts.steps == 0 {
        return Err(PlacelapseError::validation("steps must be at least 1"));
    }

    let total = source.count()?;
    if total == 0 {
        return Err(PlacelapseError::source("no actions found"));
    }
    tracing::info!(actions = total, "rendering timelapse");

    let layout = FrameLayout::normalized(opts.width, opts.height, opts.footer_height)?;
    let mut canvas = init_canvas(layout.width, layout.canvas_height, &opts.background)?;

    let font = resolve_font(&opts.fonts, opts.font_size_px);
    let footer = FooterRenderer::new(
        layout.width,
        layout.footer_rows(),
        layout.footer_height,
        opts.font_size_px,
        font,
    );

    let mut emitter = FrameEmitter::new(
        layout,
        opts.fps,
        opts.steps,
        opts.hold_frames(),
        footer,
        sink,
    )?;
    emitter.start()?;

    let replayed = replay(source, total, &mut canvas, progress, |canvas, action| {
        match emitter.on_drawable(canvas, action.create_at.as_ref())? {
            EmitterState::Draining => Ok(ControlFlow::Break(())),
            _ => Ok(ControlFlow::Continue(())),
        }
    });
    let run = match replayed {
        Ok(run) => run,
        Err(err) => {
            emitter.abort();
            return Err(err);
        }
    };

    let emit = emitter.finish(&canvas)?;
    if emit.degraded {
        tracing::warn!(
            frames = emit.frames_written,
            actions_read = run.actions_read,
            actions_total = run.actions_total,
            "timelapse incomplete: video sink failed mid-stream"
        );
    } else {
        tracing::info!(
            frames = emit.frames_written,
            hold_frames = emit.hold_frames_written,
            painted = run.painted,
            clipped = run.clipped,
            skipped = run.skipped,
            "timelapse complete"
        );
    }
    if !emit.sink_exit.success && !emit.degraded {
        tracing::warn!(code = ?emit.sink_exit.code, "video sink reported failure on close");
    }

    Ok(TimelapseStats { run, layout, emit })
}
