//! Placelapse replays the action log of a collaborative pixel canvas.
//!
//! Every action paints one axis-aligned rectangle in one color. The log can be rendered two ways:
//!
//! - [`render_composite`]: apply everything and save the final canvas as a still image
//! - [`render_timelapse`]: sample the canvas every N actions, stack a timestamp footer under it
//!   and stream the frames into a [`FrameSink`] (usually [`FfmpegSink`])
#![forbid(unsafe_code)]

mod foundation;

/// Draw actions and how they land on a canvas.
pub mod action;
/// Pixel canvas and its initial background.
pub mod canvas;
/// Frame sinks.
pub mod encode;
/// Timestamp footer.
pub mod footer;
pub mod progress;
/// Chronological action sources.
pub mod source;
/// Composite and timelapse entry modes.
pub mod session;

pub use crate::foundation::core::{FrameLayout, Rgb8, even_ceil};
pub use crate::foundation::error::{PlacelapseError, PlacelapseResult};

pub use crate::action::{ApplyOutcome, ColorSpec, DrawAction, Point, apply};
pub use crate::canvas::background::{Background, init_canvas};
pub use crate::canvas::{Canvas, PixelRect};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, SinkExit};
pub use crate::footer::FooterRenderer;
pub use crate::footer::font::{FontCandidate, FooterFont, default_font_candidates, resolve_font};
pub use crate::progress::{NoProgress, Progress};
pub use crate::session::composite::{CompositeOpts, composite_canvas, render_composite, save_still};
pub use crate::session::emitter::{EmitStats, EmitterState, FrameEmitter};
pub use crate::session::timelapse::{TimelapseOpts, TimelapseStats, render_timelapse};
pub use crate::session::{RunStats, replay};
pub use crate::source::{ActionSource, MongoSource, NdjsonSource, VecSource, open_source};
