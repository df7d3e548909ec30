//! Frame sinks.
//!
//! Sinks consume fixed-size RGB24 frames in write order. The timelapse driver only talks to the
//! [`sink::FrameSink`] trait, so the compositor has no dependency on a particular encoder.

/// `ffmpeg`-based sink (video output via system `ffmpeg`).
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
