//! Draw actions and the compositor that applies them to a [`Canvas`].
//!
//! The log may contain partial or legacy records. Validation happens here as explicit no-op
//! branches: a record missing its point, `x`, `y` or color is skipped, a rectangle that clips to
//! nothing is dropped, and neither case is an error.

/// Hex color parsing with black fallback.
pub mod color;
pub(crate) mod extjson;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, PixelRect};
use crate::foundation::core::Rgb8;

pub use color::ColorSpec;

/// Rectangle payload of a draw action. All fields are optional in the log.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default, deserialize_with = "extjson::opt_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "extjson::opt_number")]
    pub y: Option<f64>,
    /// Width, 1 when absent.
    #[serde(default, deserialize_with = "extjson::opt_number")]
    pub w: Option<f64>,
    /// Height, 1 when absent.
    #[serde(default, deserialize_with = "extjson::opt_number")]
    pub h: Option<f64>,
    #[serde(default)]
    pub c: Option<ColorSpec>,
}

/// One rectangle-paint event from the action log.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawAction {
    #[serde(default)]
    pub point: Option<Point>,
    #[serde(default, deserialize_with = "extjson::opt_datetime")]
    pub create_at: Option<DateTime<Utc>>,
}

impl DrawAction {
    /// A fully specified rectangle action.
    pub fn rect(x: i64, y: i64, w: i64, h: i64, color: &str) -> Self {
        Self {
            point: Some(Point {
                x: Some(x as f64),
                y: Some(y as f64),
                w: Some(w as f64),
                h: Some(h as f64),
                c: Some(ColorSpec::hex(color)),
            }),
            create_at: None,
        }
    }

    pub fn at(mut self, ts: DateTime<Utc>) -> Self {
        self.create_at = Some(ts);
        self
    }

    /// Resolve the requested rectangle and color, or `None` if required fields are missing.
    pub fn resolve(&self) -> Option<ResolvedRect> {
        let point = self.point.as_ref()?;
        let x = point.x?;
        let y = point.y?;
        let color = point.c.as_ref()?;

        Some(ResolvedRect {
            x: floor_to_i64(x),
            y: floor_to_i64(y),
            w: point.w.map_or(1, floor_to_i64),
            h: point.h.map_or(1, floor_to_i64),
            color: color.resolve(),
        })
    }
}

/// Integer rectangle request before clipping. `w`/`h` may be zero or negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedRect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
    pub color: Rgb8,
}

/// What [`apply`] did with one action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The clipped rectangle was filled.
    Painted(PixelRect),
    /// Valid action whose rectangle lies entirely off-canvas or has no area.
    Clipped,
    /// Missing point, `x`, `y` or color.
    Skipped,
}

impl ApplyOutcome {
    /// `true` for actions that count toward the frame cadence.
    pub fn is_drawable(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Apply one action to the canvas in place.
///
/// Actions must be applied in ascending chronological order: overlapping rectangles are
/// last-write-wins.
pub fn apply(canvas: &mut Canvas, action: &DrawAction) -> ApplyOutcome {
    let Some(req) = action.resolve() else {
        return ApplyOutcome::Skipped;
    };
    let Some(rect) = canvas.clip_rect(req.x, req.y, req.w, req.h) else {
        return ApplyOutcome::Clipped;
    };
    canvas.fill_rect(rect, req.color);
    ApplyOutcome::Painted(rect)
}

// `as` saturates values beyond the i64 range.
fn floor_to_i64(v: f64) -> i64 {
    v.floor() as i64
}
