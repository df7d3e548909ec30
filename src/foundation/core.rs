use crate::foundation::error::{PlacelapseError, PlacelapseResult};

/// Opaque 24-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Round `v` up to the next even number.
///
/// The timelapse output is chroma-subsampled (yuv420p), which requires even frame dimensions.
pub fn even_ceil(v: u32) -> u32 {
    if v.is_multiple_of(2) { v } else { v.saturating_add(1) }
}

/// Geometry of one timelapse frame: the drawing region stacked over the footer region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    /// Frame and canvas width in pixels.
    pub width: u32,
    /// Drawing region height in pixels.
    pub canvas_height: u32,
    /// Configured footer height, used to center footer text.
    pub footer_height: u32,
    /// Full frame height: drawing region plus every footer row.
    pub total_height: u32,
}

impl FrameLayout {
    /// Build a layout with every dimension the encoder sees forced to be even.
    ///
    /// Odd widths, canvas heights and total heights are bumped by one and logged.
    pub fn normalized(width: u32, canvas_height: u32, footer_height: u32) -> PlacelapseResult<Self> {
        if width == 0 || canvas_height == 0 {
            return Err(PlacelapseError::validation(
                "canvas width/height must be non-zero",
            ));
        }

        let even_width = even_ceil(width);
        if even_width != width {
            tracing::info!(from = width, to = even_width, "adjusted width (must be even for yuv420p)");
        }
        let even_height = even_ceil(canvas_height);
        if even_height != canvas_height {
            tracing::info!(
                from = canvas_height,
                to = even_height,
                "adjusted height (must be even for yuv420p)"
            );
        }

        let raw_total = even_height.saturating_add(footer_height);
        let total_height = even_ceil(raw_total);
        if total_height != raw_total {
            tracing::info!(
                from = raw_total,
                to = total_height,
                "adjusted video height (must be even for yuv420p)"
            );
        }

        Ok(Self {
            width: even_width,
            canvas_height: even_height,
            footer_height,
            total_height,
        })
    }

    /// Number of pixel rows below the drawing region.
    pub fn footer_rows(self) -> u32 {
        self.total_height - self.canvas_height
    }

    /// Byte length of one RGB24 frame.
    pub fn frame_len(self) -> usize {
        rgb_len(self.width, self.total_height)
    }
}

/// Byte length of a `width × height` RGB24 buffer.
pub fn rgb_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(3)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
