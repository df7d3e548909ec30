//! The mutable drawing surface.
//!
//! A [`Canvas`] is a row-major RGB24 buffer with its origin at the top-left. Every write goes
//! through [`Canvas::clip_rect`], so out-of-range coordinates are dropped instead of erroring.

/// Background initialization (flat color plus optional alpha-blended image).
pub mod background;

use crate::foundation::core::{Rgb8, rgb_len};
use crate::foundation::error::{PlacelapseError, PlacelapseResult};

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)` already clipped to a canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }

    /// Number of pixels covered.
    pub fn area(self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }
}

/// Row-major RGB24 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Create a canvas filled with one color.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> PlacelapseResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlacelapseError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        let data = color.to_array().repeat((width as usize) * (height as usize));
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap existing RGB24 bytes.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> PlacelapseResult<Self> {
        if width == 0 || height == 0 {
            return Err(PlacelapseError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if data.len() != rgb_len(width, height) {
            return Err(PlacelapseError::validation(format!(
                "canvas data size mismatch: got {} bytes, expected {}",
                data.len(),
                rgb_len(width, height)
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB24 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgb8::new(self.data[i], self.data[i + 1], self.data[i + 2]))
    }

    /// Clip the rectangle at `(x, y)` with size `w × h` to the canvas bounds.
    ///
    /// The start corner is clamped to zero first and the end is derived from the clamped start,
    /// so a rectangle hanging off the top-left keeps its full size from the clamped corner.
    /// Returns `None` when nothing is left (off-canvas, zero or negative size).
    pub fn clip_rect(&self, x: i64, y: i64, w: i64, h: i64) -> Option<PixelRect> {
        let x_start = x.max(0);
        let y_start = y.max(0);
        let x_end = x_start.saturating_add(w).min(i64::from(self.width));
        let y_end = y_start.saturating_add(h).min(i64::from(self.height));

        if x_start < x_end && y_start < y_end {
            // Bounded by `width`/`height` above, so these fit in u32.
            Some(PixelRect {
                x0: x_start as u32,
                y0: y_start as u32,
                x1: x_end as u32,
                y1: y_end as u32,
            })
        } else {
            None
        }
    }

    /// Fill a clipped rectangle.
    ///
    /// Rows or columns outside the canvas are ignored.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgb8) {
        let x1 = rect.x1.min(self.width);
        let y1 = rect.y1.min(self.height);
        if rect.x0 >= x1 || rect.y0 >= y1 {
            return;
        }

        let rgb = color.to_array();
        for y in rect.y0..y1 {
            let start = self.offset(rect.x0, y);
            let end = self.offset(x1, y);
            for px in self.data[start..end].chunks_exact_mut(3) {
                px.copy_from_slice(&rgb);
            }
        }
    }

    /// Convert into an `image` buffer for still-image encoding.
    pub fn into_image(self) -> PlacelapseResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| PlacelapseError::validation("canvas buffer does not match its size"))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 3
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/canvas.rs"]
mod tests;
