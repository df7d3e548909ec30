//! Built-in 5×7 bitmap font, the last entry of every font candidate list.
//!
//! It only covers what a timestamp footer needs (digits, `-`, `:` and space). Other characters
//! draw as a hollow box.

use crate::footer::RgbRegion;

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;
const ADVANCE: u32 = GLYPH_W + 1;

// One byte per row, bit 4 is the leftmost column.
const DIGITS: [[u8; 7]; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
];
const DASH: [u8; 7] = [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00];
const COLON: [u8; 7] = [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00];
const SPACE: [u8; 7] = [0x00; 7];
const UNKNOWN: [u8; 7] = [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F];

fn glyph(ch: char) -> &'static [u8; 7] {
    match ch {
        '0'..='9' => &DIGITS[(ch as u8 - b'0') as usize],
        '-' => &DASH,
        ':' => &COLON,
        ' ' => &SPACE,
        _ => &UNKNOWN,
    }
}

/// Integer-scaled bitmap font.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapFont {
    scale: u32,
}

impl BitmapFont {
    /// Pick the integer scale whose glyph height is closest to `size_px` (at least 1).
    pub fn for_size(size_px: f32) -> Self {
        let scale = (size_px / GLYPH_H as f32).round().max(1.0) as u32;
        Self { scale }
    }

    pub fn scale(self) -> u32 {
        self.scale
    }

    /// Ink box of `text` in pixels.
    pub fn measure(self, text: &str) -> (u32, u32) {
        let n = text.chars().count() as u32;
        if n == 0 {
            return (0, 0);
        }
        let w = (n * ADVANCE - 1) * self.scale;
        (w, GLYPH_H * self.scale)
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    ///
    /// Pixels falling outside the region are dropped.
    pub(crate) fn draw(self, text: &str, x: i64, y: i64, color: [u8; 3], dst: &mut RgbRegion<'_>) {
        let s = i64::from(self.scale);
        for (i, ch) in text.chars().enumerate() {
            let gx = x + (i as i64) * i64::from(ADVANCE) * s;
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (0x10 >> col) == 0 {
                        continue;
                    }
                    let px = gx + i64::from(col) * s;
                    let py = y + (row as i64) * s;
                    dst.fill_square(px, py, s, color);
                }
            }
        }
    }
}
