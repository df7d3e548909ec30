//! Timestamp footer drawn below the canvas in timelapse frames.
//!
//! The footer is redrawn from scratch on every update: cleared to white, then the formatted
//! timestamp is centered in black.

/// Built-in bitmap font.
pub mod bitmap;
/// Font candidate table and outline font rendering.
pub mod font;

use chrono::{DateTime, Utc};

use crate::foundation::core::{Rgb8, rgb_len};
use crate::foundation::error::{PlacelapseError, PlacelapseResult};
use crate::foundation::math::mul_div255_u16;

use bitmap::BitmapFont;
use font::FooterFont;

const PAPER: Rgb8 = Rgb8::WHITE;
const INK: Rgb8 = Rgb8::BLACK;

/// Format a footer timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Mutable view over an RGB24 pixel region.
pub(crate) struct RgbRegion<'a> {
    data: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> RgbRegion<'a> {
    pub(crate) fn new(data: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(data.len(), rgb_len(width, height));
        Self {
            data,
            width,
            height,
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// Fill the `size × size` square at `(x, y)`, dropping out-of-range pixels.
    pub(crate) fn fill_square(&mut self, x: i64, y: i64, size: i64, color: [u8; 3]) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(size).min(i64::from(self.width));
        let y1 = y.saturating_add(size).min(i64::from(self.height));
        for yy in y0..y1 {
            for xx in x0..x1 {
                let i = ((yy as usize) * (self.width as usize) + (xx as usize)) * 3;
                self.data[i..i + 3].copy_from_slice(&color);
            }
        }
    }

    /// Source-over blend of a same-sized premultiplied RGBA8 buffer.
    pub(crate) fn blend_premul_rgba(&mut self, src: &[u8]) -> PlacelapseResult<()> {
        if src.len() / 4 != self.data.len() / 3 || !src.len().is_multiple_of(4) {
            return Err(PlacelapseError::validation(
                "blend_premul_rgba expects a same-sized rgba8 buffer",
            ));
        }
        for (d, s) in self.data.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
            let a = u16::from(s[3]);
            if a == 0 {
                continue;
            }
            let inv = 255 - a;
            for c in 0..3 {
                let v = u16::from(s[c]) + mul_div255_u16(u16::from(d[c]), inv);
                d[c] = v.min(255) as u8;
            }
        }
        Ok(())
    }
}

/// Renders timestamps into a `width × rows` RGB24 footer buffer.
#[derive(Debug)]
pub struct FooterRenderer {
    width: u32,
    rows: u32,
    footer_height: u32,
    size_px: f32,
    font: FooterFont,
    pixels: Vec<u8>,
}

impl FooterRenderer {
    /// `rows` is the number of pixel rows the footer occupies in the frame; `footer_height` is
    /// the configured height used for vertical centering (they differ when the frame height was
    /// rounded up to an even number).
    pub fn new(width: u32, rows: u32, footer_height: u32, size_px: f32, font: FooterFont) -> Self {
        let mut pixels = vec![0u8; rgb_len(width, rows)];
        fill_rgb(&mut pixels, PAPER);
        Self {
            width,
            rows,
            footer_height,
            size_px,
            font,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn font(&self) -> &FooterFont {
        &self.font
    }

    /// Current footer pixels (RGB24, row-major).
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Clear and draw `ts` centered.
    pub fn render(&mut self, ts: &DateTime<Utc>) {
        self.render_text(&format_timestamp(ts));
    }

    /// Clear and draw arbitrary text centered.
    pub fn render_text(&mut self, text: &str) {
        fill_rgb(&mut self.pixels, PAPER);
        if self.rows == 0 || self.width == 0 {
            return;
        }

        let (text_w, text_h) = self.font.measure(text);
        // Floor division keeps the left/top edge stable when text overflows the footer.
        let x = (i64::from(self.width) - i64::from(text_w)).div_euclid(2);
        let y = (i64::from(self.footer_height) - i64::from(text_h)).div_euclid(2);

        let mut region = RgbRegion::new(&mut self.pixels, self.width, self.rows);
        let Err(err) = self.font.draw(text, x, y, INK.to_array(), &mut region) else {
            return;
        };

        tracing::warn!(error = %err, "footer font failed to render, switching to built-in font");
        self.font = FooterFont::Bitmap(BitmapFont::for_size(self.size_px));
        self.render_text(text);
    }
}

fn fill_rgb(buf: &mut [u8], color: Rgb8) {
    let rgb = color.to_array();
    for px in buf.chunks_exact_mut(3) {
        px.copy_from_slice(&rgb);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn builtin(width: u32, rows: u32, footer_height: u32) -> FooterRenderer {
        FooterRenderer::new(
            width,
            rows,
            footer_height,
            font::DEFAULT_FONT_SIZE_PX,
            FooterFont::Bitmap(BitmapFont::for_size(font::DEFAULT_FONT_SIZE_PX)),
        )
    }

    fn ink_bbox(r: &FooterRenderer) -> Option<(u32, u32, u32, u32)> {
        let mut bbox: Option<(u32, u32, u32, u32)> = None;
        for y in 0..r.rows() {
            for x in 0..r.width() {
                let i = ((y * r.width() + x) * 3) as usize;
                if r.pixels()[i..i + 3] == [0, 0, 0] {
                    bbox = Some(match bbox {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        bbox
    }

    #[test]
    fn timestamp_format_is_fixed_width() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&ts), "2024-01-02 03:04:05");
    }

    #[test]
    fn new_footer_is_white() {
        let r = builtin(8, 4, 4);
        assert_eq!(r.pixels().len(), 8 * 4 * 3);
        assert!(r.pixels().iter().all(|&b| b == 255));
    }

    #[test]
    fn text_is_centered_with_floor_division() {
        let mut r = builtin(400, 60, 60);
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        r.render(&ts);

        let (text_w, text_h) = BitmapFont::for_size(24.0).measure(&format_timestamp(&ts));
        let want_x = (400 - i64::from(text_w)).div_euclid(2);
        let want_y = (60 - i64::from(text_h)).div_euclid(2);

        let (x0, y0, _, _) = ink_bbox(&r).expect("text was drawn");
        assert_eq!(i64::from(x0), want_x);
        assert_eq!(i64::from(y0), want_y);
    }

    fn system_outline_font() -> Option<FooterFont> {
        let installed: Vec<_> = font::default_font_candidates()
            .into_iter()
            .filter(|c| matches!(c, font::FontCandidate::File(p) if p.is_file()))
            .collect();
        let f = font::resolve_font(&installed, font::DEFAULT_FONT_SIZE_PX);
        (!f.is_builtin()).then_some(f)
    }

    fn non_white_bbox(r: &FooterRenderer) -> Option<(u32, u32, u32, u32)> {
        let mut bbox: Option<(u32, u32, u32, u32)> = None;
        for y in 0..r.rows() {
            for x in 0..r.width() {
                let i = ((y * r.width() + x) * 3) as usize;
                if r.pixels()[i..i + 3] != [255, 255, 255] {
                    bbox = Some(match bbox {
                        None => (x, y, x, y),
                        Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    });
                }
            }
        }
        bbox
    }

    #[test]
    fn outline_font_text_is_centered_on_its_ink() {
        let Some(mut font) = system_outline_font() else {
            eprintln!("no DejaVu Sans or Arial installed; skipping");
            return;
        };
        let text = "2024-01-02 03:04:05";
        let (text_w, text_h) = font.measure(text);
        assert!(text_w > 150, "measured {text_w}x{text_h}");

        let mut r = FooterRenderer::new(620, 60, 60, font::DEFAULT_FONT_SIZE_PX, font);
        r.render_text(text);
        let (x0, y0, x1, y1) = non_white_bbox(&r).expect("text was drawn");

        let ink_w = i64::from(x1 - x0 + 1);
        let ink_h = i64::from(y1 - y0 + 1);
        assert!((ink_w - i64::from(text_w)).abs() <= 2, "ink {ink_w} vs {text_w}");
        assert!((ink_h - i64::from(text_h)).abs() <= 2, "ink {ink_h} vs {text_h}");

        let (left, right) = (i64::from(x0), 619 - i64::from(x1));
        let (top, bottom) = (i64::from(y0), 59 - i64::from(y1));
        assert!((left - right).abs() <= 2, "margins {left}/{right}");
        assert!((top - bottom).abs() <= 2, "margins {top}/{bottom}");
    }

    #[test]
    fn outline_font_redraw_is_identical() {
        let Some(font) = system_outline_font() else {
            return;
        };
        let mut r = FooterRenderer::new(620, 60, 60, font::DEFAULT_FONT_SIZE_PX, font);
        r.render_text("2024-01-02 03:04:05");
        let first = r.pixels().to_vec();
        r.render_text("1999-12-31 23:59:59");
        r.render_text("2024-01-02 03:04:05");
        assert_eq!(r.pixels(), &first[..]);
    }

    #[test]
    fn redraw_clears_previous_text() {
        let mut r = builtin(400, 40, 40);
        r.render_text("8888888888");
        let wide = ink_bbox(&r).unwrap();
        r.render_text("1");
        let narrow = ink_bbox(&r).unwrap();
        assert!(narrow.2 - narrow.0 < wide.2 - wide.0);
        r.render_text("");
        assert_eq!(ink_bbox(&r), None);
    }

    #[test]
    fn extra_row_from_even_rounding_stays_white() {
        let mut r = builtin(300, 60, 59);
        r.render_text("0000");
        let (_, _, _, y1) = ink_bbox(&r).unwrap();
        assert!(y1 < 59);
    }

    #[test]
    fn overflowing_text_is_clipped() {
        let mut r = builtin(10, 6, 6);
        r.render_text("2024-01-02 03:04:05");
        assert_eq!(r.pixels().len(), 10 * 6 * 3);
    }

    #[test]
    fn zero_row_footer_is_a_noop() {
        let mut r = builtin(10, 0, 0);
        r.render_text("12");
        assert!(r.pixels().is_empty());
    }

    #[test]
    fn blend_premul_rgba_composites_over_existing_pixels() {
        let mut buf = vec![255u8; 2 * 3];
        let mut region = RgbRegion::new(&mut buf, 2, 1);
        let src = [0u8, 0, 0, 255, 0, 0, 0, 128];
        region.blend_premul_rgba(&src).unwrap();
        assert_eq!(&buf[..3], &[0, 0, 0]);
        assert_eq!(&buf[3..], &[127, 127, 127]);
    }
}
