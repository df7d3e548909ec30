use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::imageops::FilterType;

use crate::canvas::Canvas;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};
use crate::foundation::math::{mul_div255_u16, premultiply_rgba8_in_place};

/// Initial canvas contents.
#[derive(Clone, Debug, PartialEq)]
pub struct Background {
    /// Fill color, visible wherever the image is absent or transparent.
    pub color: Rgb8,
    /// Optional raster image stretched over the whole canvas.
    pub image: Option<PathBuf>,
}

impl Background {
    pub fn solid(color: Rgb8) -> Self {
        Self { color, image: None }
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }
}

/// Build the starting canvas.
///
/// The image layer is best-effort: a missing, undecodable or unresizable image is logged and the
/// canvas falls back to the flat background color.
pub fn init_canvas(width: u32, height: u32, bg: &Background) -> PlacelapseResult<Canvas> {
    let mut canvas = Canvas::filled(width, height, bg.color)?;

    let Some(path) = bg.image.as_deref() else {
        tracing::info!(color = ?bg.color, "no background image, using flat color");
        return Ok(canvas);
    };
    if !path.exists() {
        tracing::info!(
            path = %path.display(),
            color = ?bg.color,
            "background image not found, using flat color"
        );
        return Ok(canvas);
    }

    tracing::info!(path = %path.display(), "loading background image");
    match load_premul_layer(path, width, height) {
        Ok(layer) => {
            canvas = flatten_premul_over(&layer, bg.color, width, height)?;
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to load background image");
        }
    }
    Ok(canvas)
}

/// Decode `path` and resize it to exactly `width × height` as premultiplied RGBA8.
///
/// Resampling happens on premultiplied data so transparent pixels do not bleed their color into
/// opaque neighbours.
fn load_premul_layer(path: &Path, width: u32, height: u32) -> PlacelapseResult<image::RgbaImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read background image '{}'", path.display()))?;
    let decoded = image::load_from_memory(&bytes)
        .with_context(|| format!("decode background image '{}'", path.display()))?;

    let (src_w, src_h) = (decoded.width(), decoded.height());
    let mut rgba = decoded.to_rgba8();
    premultiply_rgba8_in_place(&mut rgba);

    if (src_w, src_h) == (width, height) {
        return Ok(rgba);
    }
    if src_w == 0 || src_h == 0 {
        return Err(PlacelapseError::validation("background image has no pixels"));
    }
    Ok(image::imageops::resize(
        &rgba,
        width,
        height,
        FilterType::Lanczos3,
    ))
}

/// Composite a premultiplied layer over a solid color, using its alpha as the blend mask.
fn flatten_premul_over(
    layer: &image::RgbaImage,
    bg: Rgb8,
    width: u32,
    height: u32,
) -> PlacelapseResult<Canvas> {
    if layer.dimensions() != (width, height) {
        return Err(PlacelapseError::validation(format!(
            "background layer size mismatch: got {}x{}, expected {}x{}",
            layer.width(),
            layer.height(),
            width,
            height
        )));
    }

    let bg = [u16::from(bg.r), u16::from(bg.g), u16::from(bg.b)];
    let mut out = Vec::with_capacity((width as usize) * (height as usize) * 3);
    for px in layer.pixels() {
        let [r, g, b, a] = px.0;
        let inv = 255 - u16::from(a);
        for (c, bg_c) in [r, g, b].into_iter().zip(bg) {
            let v = u16::from(c) + mul_div255_u16(bg_c, inv);
            out.push(v.min(255) as u8);
        }
    }
    Canvas::from_rgb8(width, height, out)
}
