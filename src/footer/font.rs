use std::path::{Path, PathBuf};

use crate::footer::RgbRegion;
use crate::footer::bitmap::BitmapFont;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};

/// Default footer text size in pixels.
pub const DEFAULT_FONT_SIZE_PX: f32 = 24.0;

/// One entry of the ordered font fallback table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontCandidate {
    /// TrueType/OpenType file; relative paths resolve against the working directory.
    File(PathBuf),
    /// The built-in bitmap font. Always loads.
    Builtin,
}

impl FontCandidate {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

/// DejaVu Sans, then Arial, in the usual per-OS locations, then the built-in font.
pub fn default_font_candidates() -> Vec<FontCandidate> {
    [
        "DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/local/share/fonts/DejaVuSans.ttf",
        "arial.ttf",
        "/usr/share/fonts/truetype/msttcorefonts/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .into_iter()
    .map(FontCandidate::file)
    .chain(std::iter::once(FontCandidate::Builtin))
    .collect()
}

/// Walk `candidates` in order and return the first font that loads.
///
/// Ends with the built-in bitmap font even when the table does not list it, so this never fails.
pub fn resolve_font(candidates: &[FontCandidate], size_px: f32) -> FooterFont {
    for candidate in candidates {
        match candidate {
            FontCandidate::File(path) => match OutlineFont::from_path(path, size_px) {
                Ok(font) => {
                    tracing::info!(font = %path.display(), "footer font resolved");
                    return FooterFont::Outline(Box::new(font));
                }
                Err(err) => {
                    tracing::debug!(font = %path.display(), error = %err, "font candidate unavailable");
                }
            },
            FontCandidate::Builtin => break,
        }
    }
    tracing::info!("footer font resolved to built-in bitmap font");
    FooterFont::Bitmap(BitmapFont::for_size(size_px))
}

/// Font used by the footer renderer.
pub enum FooterFont {
    Outline(Box<OutlineFont>),
    Bitmap(BitmapFont),
}

impl FooterFont {
    /// Text box size in whole pixels.
    pub fn measure(&mut self, text: &str) -> (u32, u32) {
        match self {
            Self::Outline(f) => f.measure(text),
            Self::Bitmap(f) => f.measure(text),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Bitmap(_))
    }

    pub(crate) fn draw(
        &mut self,
        text: &str,
        x: i64,
        y: i64,
        ink: [u8; 3],
        dst: &mut RgbRegion<'_>,
    ) -> PlacelapseResult<()> {
        match self {
            Self::Outline(f) => f.draw(text, x, y, ink, dst),
            Self::Bitmap(f) => {
                f.draw(text, x, y, ink, dst);
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for FooterFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline(o) => f.debug_tuple("Outline").field(&o.family).finish(),
            Self::Bitmap(b) => f.debug_tuple("Bitmap").field(b).finish(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrush;

/// Outline font shaped with Parley and rasterized with `vello_cpu`.
pub struct OutlineFont {
    family: String,
    size_px: f32,
    font: vello_cpu::peniko::FontData,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    last_ink: Option<(String, Option<InkBox>)>,
}

/// Bounds of the covered pixels of rendered text, relative to the layout origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InkBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl InkBox {
    pub fn width(&self) -> u32 {
        (self.x1 - self.x0).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.y1 - self.y0).max(0) as u32
    }
}

impl OutlineFont {
    pub fn from_path(path: &Path, size_px: f32) -> PlacelapseResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            PlacelapseError::validation(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes, size_px)
    }

    pub fn from_bytes(bytes: Vec<u8>, size_px: f32) -> PlacelapseResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PlacelapseError::validation(
                "font size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PlacelapseError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PlacelapseError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            family,
            size_px,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            last_ink: None,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    fn layout(&mut self, text: &str) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Size of the rendered ink box of `text`.
    ///
    /// Falls back to the layout line box when nothing is inked (blank text) or the text is too
    /// large to rasterize offscreen.
    pub fn measure(&mut self, text: &str) -> (u32, u32) {
        if let Some(ink) = self.ink_box(text) {
            return (ink.width(), ink.height());
        }
        let layout = self.layout(text);
        (
            layout.width().ceil().max(0.0) as u32,
            layout.height().ceil().max(0.0) as u32,
        )
    }

    /// Ink bounds of `text`, rasterized offscreen with a margin of one em on every side.
    pub fn ink_box(&mut self, text: &str) -> Option<InkBox> {
        if let Some((cached, ink)) = &self.last_ink
            && cached == text
        {
            return *ink;
        }

        let layout = self.layout(text);
        let pad = self.size_px.ceil() as i64;
        let w = u16::try_from(layout.width().ceil() as i64 + 2 * pad).ok()?;
        let h = u16::try_from(layout.height().ceil() as i64 + 2 * pad).ok()?;
        let pixmap = self.rasterize(&layout, w, h, pad as f64, pad as f64, [0, 0, 0]);

        let mut ink: Option<InkBox> = None;
        for (i, px) in pixmap.data_as_u8_slice().chunks_exact(4).enumerate() {
            if px[3] == 0 {
                continue;
            }
            let x = (i % usize::from(w)) as i64 - pad;
            let y = (i / usize::from(w)) as i64 - pad;
            ink = Some(match ink {
                None => InkBox {
                    x0: x,
                    y0: y,
                    x1: x + 1,
                    y1: y + 1,
                },
                Some(b) => InkBox {
                    x0: b.x0.min(x),
                    y0: b.y0.min(y),
                    x1: b.x1.max(x + 1),
                    y1: b.y1.max(y + 1),
                },
            });
        }

        self.last_ink = Some((text.to_owned(), ink));
        ink
    }

    /// Rasterize `text` with its ink box at `(x, y)` and blend it over `dst` in `ink`.
    pub(crate) fn draw(
        &mut self,
        text: &str,
        x: i64,
        y: i64,
        ink: [u8; 3],
        dst: &mut RgbRegion<'_>,
    ) -> PlacelapseResult<()> {
        let w: u16 = dst
            .width()
            .try_into()
            .map_err(|_| PlacelapseError::validation("footer width exceeds u16"))?;
        let h: u16 = dst
            .height()
            .try_into()
            .map_err(|_| PlacelapseError::validation("footer height exceeds u16"))?;

        let (ox, oy) = self.ink_box(text).map_or((0, 0), |b| (b.x0, b.y0));
        let layout = self.layout(text);
        let pixmap = self.rasterize(&layout, w, h, (x - ox) as f64, (y - oy) as f64, ink);

        dst.blend_premul_rgba(pixmap.data_as_u8_slice())
    }

    fn rasterize(
        &self,
        layout: &parley::Layout<TextBrush>,
        w: u16,
        h: u16,
        dx: f64,
        dy: f64,
        ink: [u8; 3],
    ) -> vello_cpu::Pixmap {
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((dx, dy)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            ink[0], ink[1], ink[2], 255,
        ));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                // Positioned glyphs carry absolute layout coordinates (run offset + baseline).
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        pixmap
    }
}
