use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::ops::ControlFlow;
use std::path::Path;

use anyhow::Context as _;
use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;

use crate::canvas::Canvas;
use crate::canvas::background::{Background, init_canvas};
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{PlacelapseError, PlacelapseResult};
use crate::progress::Progress;
use crate::session::{RunStats, replay};
use crate::source::ActionSource;

/// JPEG quality used for still output.
pub const JPEG_QUALITY: u8 = 95;

/// Options for [`render_composite`].
#[derive(Clone, Debug)]
pub struct CompositeOpts {
    pub width: u32,
    pub height: u32,
    pub background: Background,
}

/// Replay the whole log onto a fresh canvas and return it.
///
/// An empty source is an error: there is nothing to draw.
pub fn composite_canvas(
    source: &mut dyn ActionSource,
    opts: &CompositeOpts,
    progress: &mut dyn Progress,
) -> PlacelapseResult<(Canvas, RunStats)> {
    let total = source.count()?;
    if total == 0 {
        return Err(PlacelapseError::source("no actions found"));
    }
    tracing::info!(actions = total, "compositing action log");

    let mut canvas = init_canvas(opts.width, opts.height, &opts.background)?;
    let stats = replay(source, total, &mut canvas, progress, |_, _| {
        Ok(ControlFlow::Continue(()))
    })?;
    Ok((canvas, stats))
}

/// Replay the whole log and write the final canvas to `out_path`.
///
/// The image format follows the file extension.
#[tracing::instrument(skip(source, opts, progress), fields(width = opts.width, height = opts.height))]
pub fn render_composite(
    source: &mut dyn ActionSource,
    opts: &CompositeOpts,
    out_path: &Path,
    progress: &mut dyn Progress,
) -> PlacelapseResult<RunStats> {
    // Fail on an unusable extension before spending time on the replay.
    let format = still_format(out_path)?;
    let (canvas, stats) = composite_canvas(source, opts, progress)?;
    write_still(canvas, out_path, format)?;

    tracing::info!(
        path = %out_path.display(),
        painted = stats.painted,
        clipped = stats.clipped,
        skipped = stats.skipped,
        "composite saved"
    );
    Ok(stats)
}

/// Write `canvas` to `path` in the format implied by its extension.
pub fn save_still(canvas: Canvas, path: &Path) -> PlacelapseResult<()> {
    let format = still_format(path)?;
    write_still(canvas, path, format)
}

fn still_format(path: &Path) -> PlacelapseResult<ImageFormat> {
    ImageFormat::from_path(path).map_err(|_| {
        PlacelapseError::validation(format!(
            "cannot infer an image format from '{}' (use .png, .jpg, ...)",
            path.display()
        ))
    })
}

fn write_still(canvas: Canvas, path: &Path, format: ImageFormat) -> PlacelapseResult<()> {
    ensure_parent_dir(path)?;
    let img = canvas.into_image()?;

    if format == ImageFormat::Jpeg {
        let file = File::create(path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
            .encode_image(&img)
            .with_context(|| format!("failed to encode '{}'", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        return Ok(());
    }

    img.save_with_format(path, format)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(())
}
