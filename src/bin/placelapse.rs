use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use placelapse::action::color::parse_hex;
use placelapse::{Background, FontCandidate, Rgb8};

/// Exit code for a timelapse whose encoder died before every frame was written.
const EXIT_DEGRADED: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "placelapse", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply every action and save the final canvas as a still image.
    Composite(CompositeArgs),
    /// Render a timelapse video with a timestamp footer (requires `ffmpeg` on PATH).
    Timelapse(TimelapseArgs),
}

#[derive(Args, Debug)]
struct CanvasArgs {
    /// Action source: `mongodb://` connection string, or path / `file://` URL of an NDJSON
    /// export. Falls back to `MONGO_URI`, then `MONGO_URI_CLIENT`.
    #[arg(long, env = "PLACE_ACTIONS")]
    source: Option<String>,

    /// Canvas width in pixels.
    #[arg(long, env = "CANVAS_WIDTH", default_value_t = 620)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, env = "CANVAS_HEIGHT", default_value_t = 300)]
    height: u32,

    /// Background color (`#RGB` or `#RRGGBB`).
    #[arg(long, default_value = "#ffffff", value_parser = parse_color)]
    bg_color: Rgb8,

    /// Background image stretched over the canvas; ignored when missing.
    #[arg(long, default_value = "public/map.png")]
    bg_image: PathBuf,

    /// Use the flat background color even if the image exists.
    #[arg(long)]
    no_bg_image: bool,

    /// Hide the progress bar.
    #[arg(long)]
    no_progress: bool,
}

impl CanvasArgs {
    fn background(&self) -> Background {
        let bg = Background::solid(self.bg_color);
        if self.no_bg_image {
            bg
        } else {
            bg.with_image(&self.bg_image)
        }
    }

    fn source_uri(&self) -> anyhow::Result<String> {
        self.source
            .clone()
            .or_else(|| std::env::var("MONGO_URI").ok())
            .or_else(|| std::env::var("MONGO_URI_CLIENT").ok())
            .filter(|s| !s.trim().is_empty())
            .context("no action source; pass --source or set PLACE_ACTIONS, MONGO_URI or MONGO_URI_CLIENT")
    }

    fn open_source(&self) -> anyhow::Result<Box<dyn placelapse::ActionSource>> {
        let uri = self.source_uri()?;
        placelapse::open_source(&uri).with_context(|| format!("open action source '{uri}'"))
    }
}

#[derive(Args, Debug)]
struct CompositeArgs {
    #[command(flatten)]
    canvas: CanvasArgs,

    /// Output image; the format follows the extension.
    #[arg(long, default_value = "final_composite.png")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct TimelapseArgs {
    #[command(flatten)]
    canvas: CanvasArgs,

    /// Output video path.
    #[arg(long, default_value = "timelapse.mp4")]
    output: PathBuf,

    /// Output frame rate.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Drawable actions between two frames.
    #[arg(long, default_value_t = 10)]
    steps: u64,

    /// ffmpeg video encoder (`libx264`, `h264_nvenc`, `h264_videotoolbox`, ...).
    #[arg(long, default_value = "libx264")]
    encoder: String,

    /// Height of the timestamp footer in pixels.
    #[arg(long, default_value_t = 60)]
    footer_height: u32,

    /// Seconds the final frame is held at the end.
    #[arg(long, default_value_t = 2)]
    hold_seconds: u32,

    /// File receiving ffmpeg's diagnostics.
    #[arg(long, default_value = "ffmpeg_log.txt")]
    encoder_log: PathBuf,

    /// Extra footer font files, tried before the built-in candidate list.
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Footer text size in pixels.
    #[arg(long, default_value_t = placelapse::footer::font::DEFAULT_FONT_SIZE_PX)]
    font_size: f32,
}

enum Outcome {
    Complete,
    Degraded,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Composite(args) => cmd_composite(args),
        Command::Timelapse(args) => cmd_timelapse(args),
    };

    match result {
        Ok(Outcome::Complete) => ExitCode::SUCCESS,
        Ok(Outcome::Degraded) => ExitCode::from(EXIT_DEGRADED),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn parse_color(s: &str) -> Result<Rgb8, String> {
    parse_hex(s).ok_or_else(|| format!("'{s}' is not a #RGB or #RRGGBB color"))
}

fn cmd_composite(args: CompositeArgs) -> anyhow::Result<Outcome> {
    let mut source = args.canvas.open_source()?;
    let opts = placelapse::CompositeOpts {
        width: args.canvas.width,
        height: args.canvas.height,
        background: args.canvas.background(),
    };
    let mut progress = BarProgress::new(!args.canvas.no_progress);

    placelapse::render_composite(source.as_mut(), &opts, &args.output, &mut progress)?;

    eprintln!("wrote {}", args.output.display());
    Ok(Outcome::Complete)
}

fn cmd_timelapse(args: TimelapseArgs) -> anyhow::Result<Outcome> {
    let mut source = args.canvas.open_source()?;

    let mut fonts: Vec<FontCandidate> = args.fonts.iter().map(FontCandidate::file).collect();
    fonts.extend(placelapse::default_font_candidates());

    let opts = placelapse::TimelapseOpts {
        width: args.canvas.width,
        height: args.canvas.height,
        footer_height: args.footer_height,
        fps: args.fps,
        steps: args.steps,
        hold_seconds: args.hold_seconds,
        background: args.canvas.background(),
        fonts,
        font_size_px: args.font_size,
    };

    let mut sink = placelapse::FfmpegSink::new(
        placelapse::FfmpegSinkOpts::new(&args.output)
            .with_encoder(&args.encoder)
            .with_log_path(&args.encoder_log),
    );
    let mut progress = BarProgress::new(!args.canvas.no_progress);

    let stats = placelapse::render_timelapse(source.as_mut(), &opts, &mut sink, &mut progress)?;

    if stats.degraded() {
        eprintln!(
            "wrote partial {} ({} frames); see {}",
            args.output.display(),
            stats.emit.frames_written,
            args.encoder_log.display()
        );
        return Ok(Outcome::Degraded);
    }
    if !stats.emit.sink_exit.success {
        anyhow::bail!(
            "ffmpeg exited with {:?}; see {}",
            stats.emit.sink_exit.code,
            args.encoder_log.display()
        );
    }

    eprintln!(
        "wrote {} ({} frames + {} hold)",
        args.output.display(),
        stats.emit.frames_written,
        stats.emit.hold_frames_written
    );
    Ok(Outcome::Complete)
}

/// Progress bar over the action stream. Hidden automatically when stderr is not a terminal.
struct BarProgress {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }
}

impl placelapse::Progress for BarProgress {
    fn start(&mut self, total: u64) {
        if !self.enabled {
            return;
        }
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner} replaying {pos}/{len} [{bar:40}] {percent}% [{elapsed_precise} < {eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        self.bar = Some(bar);
    }

    fn advance(&mut self, n: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(n);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
