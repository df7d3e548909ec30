use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig, SinkExit};
use crate::foundation::error::{PlacelapseError, PlacelapseResult};

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output video path.
    pub out_path: PathBuf,
    /// ffmpeg video encoder name (`libx264`, `h264_nvenc`, `h264_videotoolbox`, ...).
    pub encoder: String,
    /// File receiving ffmpeg's stderr diagnostics.
    pub log_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// `libx264` into `out_path`, diagnostics into `ffmpeg_log.txt`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            encoder: "libx264".to_owned(),
            log_path: PathBuf::from("ffmpeg_log.txt"),
            overwrite: true,
        }
    }

    pub fn with_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = encoder.into();
        self
    }

    pub fn with_log_path(mut self, log_path: impl Into<PathBuf>) -> Self {
        self.log_path = log_path.into();
        self
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGB24 frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    cfg: Option<SinkConfig>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            cfg: None,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Input: headerless rgb24 frames on stdin. `-r` before `-i` sets the input rate.
        cmd.args([
            "-f",
            "rawvideo",
            "-vcodec",
            "rawvideo",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-pix_fmt",
            "rgb24",
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        // Output: yuv420p for broad player compatibility.
        cmd.args(["-an", "-c:v", &self.opts.encoder, "-pix_fmt", "yuv420p"]);
        cmd.args(["-preset", "medium"]);
        cmd.args(encoder_quality_args(&self.opts.encoder));
        cmd.arg(&self.opts.out_path);
        cmd
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> PlacelapseResult<()> {
        if self.child.is_some() {
            return Err(PlacelapseError::encode("ffmpeg sink already started"));
        }
        if cfg.fps == 0 {
            return Err(PlacelapseError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(PlacelapseError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(PlacelapseError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(PlacelapseError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(PlacelapseError::encode(
                "'ffmpeg' command not found; please install FFmpeg and make sure it is on PATH",
            ));
        }

        ensure_parent_dir(&self.opts.log_path)?;
        let log = File::create(&self.opts.log_path).map_err(|e| {
            PlacelapseError::encode(format!(
                "failed to create ffmpeg log '{}': {e}",
                self.opts.log_path.display()
            ))
        })?;

        let mut cmd = self.command(&cfg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::from(log));
        tracing::info!(command = ?cmd, "starting ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            PlacelapseError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let Some(stdin) = child.stdin.take() else {
            // Do not leave an orphaned encoder behind.
            let _ = child.kill();
            let _ = child.wait();
            return Err(PlacelapseError::encode("ffmpeg process stdin is not available"));
        };

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &[u8]) -> PlacelapseResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| PlacelapseError::encode("ffmpeg sink not started"))?;
        if frame.len() != cfg.frame_len() {
            return Err(PlacelapseError::validation(format!(
                "frame size mismatch: got {} bytes, expected {}",
                frame.len(),
                cfg.frame_len()
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PlacelapseError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(frame).map_err(|e| match e.kind() {
            ErrorKind::BrokenPipe => PlacelapseError::sink_closed(format!(
                "ffmpeg stopped reading frames: {e}"
            )),
            _ => PlacelapseError::encode(format!("failed to write frame to ffmpeg stdin: {e}")),
        })
    }

    fn end(&mut self) -> PlacelapseResult<SinkExit> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| PlacelapseError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            PlacelapseError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        self.cfg = None;

        if !status.success() {
            tracing::warn!(
                %status,
                log = %self.opts.log_path.display(),
                "ffmpeg exited unsuccessfully"
            );
        }
        Ok(SinkExit {
            success: status.success(),
            code: status.code(),
        })
    }

    fn diagnostics(&self) -> Option<&Path> {
        Some(&self.opts.log_path)
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.wait();
        }
    }
}

/// Per-encoder constant-quality flags.
pub fn encoder_quality_args(encoder: &str) -> &'static [&'static str] {
    if encoder == "libx264" {
        &["-crf", "23"]
    } else if encoder.contains("nvenc") {
        &["-cq", "23"]
    } else if encoder.contains("videotoolbox") {
        &["-q:v", "50"]
    } else {
        &[]
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> PlacelapseResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
