use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameGate, FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGB};
use crate::foundation::error::{EvError, EvResult};

/// Default codec identifier (MPEG-4 Part 2, as produced by the usual `mp4v` FourCC).
pub const DEFAULT_CODEC: &str = "mp4v";

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output video file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Codec identifier: a FourCC alias (`mp4v`, `avc1`, ...) or an ffmpeg encoder name.
    pub codec: String,
}

impl FfmpegSinkOpts {
    /// Create options for writing `out_path` with the default codec.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            codec: DEFAULT_CODEC.to_owned(),
        }
    }

    /// Replace the codec identifier.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }
}

/// Map a codec identifier to the ffmpeg encoder that implements it.
///
/// FourCC aliases are matched case-insensitively; anything else is passed through unchanged.
pub fn resolve_encoder(codec: &str) -> String {
    match codec.to_ascii_lowercase().as_str() {
        "mp4v" | "fmp4" | "divx" | "dx50" => "mpeg4".to_owned(),
        "avc1" | "h264" | "x264" => "libx264".to_owned(),
        "hvc1" | "hev1" | "h265" | "hevc" => "libx265".to_owned(),
        "xvid" => "libxvid".to_owned(),
        "mjpg" => "mjpeg".to_owned(),
        "vp80" => "libvpx".to_owned(),
        "vp09" => "libvpx-vp9".to_owned(),
        _ => codec.to_owned(),
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGB frames to its stdin.
///
/// Dropping an unfinished sink kills the encoder process and removes the partial output file.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    gate: FrameGate,
    // Set once the output file exists; cleared when `end` succeeds.
    partial_output: bool,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            gate: FrameGate::default(),
            partial_output: false,
        }
    }

    fn open_target(&self) -> EvResult<()> {
        let out = &self.opts.out_path;
        ensure_parent_dir(out).map_err(|e| EvError::sink_open(e.to_string()))?;
        if out.is_dir() {
            return Err(EvError::sink_open(format!(
                "output path '{}' is a directory",
                out.display()
            )));
        }
        if !self.opts.overwrite && out.exists() {
            return Err(EvError::sink_open(format!(
                "output file '{}' already exists",
                out.display()
            )));
        }
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(out)
            .map_err(|e| {
                EvError::sink_open(format!("cannot open '{}' for writing: {e}", out.display()))
            })?;
        Ok(())
    }
}

impl FrameSink for FfmpegSink {
    #[tracing::instrument(skip(self), fields(out = %self.opts.out_path.display()))]
    fn begin(&mut self, cfg: SinkConfig) -> EvResult<()> {
        self.gate.open(cfg)?;

        if !is_ffmpeg_on_path() {
            return Err(EvError::sink_open(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }
        let encoder = resolve_encoder(&self.opts.codec);
        if !is_encoder_available(&encoder) {
            return Err(EvError::sink_open(format!(
                "codec '{}' (ffmpeg encoder '{encoder}') is not supported by this ffmpeg build",
                self.opts.codec
            )));
        }
        self.open_target()?;
        self.partial_output = true;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        // `open_target` already applied the overwrite policy and created the file.
        cmd.arg("-y");

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}", cfg.fps.as_f64()),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            &encoder,
        ]);
        if encoder == "mpeg4" {
            cmd.args(["-q:v", "2"]);
        }
        // yuv420p needs even dimensions; odd sensor sizes get one padding row/column.
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            cmd.args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"]);
        }
        cmd.args(["-pix_fmt", "yuv420p"]);
        if has_mp4_family_extension(&self.opts.out_path) {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            EvError::sink_open(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EvError::sink_open("failed to open ffmpeg stdin (unexpected)"))?;
        self.stderr_drain = child.stderr.take().map(spawn_stderr_drain);
        self.stdin = Some(stdin);
        self.child = Some(child);

        tracing::debug!(encoder, width = cfg.width, height = cfg.height, "ffmpeg sink opened");
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGB) -> EvResult<()> {
        self.gate.check(idx, frame)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(EvError::encode("ffmpeg sink is already finalized"));
        };
        stdin.write_all(&frame.data).map_err(|e| {
            EvError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> EvResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| EvError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| EvError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = join_stderr_drain(self.stderr_drain.take())?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(EvError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.gate.close();
        self.partial_output = false;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = join_stderr_drain(self.stderr_drain.take());

        if self.partial_output {
            let out = &self.opts.out_path;
            match std::fs::remove_file(out) {
                Ok(()) => tracing::debug!(out = %out.display(), "partial output removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    out = %out.display(),
                    error = %e,
                    "cannot remove partial output"
                ),
            }
        }
    }
}

/// Read a child's stderr to the end on a helper thread so the pipe never fills up.
pub(crate) fn spawn_stderr_drain(
    mut stderr: std::process::ChildStderr,
) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

pub(crate) fn join_stderr_drain(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
) -> EvResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| EvError::encode("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| EvError::encode(format!("ffmpeg stderr read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn has_mp4_family_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "mp4" | "mov" | "m4v"))
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> EvResult<()> {
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
    tool_responds("ffmpeg")
}

/// Return `true` when `ffprobe` can be invoked from `PATH`.
pub fn is_ffprobe_on_path() -> bool {
    tool_responds("ffprobe")
}

fn tool_responds(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when the local `ffmpeg` lists `encoder` among its encoders.
pub fn is_encoder_available(encoder: &str) -> bool {
    let Ok(out) = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stderr(Stdio::null())
        .output()
    else {
        return false;
    };
    encoder_listed(&String::from_utf8_lossy(&out.stdout), encoder)
}

/// Whether an `ffmpeg -encoders` listing contains `encoder`.
///
/// Listing rows look like ` V....D mpeg4    MPEG-4 part 2`.
fn encoder_listed(listing: &str, encoder: &str) -> bool {
    listing
        .lines()
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let flags = cols.next()?;
            let name = cols.next()?;
            (flags.len() == 6).then_some(name)
        })
        .any(|name| name == encoder)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
