use std::collections::VecDeque;
use std::io::{BufReader, Read as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::ffmpeg::{
    is_ffmpeg_on_path, is_ffprobe_on_path, join_stderr_drain, spawn_stderr_drain,
};
use crate::foundation::core::{FrameRGB, Fps};
use crate::foundation::error::{EvError, EvResult};

/// Static properties of a frame source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SourceInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frame rate; `None` when the container does not declare one.
    pub fps: Option<f64>,
}

/// A forward-only stream of RGB frames.
pub trait FrameSource {
    /// Dimensions and frame rate.
    fn info(&self) -> SourceInfo;
    /// Next frame in presentation order, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> EvResult<Option<FrameRGB>>;
}

/// Frames held in memory.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    info: SourceInfo,
    frames: VecDeque<FrameRGB>,
}

impl InMemorySource {
    /// Wrap `frames`; every frame must match `info`'s dimensions.
    pub fn new(info: SourceInfo, frames: Vec<FrameRGB>) -> EvResult<Self> {
        if let Some(bad) = frames
            .iter()
            .find(|f| f.width != info.width || f.height != info.height)
        {
            return Err(EvError::validation(format!(
                "in-memory frame is {}x{}, source is {}x{}",
                bad.width, bad.height, info.width, info.height
            )));
        }
        Ok(Self {
            info,
            frames: frames.into(),
        })
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for InMemorySource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn next_frame(&mut self) -> EvResult<Option<FrameRGB>> {
        Ok(self.frames.pop_front())
    }
}

/// Video file decoded by a system `ffmpeg` child into raw `rgb24` frames.
///
/// The decoder process is started on open and killed on drop if the stream was not read to the
/// end.
pub struct FfmpegSource {
    path: PathBuf,
    info: SourceInfo,
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    frame_len: usize,
}

impl std::fmt::Debug for FfmpegSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSource")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("running", &self.child.is_some())
            .finish()
    }
}

impl FfmpegSource {
    /// Probe `path` and start decoding it.
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn open(path: &Path) -> EvResult<Self> {
        if !path.is_file() {
            return Err(EvError::not_found(format!(
                "video '{}' does not exist",
                path.display()
            )));
        }
        let info = probe_video(path)?;
        if !is_ffmpeg_on_path() {
            return Err(EvError::decode(
                "ffmpeg is required for video decoding, but was not found on PATH",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EvError::decode(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EvError::decode("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr_drain = child.stderr.take().map(spawn_stderr_drain);

        tracing::debug!(
            width = info.width,
            height = info.height,
            fps = ?info.fps,
            "video source opened"
        );
        Ok(Self {
            path: path.to_path_buf(),
            info,
            child: Some(child),
            stdout: Some(BufReader::new(stdout)),
            stderr_drain,
            frame_len: info.width as usize * info.height as usize * 3,
        })
    }

    /// Reap the decoder after its output ran dry.
    fn finish(&mut self) -> EvResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| EvError::decode(format!("failed to wait for ffmpeg decoder: {e}")))?;
        let stderr = join_stderr_drain(self.stderr_drain.take())?;
        if !status.success() {
            return Err(EvError::decode(format!(
                "ffmpeg decoder for '{}' exited with status {status}: {}",
                self.path.display(),
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn next_frame(&mut self) -> EvResult<Option<FrameRGB>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0;
        while filled < buf.len() {
            match stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(EvError::decode(format!(
                        "failed to read frame from ffmpeg: {e}"
                    )));
                }
            }
        }

        if filled < buf.len() {
            if filled > 0 {
                tracing::warn!(
                    path = %self.path.display(),
                    bytes = filled,
                    "dropping truncated trailing frame"
                );
            }
            self.finish()?;
            return Ok(None);
        }
        FrameRGB::from_raw(self.info.width, self.info.height, buf).map(Some)
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = join_stderr_drain(self.stderr_drain.take());
    }
}

/// Read width, height and frame rate of the first video stream with `ffprobe`.
pub fn probe_video(path: &Path) -> EvResult<SourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        avg_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        #[serde(default)]
        streams: Vec<ProbeStream>,
    }

    if !is_ffprobe_on_path() {
        return Err(EvError::decode(
            "ffprobe is required for video probing, but was not found on PATH",
        ));
    }
    let out = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output()
        .map_err(|e| EvError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(EvError::decode(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| EvError::decode(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            EvError::decode(format!("no video stream found in '{}'", path.display()))
        })?;
    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(EvError::decode(format!(
            "ffprobe reported no dimensions for '{}'",
            path.display()
        )));
    };

    let fps = [&stream.r_frame_rate, &stream.avg_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|r| parse_frame_rate(r));
    Ok(SourceInfo { width, height, fps })
}

/// Parse an ffprobe rate such as `30000/1001` or `25`; `0/0` and friends give `None`.
pub fn parse_frame_rate(s: &str) -> Option<f64> {
    let s = s.trim();
    let fps = match s.split_once('/') {
        Some((num, den)) => {
            Fps::from_ratio(num.trim().parse().ok()?, den.trim().parse().ok()?).ok()?
        }
        None => Fps::new(s.parse().ok()?).ok()?,
    };
    Some(fps.as_f64())
}

#[cfg(test)]
#[path = "../../tests/unit/compare/source.rs"]
mod tests;
