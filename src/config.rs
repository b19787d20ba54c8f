//! Serializable job configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it changes. The CLI layers
//! explicit flags on top of a loaded file.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::compare::sync::EndMode;
use crate::encode::ffmpeg::DEFAULT_CODEC;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{EvError, EvResult};
use crate::render::compose::Palette;

/// Parameters of one event-to-video render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory holding the `.npz` event shards.
    pub events_dir: PathBuf,
    /// Optional capture timestamp file bounding the render range.
    pub timestamps: Option<PathBuf>,
    /// Output video path.
    pub out: PathBuf,
    /// Sensor width in pixels.
    pub sensor_width: u32,
    /// Sensor height in pixels.
    pub sensor_height: u32,
    /// Output frame rate.
    pub fps: f64,
    /// Decay time constant in milliseconds.
    pub tau_ms: f64,
    /// Upper bound on the number of frames.
    pub max_frames: Option<u64>,
    /// Background and polarity colors.
    pub palette: Palette,
    /// Codec identifier passed to the video sink.
    pub codec: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            events_dir: PathBuf::new(),
            timestamps: None,
            out: PathBuf::new(),
            sensor_width: 320,
            sensor_height: 256,
            fps: 120.0,
            tau_ms: 30.0,
            max_frames: None,
            palette: Palette::default(),
            codec: DEFAULT_CODEC.to_owned(),
        }
    }
}

impl RenderConfig {
    /// Validated sensor canvas.
    pub fn canvas(&self) -> EvResult<Canvas> {
        Canvas::new(self.sensor_width, self.sensor_height)
    }

    /// Validated frame rate.
    pub fn fps(&self) -> EvResult<Fps> {
        Fps::new(self.fps)
    }

    /// Check scalar parameters without touching the filesystem.
    pub fn validate(&self) -> EvResult<()> {
        self.canvas()?;
        self.fps()?;
        if !self.tau_ms.is_finite() || self.tau_ms <= 0.0 {
            return Err(EvError::validation(format!(
                "tau_ms must be > 0 (got {})",
                self.tau_ms
            )));
        }
        if self.events_dir.as_os_str().is_empty() {
            return Err(EvError::validation("events_dir must be set"));
        }
        Ok(())
    }
}

/// Parameters of one side-by-side comparison.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Left video.
    pub video1: PathBuf,
    /// Right video.
    pub video2: PathBuf,
    /// Output video path.
    pub out: PathBuf,
    /// Horizontal gap between the two copies, in pixels.
    pub gap: u32,
    /// Background gray level.
    pub background: u8,
    /// Codec identifier passed to the video sink.
    pub codec: String,
    /// Output frame rate; defaults to the faster source.
    pub fps_out: Option<f64>,
    /// What to do when one source runs out first.
    pub end_mode: EndMode,
    /// Output canvas.
    pub canvas: Canvas,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            video1: PathBuf::new(),
            video2: PathBuf::new(),
            out: PathBuf::new(),
            gap: 15,
            background: 0,
            codec: DEFAULT_CODEC.to_owned(),
            fps_out: None,
            end_mode: EndMode::Min,
            canvas: Canvas {
                width: 1920,
                height: 1080,
            },
        }
    }
}

impl CompareConfig {
    /// Check scalar parameters without touching the filesystem.
    pub fn validate(&self) -> EvResult<()> {
        Canvas::new(self.canvas.width, self.canvas.height)?;
        if let Some(fps) = self.fps_out {
            Fps::new(fps)?;
        }
        if self.gap >= self.canvas.width {
            return Err(EvError::validation(format!(
                "gap {} leaves no room on a {}px wide canvas",
                self.gap, self.canvas.width
            )));
        }
        Ok(())
    }
}

/// Load a JSON config file; missing keys take their defaults.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> EvResult<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    serde_json::from_str(&text).map_err(|e| {
        EvError::validation(format!("invalid config '{}': {e}", path.display()))
    })
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
