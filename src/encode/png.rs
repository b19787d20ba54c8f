use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameGate, FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGB};
use crate::foundation::error::{EvError, EvResult};

/// Sink that writes each frame as `<dir>/<prefix><index:06>.png`.
///
/// Handy for inspecting single windows and for feeding frame-directory tools.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    gate: FrameGate,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Write frames into `dir` as `frame_000000.png`, `frame_000001.png`, ...
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "frame_".to_owned(),
            gate: FrameGate::default(),
            written: Vec::new(),
        }
    }

    /// Use `prefix` instead of `frame_`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> EvResult<()> {
        self.gate.open(cfg)?;
        if self.dir.is_file() {
            return Err(EvError::sink_open(format!(
                "png output '{}' is a file, expected a directory",
                self.dir.display()
            )));
        }
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            EvError::sink_open(format!(
                "failed to create png output directory '{}': {e}",
                self.dir.display()
            ))
        })?;
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGB) -> EvResult<()> {
        self.gate.check(idx, frame)?;
        let path = self.dir.join(format!("{}{:06}.png", self.prefix, idx.0));
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> EvResult<()> {
        self.gate.close();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
