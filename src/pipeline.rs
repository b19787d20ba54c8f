//! Render an event stream and compare it with the video it was generated from, in one job.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::compare::pipeline::compose_videos;
use crate::compare::sync::CompareStats;
use crate::config::{CompareConfig, RenderConfig};
use crate::foundation::error::{EvError, EvResult};
use crate::render::pipeline::render_to_video;
use crate::render::session::RenderStats;

/// Parameters of a render-then-compare job.
///
/// `compare.video1` is the original video. `render.out` and `compare.video2` are replaced by
/// the intermediate event video.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Event render settings.
    pub render: RenderConfig,
    /// Side-by-side settings.
    pub compare: CompareConfig,
    /// Keep the temporary event video instead of deleting it.
    pub keep_temp: bool,
    /// Fixed path for the event video; never deleted.
    pub temp_out: Option<PathBuf>,
}

/// What a render-then-compare job produced.
#[derive(Clone, Debug)]
pub struct PipelineStats {
    /// Event render counters.
    pub render: RenderStats,
    /// Composition counters.
    pub compare: CompareStats,
    /// Event video left on disk, if any.
    pub kept_intermediate: Option<PathBuf>,
}

/// Intermediate video path, removed on drop unless it must be kept.
#[derive(Debug)]
pub struct IntermediateVideo {
    path: PathBuf,
    remove_on_drop: bool,
}

impl IntermediateVideo {
    /// A caller-chosen path that outlives the job.
    pub fn fixed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remove_on_drop: false,
        }
    }

    /// A fresh path in the system temp directory.
    pub fn temporary(keep: bool) -> Self {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let name = format!(
            "evrender-{}-{nanos}-{}.mp4",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        );
        Self {
            path: std::env::temp_dir().join(name),
            remove_on_drop: !keep,
        }
    }

    /// Where the event video is written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file survives the guard.
    pub fn is_kept(&self) -> bool {
        !self.remove_on_drop
    }
}

impl Drop for IntermediateVideo {
    fn drop(&mut self) {
        if self.remove_on_drop {
            match std::fs::remove_file(&self.path) {
                Ok(()) => tracing::debug!(path = %self.path.display(), "intermediate removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "cannot remove intermediate"
                ),
            }
        }
    }
}

impl PipelineConfig {
    /// Check both halves before any work starts.
    pub fn validate(&self) -> EvResult<()> {
        self.render.validate()?;
        self.compare.validate()?;
        if self.compare.video1.as_os_str().is_empty() {
            return Err(EvError::validation("original video (compare.video1) must be set"));
        }
        if self.compare.out.as_os_str().is_empty() {
            return Err(EvError::validation("output path (compare.out) must be set"));
        }
        Ok(())
    }

    fn intermediate(&self) -> IntermediateVideo {
        match &self.temp_out {
            Some(path) => IntermediateVideo::fixed(path),
            None => IntermediateVideo::temporary(self.keep_temp),
        }
    }
}

/// Render the events to an intermediate video, then compose it next to the original.
///
/// The intermediate file is removed on every exit path unless it is kept.
#[tracing::instrument(
    skip(cfg),
    fields(original = %cfg.compare.video1.display(), out = %cfg.compare.out.display())
)]
pub fn run_pipeline(cfg: &PipelineConfig) -> EvResult<PipelineStats> {
    cfg.validate()?;
    let intermediate = cfg.intermediate();

    let render = render_to_video(&RenderConfig {
        out: intermediate.path().to_path_buf(),
        ..cfg.render.clone()
    })?;
    let compare = compose_videos(&CompareConfig {
        video2: intermediate.path().to_path_buf(),
        ..cfg.compare.clone()
    })?;

    Ok(PipelineStats {
        render,
        compare,
        kept_intermediate: intermediate
            .is_kept()
            .then(|| intermediate.path().to_path_buf()),
    })
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
