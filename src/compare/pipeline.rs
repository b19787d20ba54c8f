use crate::compare::source::{FfmpegSource, FrameSource};
use crate::compare::sync::{CompareStats, SideBySideCompositor, SideBySideOpts};
use crate::config::CompareConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::FrameSink;
use crate::foundation::error::EvResult;

impl SideBySideOpts {
    /// Compositor parameters carried by `cfg`.
    pub fn from_config(cfg: &CompareConfig) -> Self {
        Self {
            canvas: cfg.canvas,
            gap: cfg.gap,
            background: cfg.background,
            fps_out: cfg.fps_out,
            end_mode: cfg.end_mode,
        }
    }
}

/// Compose two already opened sources into `sink`.
pub fn compose_sources(
    cfg: &CompareConfig,
    left: &mut dyn FrameSource,
    right: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
) -> EvResult<CompareStats> {
    cfg.validate()?;
    let compositor =
        SideBySideCompositor::new(left.info(), right.info(), &SideBySideOpts::from_config(cfg))?;
    compositor.run(left, right, sink)
}

/// Decode `cfg.video1` and `cfg.video2` and write the comparison to `cfg.out`.
#[tracing::instrument(
    skip(cfg),
    fields(
        left = %cfg.video1.display(),
        right = %cfg.video2.display(),
        out = %cfg.out.display()
    )
)]
pub fn compose_videos(cfg: &CompareConfig) -> EvResult<CompareStats> {
    cfg.validate()?;
    let mut left = FfmpegSource::open(&cfg.video1)?;
    let mut right = FfmpegSource::open(&cfg.video2)?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&cfg.out).with_codec(cfg.codec.clone()));
    compose_sources(cfg, &mut left, &mut right, &mut sink)
}
