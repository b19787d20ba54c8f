use crate::config::RenderConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::FrameSink;
use crate::events::reader::EventShardReader;
use crate::foundation::error::EvResult;
use crate::render::session::{EventRenderer, RenderOpts, RenderStats};
use crate::timeline::timestamps::TimestampSeries;

/// Open shards and timestamps named by `cfg` and build a ready-to-run renderer.
///
/// Fails fast, in order, on bad scalars, an empty shard directory, a missing timestamp file and
/// empty edge shards.
pub fn open_renderer(cfg: &RenderConfig) -> EvResult<EventRenderer> {
    cfg.validate()?;
    let opts = RenderOpts {
        canvas: cfg.canvas()?,
        fps: cfg.fps()?,
        tau_ms: cfg.tau_ms,
        max_frames: cfg.max_frames,
        palette: cfg.palette,
    };
    let reader = EventShardReader::from_dir(&cfg.events_dir)?;
    let timestamps = match &cfg.timestamps {
        Some(path) => TimestampSeries::read(path)?,
        None => None,
    };
    EventRenderer::new(reader, timestamps.as_ref(), &opts)
}

/// Render `cfg` into an arbitrary sink.
pub fn render_with_sink(cfg: &RenderConfig, sink: &mut dyn FrameSink) -> EvResult<RenderStats> {
    open_renderer(cfg)?.render(sink)
}

/// Render `cfg` into `cfg.out` through the system `ffmpeg`.
#[tracing::instrument(skip(cfg), fields(events = %cfg.events_dir.display(), out = %cfg.out.display()))]
pub fn render_to_video(cfg: &RenderConfig) -> EvResult<RenderStats> {
    let renderer = open_renderer(cfg)?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&cfg.out).with_codec(cfg.codec.clone()));
    let stats = renderer.render(&mut sink)?;
    tracing::info!(frames = stats.frames_written, "event video written");
    Ok(stats)
}
