//! evrender turns event-camera recordings into viewable video.
//!
//! - Stream time-sorted `.npz` event shards through per-polarity decay surfaces and encode one
//!   frame per fixed time window ([`render`])
//! - Place two finished videos next to each other on a fixed canvas, time-aligned to a common
//!   frame rate ([`compare`])
//! - Drive the external upsampling and event-simulation stages ([`stages`])
//!
//! Video IO goes through the system `ffmpeg`/`ffprobe` binaries.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Side-by-side video comparison.
pub mod compare;
/// Serializable job configuration.
pub mod config;
/// Frame sinks.
pub mod encode;
/// Event records and shard streaming.
pub mod events;
/// Render-then-compare job.
pub mod pipeline;
/// Event-to-frame rendering.
pub mod render;
/// External process stages.
pub mod stages;
/// Timestamps and frame windows.
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRGB, NANOS_PER_SEC, Rgb8};
pub use crate::foundation::error::{EvError, EvResult};

pub use crate::compare::pipeline::{compose_sources, compose_videos};
pub use crate::compare::source::{FfmpegSource, FrameSource, InMemorySource, SourceInfo};
pub use crate::compare::sync::{CompareStats, EndMode, SideBySideCompositor, SideBySideOpts};
pub use crate::config::{CompareConfig, RenderConfig, load_json};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::events::event::Event;
pub use crate::events::reader::EventShardReader;
pub use crate::events::shard::EventShard;
pub use crate::pipeline::{PipelineConfig, PipelineStats, run_pipeline};
pub use crate::render::compose::Palette;
pub use crate::render::pipeline::{render_to_video, render_with_sink};
pub use crate::render::session::{EventRenderer, RenderOpts, RenderStats};
pub use crate::stages::generate::{GenerateConfig, generate_events};
pub use crate::timeline::scheduler::WindowSchedule;
pub use crate::timeline::timestamps::TimestampSeries;
