use crate::compare::layout::SideBySideLayout;
use crate::compare::source::{FrameSource, SourceInfo};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, FrameRGB, Fps, Rgb8};
use crate::foundation::error::{EvError, EvResult};

/// What happens once one of the two sources runs out of frames.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EndMode {
    /// Stop at the first exhausted source.
    #[default]
    Min,
    /// Repeat the last frame of an exhausted source until both are exhausted.
    Hold,
}

/// Compositor parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideBySideOpts {
    /// Output canvas.
    pub canvas: Canvas,
    /// Horizontal gap in pixels.
    pub gap: u32,
    /// Background gray level.
    pub background: u8,
    /// Output frame rate override.
    pub fps_out: Option<f64>,
    /// End-of-stream policy.
    pub end_mode: EndMode,
}

/// Counters reported by [`SideBySideCompositor::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareStats {
    /// Frames handed to the sink.
    pub frames_written: u64,
    /// Output frame rate actually used.
    pub fps_out: f64,
    /// Whether the left source was exhausted.
    pub left_ended: bool,
    /// Whether the right source was exhausted.
    pub right_ended: bool,
}

/// Per-source read position.
struct Track {
    fps: f64,
    current: FrameRGB,
    index: u64,
    ended: bool,
}

impl Track {
    fn start(source: &mut dyn FrameSource, fps: f64, side: &str) -> EvResult<Self> {
        let current = source
            .next_frame()?
            .ok_or_else(|| EvError::empty_data(format!("{side} video has no readable frames")))?;
        Ok(Self {
            fps,
            current,
            index: 0,
            ended: false,
        })
    }

    /// Read forward until the frame shown at output frame `k` is current.
    fn advance_to(&mut self, source: &mut dyn FrameSource, k: u64, fps_out: f64) -> EvResult<()> {
        let want = (k as f64 * self.fps / fps_out).floor() as u64;
        while !self.ended && self.index < want {
            match source.next_frame()? {
                Some(frame) => {
                    self.current = frame;
                    self.index += 1;
                }
                None => self.ended = true,
            }
        }
        Ok(())
    }
}

/// Time-aligns two forward-only sources and paints them next to each other.
#[derive(Clone, Copy, Debug)]
pub struct SideBySideCompositor {
    layout: SideBySideLayout,
    fps: [f64; 2],
    fps_out: Fps,
    background: Rgb8,
    end_mode: EndMode,
}

impl SideBySideCompositor {
    /// Check that the two sources are compatible and plan the layout.
    pub fn new(left: SourceInfo, right: SourceInfo, opts: &SideBySideOpts) -> EvResult<Self> {
        if (left.width, left.height) != (right.width, right.height) {
            return Err(EvError::size_mismatch(format!(
                "videos must share a resolution (got {}x{} and {}x{})",
                left.width, left.height, right.width, right.height
            )));
        }
        let fps_left = known_fps(left, "left")?;
        let fps_right = known_fps(right, "right")?;
        let fps_out = match opts.fps_out {
            Some(fps) => Fps::new(fps)?,
            None => Fps::new(fps_left.max(fps_right))?,
        };

        Ok(Self {
            layout: SideBySideLayout::fit(left.width, left.height, opts.canvas, opts.gap)?,
            fps: [fps_left, fps_right],
            fps_out,
            background: Rgb8::gray(opts.background),
            end_mode: opts.end_mode,
        })
    }

    /// The planned placement.
    pub fn layout(&self) -> &SideBySideLayout {
        &self.layout
    }

    /// Output frame rate.
    pub fn fps_out(&self) -> Fps {
        self.fps_out
    }

    /// Stream both sources into `sink` until the end policy says stop.
    #[tracing::instrument(skip_all, fields(fps_out = self.fps_out.as_f64(), mode = ?self.end_mode))]
    pub fn run(
        &self,
        left: &mut dyn FrameSource,
        right: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
    ) -> EvResult<CompareStats> {
        sink.begin(SinkConfig {
            width: self.layout.canvas.width,
            height: self.layout.canvas.height,
            fps: self.fps_out,
        })?;

        let mut l = Track::start(left, self.fps[0], "left")?;
        let mut r = Track::start(right, self.fps[1], "right")?;
        let fps_out = self.fps_out.as_f64();

        let mut k = 0u64;
        loop {
            l.advance_to(left, k, fps_out)?;
            r.advance_to(right, k, fps_out)?;
            let done = match self.end_mode {
                EndMode::Min => l.ended || r.ended,
                EndMode::Hold => l.ended && r.ended,
            };
            if done {
                break;
            }

            let frame = self.layout.compose(&l.current, &r.current, self.background)?;
            sink.push_frame(FrameIndex(k), &frame)?;
            k += 1;
        }
        sink.end()?;

        tracing::info!(frames = k, "side-by-side composition finished");
        Ok(CompareStats {
            frames_written: k,
            fps_out,
            left_ended: l.ended,
            right_ended: r.ended,
        })
    }
}

fn known_fps(info: SourceInfo, side: &str) -> EvResult<f64> {
    match info.fps {
        Some(fps) if fps.is_finite() && fps > 0.0 => Ok(fps),
        Some(fps) => Err(EvError::unknown_frame_rate(format!(
            "{side} video reports a non-positive frame rate ({fps})"
        ))),
        None => Err(EvError::unknown_frame_rate(format!(
            "{side} video does not declare a frame rate"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compare/sync.rs"]
mod tests;
