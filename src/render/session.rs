use crate::encode::sink::{FrameSink, SinkConfig};
use crate::events::reader::EventShardReader;
use crate::foundation::core::{Canvas, FrameRGB, Fps};
use crate::foundation::error::EvResult;
use crate::render::compose::{Palette, compose_frame};
use crate::render::surface::DecaySurfaces;
use crate::timeline::scheduler::{FrameWindow, WindowSchedule};
use crate::timeline::timestamps::TimestampSeries;

/// Renderer parameters that do not depend on where events come from or where frames go.
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Sensor dimensions; events outside are dropped.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Decay time constant in milliseconds.
    pub tau_ms: f64,
    /// Upper bound on the number of frames.
    pub max_frames: Option<u64>,
    /// Output colors.
    pub palette: Palette,
}

/// Counters reported by [`EventRenderer::render`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Windows the scheduler planned.
    pub frames_scheduled: u64,
    /// Frames handed to the sink.
    pub frames_written: u64,
    /// Events that fell inside a rendered window (before bounds filtering).
    pub events_rendered: u64,
    /// The event stream ran out before the planned frame count.
    pub stopped_early: bool,
}

/// Whether the shard stream still has events after a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// More events may follow.
    Live,
    /// Every shard has been consumed.
    Exhausted,
}

/// Streams shards through decay surfaces into a frame sink.
///
/// The renderer owns its reader and surfaces for the whole run and is consumed by
/// [`Self::render`].
#[derive(Debug)]
pub struct EventRenderer {
    reader: EventShardReader,
    schedule: WindowSchedule,
    surfaces: DecaySurfaces,
    palette: Palette,
    fps: Fps,
}

impl EventRenderer {
    /// Validate parameters, resolve the render range and position the reader at its start.
    pub fn new(
        mut reader: EventShardReader,
        timestamps: Option<&TimestampSeries>,
        opts: &RenderOpts,
    ) -> EvResult<Self> {
        let surfaces = DecaySurfaces::new(opts.canvas, opts.tau_ms)?;
        let schedule = WindowSchedule::for_stream(&reader, timestamps, opts.fps, opts.max_frames)?;
        reader.seek(schedule.start_ns())?;
        Ok(Self {
            reader,
            schedule,
            surfaces,
            palette: opts.palette,
            fps: opts.fps,
        })
    }

    /// The window plan.
    pub fn schedule(&self) -> &WindowSchedule {
        &self.schedule
    }

    /// Render every scheduled window into `sink`.
    ///
    /// Stops after the window in which the stream is exhausted; that truncation is reported in
    /// [`RenderStats::stopped_early`] rather than as an error. On error the sink is left
    /// unfinished and releases itself on drop.
    #[tracing::instrument(skip_all, fields(frames = self.schedule.frame_count()))]
    pub fn render(mut self, sink: &mut dyn FrameSink) -> EvResult<RenderStats> {
        let canvas = self.surfaces.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
        })?;

        let mut stats = RenderStats {
            frames_scheduled: self.schedule.frame_count(),
            ..RenderStats::default()
        };
        let schedule = self.schedule;
        for window in schedule.windows() {
            let (frame, events, state) = self.step(window)?;
            sink.push_frame(window.index, &frame)?;
            stats.frames_written += 1;
            stats.events_rendered += events;

            if state == StreamState::Exhausted {
                stats.stopped_early = stats.frames_written < stats.frames_scheduled;
                break;
            }
        }
        sink.end()?;

        if stats.stopped_early {
            tracing::info!(
                written = stats.frames_written,
                scheduled = stats.frames_scheduled,
                "event stream exhausted before the last scheduled frame"
            );
        }
        Ok(stats)
    }

    /// Decay, integrate one window's events and shade the result.
    fn step(&mut self, window: FrameWindow) -> EvResult<(FrameRGB, u64, StreamState)> {
        self.surfaces.decay(self.schedule.dt_ns());

        let mut events = self.reader.pop_until(window.end_ns)?;
        events.retain(|e| e.t >= window.start_ns);
        self.surfaces.accumulate(&events, window.end_ns);

        let state = if self.reader.is_exhausted() {
            StreamState::Exhausted
        } else {
            StreamState::Live
        };
        Ok((
            compose_frame(&self.surfaces, &self.palette),
            events.len() as u64,
            state,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
