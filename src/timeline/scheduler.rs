use crate::events::reader::EventShardReader;
use crate::foundation::core::{FrameIndex, Fps};
use crate::foundation::error::{EvError, EvResult};
use crate::timeline::timestamps::TimestampSeries;

/// Half-open render time range `[start_ns, end_ns)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderRange {
    /// Inclusive start in nanoseconds.
    pub start_ns: i64,
    /// Exclusive end in nanoseconds.
    pub end_ns: i64,
}

impl RenderRange {
    /// Pick the render range.
    ///
    /// A timestamp series with at least two entries wins: it spans its first stamp to its last
    /// stamp plus one median frame step (`dt_ns` when no positive step exists). Otherwise the
    /// range runs from the first to the last event time in `event_range`.
    pub fn resolve(
        timestamps: Option<&TimestampSeries>,
        dt_ns: i64,
        event_range: (i64, i64),
    ) -> EvResult<Self> {
        if let Some(ts) = timestamps
            && let [first, .., last] = ts.as_ns()
        {
            let step = ts.median_positive_step_ns().unwrap_or(dt_ns);
            let end_ns = last.checked_add(step).ok_or_else(|| {
                EvError::validation(format!(
                    "last timestamp {last} ns plus frame step {step} ns overflows the time range"
                ))
            })?;
            return Ok(Self {
                start_ns: *first,
                end_ns,
            });
        }

        let (start_ns, end_ns) = event_range;
        Ok(Self { start_ns, end_ns })
    }

    /// Duration in nanoseconds, zero for inverted ranges.
    pub fn len_ns(self) -> i64 {
        self.end_ns.saturating_sub(self.start_ns).max(0)
    }
}

/// One output frame's time window `[start_ns, end_ns)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameWindow {
    /// Output frame index.
    pub index: FrameIndex,
    /// Inclusive start in nanoseconds.
    pub start_ns: i64,
    /// Exclusive end in nanoseconds.
    pub end_ns: i64,
}

/// Fixed-duration split of a [`RenderRange`] into frame windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSchedule {
    start_ns: i64,
    dt_ns: i64,
    frame_count: u64,
}

impl WindowSchedule {
    /// `ceil(len / dt_ns)` windows starting at `range.start_ns`, capped by `max_frames`.
    ///
    /// Fails when the end of the last window does not fit in `i64` nanoseconds.
    pub fn new(range: RenderRange, dt_ns: i64, max_frames: Option<u64>) -> EvResult<Self> {
        if dt_ns <= 0 {
            return Err(EvError::validation(format!(
                "frame duration must be > 0 ns (got {dt_ns})"
            )));
        }
        let start = i128::from(range.start_ns);
        let len = (i128::from(range.end_ns) - start).max(0);
        let dt = i128::from(dt_ns);
        let full = u64::try_from((len + dt - 1) / dt).unwrap_or(u64::MAX);
        let frame_count = max_frames.map_or(full, |m| full.min(m));
        let last_end = start + i128::from(frame_count) * dt;
        if i64::try_from(last_end).is_err() {
            return Err(EvError::validation(format!(
                "{frame_count} windows of {dt_ns} ns from {} ns overflow the time range",
                range.start_ns
            )));
        }
        Ok(Self {
            start_ns: range.start_ns,
            dt_ns,
            frame_count,
        })
    }

    /// Build the schedule for a shard set, optionally bounded by capture timestamps.
    ///
    /// The edge shards are always read, so empty `t` arrays fail with `EmptyData` even when
    /// the timestamps pick the range.
    pub fn for_stream(
        reader: &EventShardReader,
        timestamps: Option<&TimestampSeries>,
        fps: Fps,
        max_frames: Option<u64>,
    ) -> EvResult<Self> {
        let dt_ns = fps.frame_duration_ns();
        let event_range = reader.event_time_range()?;
        let range = RenderRange::resolve(timestamps, dt_ns, event_range)?;
        tracing::debug!(
            start_ns = range.start_ns,
            end_ns = range.end_ns,
            dt_ns,
            "resolved render range"
        );
        Self::new(range, dt_ns, max_frames)
    }

    /// Start of the first window.
    pub fn start_ns(&self) -> i64 {
        self.start_ns
    }

    /// Window duration in nanoseconds.
    pub fn dt_ns(&self) -> i64 {
        self.dt_ns
    }

    /// Number of scheduled windows.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Window `i`: `[start + i*dt, start + (i+1)*dt)`.
    ///
    /// `i` must be below [`Self::frame_count`]; those windows are checked to fit in `i64`.
    pub fn window(&self, i: u64) -> FrameWindow {
        let start = i128::from(self.start_ns) + i128::from(i) * i128::from(self.dt_ns);
        let start_ns = start as i64;
        FrameWindow {
            index: FrameIndex(i),
            start_ns,
            end_ns: (start + i128::from(self.dt_ns)) as i64,
        }
    }

    /// Iterate the scheduled windows in order.
    pub fn windows(&self) -> impl Iterator<Item = FrameWindow> + '_ {
        (0..self.frame_count).map(|i| self.window(i))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/scheduler.rs"]
mod tests;
