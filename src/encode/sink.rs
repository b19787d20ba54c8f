use crate::foundation::core::{FrameIndex, FrameRGB, Fps};
use crate::foundation::error::{EvError, EvResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming rendered frames in output order.
///
/// Ordering contract: `push_frame` is called with strictly increasing `FrameIndex` values.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed. Opening failures surface here.
    fn begin(&mut self, cfg: SinkConfig) -> EvResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGB) -> EvResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> EvResult<()>;
}

/// Tracks the ordering and size contract shared by all sinks.
#[derive(Debug, Default)]
pub(crate) struct FrameGate {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FrameGate {
    pub(crate) fn open(&mut self, cfg: SinkConfig) -> EvResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(EvError::validation(format!(
                "sink width/height must be non-zero (got {}x{})",
                cfg.width, cfg.height
            )));
        }
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    pub(crate) fn check(&mut self, idx: FrameIndex, frame: &FrameRGB) -> EvResult<SinkConfig> {
        let cfg = self
            .cfg
            .ok_or_else(|| EvError::encode("sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(EvError::encode(format!(
                "sink received out-of-order frame index {} after {}",
                idx.0, last.0
            )));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(EvError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != frame.width as usize * frame.height as usize * 3 {
            return Err(EvError::validation(
                "frame.data size mismatch with width*height*3",
            ));
        }
        self.last_idx = Some(idx);
        Ok(cfg)
    }

    pub(crate) fn close(&mut self) {
        self.cfg = None;
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    gate: FrameGate,
    frames: Vec<(FrameIndex, FrameRGB)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGB)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> EvResult<()> {
        self.gate.open(cfg)?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGB) -> EvResult<()> {
        self.gate.check(idx, frame)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> EvResult<()> {
        self.gate.close();
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
