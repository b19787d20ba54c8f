use crate::events::event::Event;
use crate::foundation::core::Canvas;
use crate::foundation::error::{EvError, EvResult};

/// Per-pixel, per-polarity activity that fades exponentially with time.
///
/// Cells hold `exp(-age / tau)` of the most recent event, so every value stays in `[0, 1]`.
/// Same-polarity events landing in one window merge by maximum, not by sum.
#[derive(Clone, Debug)]
pub struct DecaySurfaces {
    canvas: Canvas,
    tau_ns: f64,
    pos: Vec<f32>,
    neg: Vec<f32>,
}

impl DecaySurfaces {
    /// Zeroed surfaces for a `canvas`-sized sensor with decay constant `tau_ms`.
    pub fn new(canvas: Canvas, tau_ms: f64) -> EvResult<Self> {
        if !tau_ms.is_finite() || tau_ms <= 0.0 {
            return Err(EvError::validation(format!(
                "tau_ms must be > 0 (got {tau_ms})"
            )));
        }
        Ok(Self {
            canvas,
            tau_ns: tau_ms * 1e6,
            pos: vec![0.0; canvas.area()],
            neg: vec![0.0; canvas.area()],
        })
    }

    /// Sensor dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Decay constant in nanoseconds.
    pub fn tau_ns(&self) -> f64 {
        self.tau_ns
    }

    /// Multiplicative factor applied by [`Self::decay`] for a step of `dt_ns`.
    pub fn decay_factor(&self, dt_ns: i64) -> f32 {
        (-(dt_ns as f64) / self.tau_ns).exp() as f32
    }

    /// Fade both surfaces by `exp(-dt_ns / tau_ns)`.
    pub fn decay(&mut self, dt_ns: i64) {
        let a = self.decay_factor(dt_ns);
        for v in self.pos.iter_mut().chain(self.neg.iter_mut()) {
            *v *= a;
        }
    }

    /// Stamp `events` as seen from `window_end_ns`.
    ///
    /// Out-of-bounds coordinates are dropped without error.
    pub fn accumulate(&mut self, events: &[Event], window_end_ns: i64) {
        let (w, h) = (self.canvas.width as i64, self.canvas.height as i64);
        for e in events {
            let (x, y) = (i64::from(e.x), i64::from(e.y));
            if x < 0 || y < 0 || x >= w || y >= h {
                continue;
            }
            let age = (window_end_ns - e.t) as f64;
            let weight = ((-age / self.tau_ns).exp() as f32).min(1.0);
            let idx = (y * w + x) as usize;
            let cell = if e.positive {
                &mut self.pos[idx]
            } else {
                &mut self.neg[idx]
            };
            *cell = cell.max(weight);
        }
    }

    /// Positive activity at `(x, y)`.
    pub fn positive_at(&self, x: u32, y: u32) -> f32 {
        self.pos[self.index(x, y)]
    }

    /// Negative activity at `(x, y)`.
    pub fn negative_at(&self, x: u32, y: u32) -> f32 {
        self.neg[self.index(x, y)]
    }

    /// Row-major positive surface.
    pub fn positive(&self) -> &[f32] {
        &self.pos
    }

    /// Row-major negative surface.
    pub fn negative(&self) -> &[f32] {
        &self.neg
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.canvas.width as usize + x as usize
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
