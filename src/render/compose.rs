use crate::foundation::core::{FrameRGB, Rgb8};
use crate::render::surface::DecaySurfaces;

/// Colors used to shade decay surfaces (RGB order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Gray level of pixels without recent activity.
    pub background: u8,
    /// Color of positive activity.
    pub positive: Rgb8,
    /// Color of negative activity.
    pub negative: Rgb8,
    /// Color where positive and negative activity coincide.
    pub overlap: Rgb8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: 0,
            positive: Rgb8([4, 150, 255]),
            negative: Rgb8([244, 91, 105]),
            overlap: Rgb8([204, 0, 204]),
        }
    }
}

/// Shade both surfaces into one RGB frame.
///
/// Activity common to both polarities is split out and painted in the overlap color, so an
/// equally strong positive/negative pixel never reads as either polarity.
pub fn compose_frame(surfaces: &DecaySurfaces, palette: &Palette) -> FrameRGB {
    let canvas = surfaces.canvas();
    let bg = f32::from(palette.background);
    let pos_c = palette.positive.to_f32();
    let neg_c = palette.negative.to_f32();
    let ovl_c = palette.overlap.to_f32();

    let mut data = Vec::with_capacity(canvas.area() * 3);
    for (&p, &n) in surfaces.positive().iter().zip(surfaces.negative()) {
        let mpos = quantize_unit(p);
        let mneg = quantize_unit(n);
        let movl = mpos.min(mneg);
        let (mpos, mneg) = (mpos - movl, mneg - movl);
        for c in 0..3 {
            let v = bg + mpos * pos_c[c] + mneg * neg_c[c] + movl * ovl_c[c];
            data.push(v.clamp(0.0, 255.0) as u8);
        }
    }

    FrameRGB {
        width: canvas.width,
        height: canvas.height,
        data,
    }
}

/// Scale to 8 bits with truncation and back to `[0, 1]`.
fn quantize_unit(v: f32) -> f32 {
    f32::from((v * 255.0).clamp(0.0, 255.0) as u8) / 255.0
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
