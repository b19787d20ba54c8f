use image::imageops::{self, FilterType};

use crate::foundation::core::{Canvas, FrameRGB, Rgb8};
use crate::foundation::error::{EvError, EvResult};

/// Placement of two equally sized frames next to each other on a fixed canvas.
///
/// Both copies share one scale factor, never above 1, chosen so that they plus the gap fit the
/// canvas. The pair is centered horizontally and vertically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideBySideLayout {
    /// Output canvas.
    pub canvas: Canvas,
    /// Horizontal gap in pixels.
    pub gap: u32,
    /// Applied scale factor.
    pub scale: f64,
    /// Scaled copy width.
    pub width: u32,
    /// Scaled copy height.
    pub height: u32,
    /// Left edge of the first copy.
    pub x_left: u32,
    /// Left edge of the second copy.
    pub x_right: u32,
    /// Top edge of both copies.
    pub y_top: u32,
}

impl SideBySideLayout {
    /// Fit two `width x height` frames and `gap` into `canvas`.
    pub fn fit(width: u32, height: u32, canvas: Canvas, gap: u32) -> EvResult<Self> {
        if width == 0 || height == 0 {
            return Err(EvError::validation(format!(
                "source frames must be non-empty (got {width}x{height})"
            )));
        }
        let Some(room) = canvas.width.checked_sub(gap).filter(|r| *r >= 2) else {
            return Err(EvError::validation(format!(
                "gap {gap} leaves no room on a {}px wide canvas",
                canvas.width
            )));
        };

        let max_each = f64::from(room) / 2.0;
        let scale = (max_each / f64::from(width))
            .min(f64::from(canvas.height) / f64::from(height))
            .min(1.0);
        // Rounding may overshoot by a pixel; clamp so both copies always land on the canvas.
        let scaled_w = ((f64::from(width) * scale).round() as u32).clamp(1, room / 2);
        let scaled_h = ((f64::from(height) * scale).round() as u32).clamp(1, canvas.height);

        let total_w = 2 * scaled_w + gap;
        let x_left = (canvas.width - total_w) / 2;
        Ok(Self {
            canvas,
            gap,
            scale,
            width: scaled_w,
            height: scaled_h,
            x_left,
            x_right: x_left + scaled_w + gap,
            y_top: (canvas.height - scaled_h) / 2,
        })
    }

    /// Paint `left` and `right` onto a fresh canvas filled with `background`.
    pub fn compose(
        &self,
        left: &FrameRGB,
        right: &FrameRGB,
        background: Rgb8,
    ) -> EvResult<FrameRGB> {
        let mut out = image::RgbImage::from_pixel(
            self.canvas.width,
            self.canvas.height,
            image::Rgb(background.0),
        );
        let left = self.scaled(left)?;
        let right = self.scaled(right)?;
        imageops::replace(&mut out, &left, i64::from(self.x_left), i64::from(self.y_top));
        imageops::replace(&mut out, &right, i64::from(self.x_right), i64::from(self.y_top));
        Ok(FrameRGB::from_image(out))
    }

    fn scaled(&self, frame: &FrameRGB) -> EvResult<image::RgbImage> {
        let img = frame.clone().into_image()?;
        if img.dimensions() == (self.width, self.height) {
            return Ok(img);
        }
        Ok(imageops::resize(
            &img,
            self.width,
            self.height,
            FilterType::Triangle,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compare/layout.rs"]
mod tests;
