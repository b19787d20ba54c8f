use crate::foundation::error::{EvError, EvResult};

/// Nanoseconds per second.
pub const NANOS_PER_SEC: f64 = 1e9;

/// Absolute 0-based index of an emitted frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Validated frames-per-second.
///
/// Event renders and probed videos use fractional rates (`29.97`, `120.0`), so the value is kept
/// as `f64` and only guaranteed to be finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Fps(f64);

impl Fps {
    /// Create a validated FPS value.
    pub fn new(fps: f64) -> EvResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(EvError::validation(format!("fps must be > 0 (got {fps})")));
        }
        Ok(Self(fps))
    }

    /// Build from a rational `num/den` such as ffprobe's `30000/1001`.
    pub fn from_ratio(num: i64, den: i64) -> EvResult<Self> {
        if den == 0 {
            return Err(EvError::validation("fps denominator must be non-zero"));
        }
        Self::new(num as f64 / den as f64)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Duration of one frame, `round(1e9 / fps)` nanoseconds.
    pub fn frame_duration_ns(self) -> i64 {
        (NANOS_PER_SEC / self.0).round() as i64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> EvResult<Self> {
        if width == 0 || height == 0 {
            return Err(EvError::validation(format!(
                "canvas must be non-empty (got {width}x{height})"
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels.
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8(pub [u8; 3]);

impl Rgb8 {
    /// Gray level repeated on all channels.
    pub fn gray(level: u8) -> Self {
        Self([level; 3])
    }

    /// Channels as `f32` in `[0, 255]`.
    pub fn to_f32(self) -> [f32; 3] {
        self.0.map(f32::from)
    }
}

/// A rendered frame as tightly packed, row-major RGB8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGB {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, `width * height * 3` long.
    pub data: Vec<u8>,
}

impl FrameRGB {
    /// A frame filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgb8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&color.0);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGB8 bytes, checking the buffer length.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> EvResult<Self> {
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(EvError::validation(format!(
                "rgb frame buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Pixel at `(x, y)`; panics when out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb8 {
        let off = (y as usize * self.width as usize + x as usize) * 3;
        Rgb8([self.data[off], self.data[off + 1], self.data[off + 2]])
    }

    /// Convert into an `image` buffer without copying pixels.
    pub fn into_image(self) -> EvResult<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| EvError::validation("rgb frame buffer does not match its dimensions"))
    }

    /// Take ownership of an `image` buffer.
    pub fn from_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
