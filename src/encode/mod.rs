//! Encoding sinks.
//!
//! Sinks consume frames in output order and are driven by the event renderer and the
//! side-by-side compositor alike.

/// `ffmpeg`-based video sink (system `ffmpeg` binary).
pub mod ffmpeg;
/// Numbered PNG sequence sink.
pub mod png;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
