//! Side-by-side comparison of two finished videos.
//!
//! Both sources are read forward only and resampled in time to a common output rate, then
//! scaled into a shared canvas.

/// Placement and scaling on the output canvas.
pub mod layout;
/// Config-driven entry points.
pub mod pipeline;
/// Frame sources.
pub mod source;
/// Time alignment and the end-of-stream policy.
pub mod sync;
