//! Render time range selection and frame window scheduling.

/// Range resolution and fixed-duration windows.
pub mod scheduler;
/// Capture timestamp files.
pub mod timestamps;
