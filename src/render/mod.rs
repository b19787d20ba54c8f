//! Event-to-frame rendering.
//!
//! Per window: decay the surfaces, pull the window's events from the shard cursor, stamp them,
//! shade the surfaces into an RGB frame and hand it to a sink.

/// Surface shading into RGB frames.
pub mod compose;
/// Config-driven entry points.
pub mod pipeline;
/// The window loop.
pub mod session;
/// Exponentially decaying activity surfaces.
pub mod surface;
