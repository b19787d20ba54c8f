//! External collaborators: frame upsampling and event simulation.
//!
//! Both run as opaque child processes; only their directory contract and exit status matter.

/// Typed stage contract and launcher.
pub mod external;
/// The two-stage generation job.
pub mod generate;
