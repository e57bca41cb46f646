//! Pipeline orchestration module.
//!
//! Anonymous incident submission that coordinates:
//! - Draft completeness
//! - PII screening
//! - Cooldown
//! - Coordinate rounding
//! - Persistence and media attachment

pub mod context;
pub mod media;
pub mod submission;

pub use context::*;
pub use media::*;
pub use submission::*;
