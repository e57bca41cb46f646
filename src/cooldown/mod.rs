//! Submission cooldown module.
//!
//! Device-local rate limiting backed by on-device secure storage.

pub mod guard;
pub mod store;

pub use guard::*;
pub use store::*;
