//! Moderation module.
//!
//! Governs incident visibility:
//! - State machine (pending -> approved | rejected)
//! - Shared-secret gate for moderators
//! - Pending queue and decisions

pub mod gate;
pub mod service;
pub mod state;

pub use gate::*;
pub use service::*;
pub use state::*;
