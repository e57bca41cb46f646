//! Security module.
//!
//! Client-side PII screening for free-text incident descriptions.

pub mod pii;

pub use pii::*;
