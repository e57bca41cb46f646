//! Geographic privacy module.
//!
//! Coordinate types and the privacy grid rounding applied before any
//! location leaves the device.

pub mod rounding;

pub use rounding::*;
