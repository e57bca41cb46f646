//! Storage module.
//!
//! Persisted models, the backend interface consumed by the core, an
//! in-memory backend, and SQL query builders for relational adapters.

pub mod backend;
pub mod memory;
pub mod models;
pub mod queries;

pub use backend::*;
pub use memory::*;
pub use models::*;
pub use queries::*;
