//! ReportGuard Core - privacy-preserving anonymous incident submission
//!
//! This crate holds the safety pipeline applied to a user-supplied incident
//! report between capture and persistence. The implementation prioritizes:
//!
//! 1. **Privacy** - No exact location and no submitter identity is ever
//!    persisted or logged
//! 2. **Logging** - Every decision point logged with session context
//! 3. **Availability** - Anti-spam checks fail open; the textual report is
//!    never lost to a failed media upload
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `geo` - Privacy grid rounding of coordinates
//! - `security` - PII heuristics for descriptions
//! - `cooldown` - Device-local submission rate limit over secure storage
//! - `draft` - Session-scoped report draft
//! - `pipeline` - Submission orchestrator and media attachment
//! - `moderation` - Status state machine, moderator gate, review queue
//! - `feed` - Public read path (approved incidents only)
//! - `storage` - Models, backend interface, in-memory backend, SQL builders
//! - `config`, `error`, `logging` - Ambient concerns

pub mod config;
pub mod cooldown;
pub mod draft;
pub mod error;
pub mod feed;
pub mod geo;
pub mod logging;
pub mod moderation;
pub mod pipeline;
pub mod security;
pub mod storage;

#[cfg(feature = "python")]
mod python;

pub use config::Config;
pub use cooldown::{CooldownDecision, FileSecureStore, SecureStore, SubmissionCooldownGuard};
pub use draft::{OccurredAt, ReportDraft};
pub use error::{
    BackendError, CoordinateError, MediaUploadError, ModerationError, SubmissionError,
    ValidationError,
};
pub use feed::{FeedFilters, IncidentFeed, TimeRange};
pub use geo::{round_coordinates, Coordinates, PrecisionRadius, RoundedCoordinates};
pub use logging::init_logger;
pub use moderation::{ModerationService, ModerationStateMachine, ModeratorGate};
pub use pipeline::{IncidentSubmissionPipeline, SubmissionContext, SubmissionReceipt};
pub use security::{validate_description, PiiCheck, PiiReason};
pub use storage::{IncidentBackend, IncidentCategory, IncidentStatus, MediaKind};
