//! Error types for the reporting core.

use thiserror::Error;

use crate::draft::MissingField;
use crate::security::pii::PiiReason;
use crate::storage::models::{IncidentStatus, MediaKind};

/// Rejected rounding input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Coordinate is not a finite number: {field}={value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("Coordinate out of range: {field}={value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("Precision must be a positive number of metres, got {0}")]
    InvalidPrecision(f64),
}

/// User-correctable input problems.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Incomplete draft, missing: {0:?}")]
    Incomplete(Vec<MissingField>),

    #[error("Description rejected: {}", .0.code())]
    Pii(PiiReason),

    #[error("Privacy notice not acknowledged")]
    NotAcknowledged,
}

/// On-device secure storage failures. Never surfaced by the cooldown guard.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Secure store unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by the persistence backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },

    #[error("Backend error: {0}")]
    Other(String),
}

/// Outcome of a failed `submit`. None of these leave persisted state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("Incomplete draft, missing: {0:?}")]
    Incomplete(Vec<MissingField>),

    #[error("Description rejected: {}", .0.code())]
    PiiRejected(PiiReason),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(#[from] CoordinateError),

    #[error("Persistence failed: {0}")]
    Persistence(BackendError),
}

impl From<ValidationError> for SubmissionError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Incomplete(missing) => SubmissionError::Incomplete(missing),
            ValidationError::Pii(reason) => SubmissionError::PiiRejected(reason),
            // The acknowledgment gate sits in front of the draft; a draft that
            // reaches the pipeline without one is simply missing its description.
            ValidationError::NotAcknowledged => {
                SubmissionError::Incomplete(vec![MissingField::Description])
            }
        }
    }
}

/// Which part of an attachment's upload-and-link sequence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStage {
    Read,
    Upload,
    Link,
}

impl MediaStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStage::Read => "read",
            MediaStage::Upload => "upload",
            MediaStage::Link => "link",
        }
    }
}

/// A single attachment that could not be stored. Non-fatal to the submission.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} {} failed during {}: {reason}", .kind.label(), .index.saturating_add(1), .stage.as_str())]
pub struct MediaUploadError {
    /// Zero-based position in the draft's attachment list.
    pub index: usize,
    pub kind: MediaKind,
    pub stage: MediaStage,
    pub reason: String,
}

impl MediaUploadError {
    /// One-based position, as shown to the submitter.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    /// Message for the submitter, e.g. "Foto 2 fehlgeschlagen".
    pub fn user_message(&self) -> String {
        format!("{} {} fehlgeschlagen", self.kind.label(), self.position())
    }
}

/// Moderation access and transition failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModerationError {
    #[error("Moderation is disabled")]
    Disabled,

    #[error("Invalid moderator code")]
    InvalidCode,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Invalid configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
