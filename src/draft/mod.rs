//! Report draft assembled across wizard steps.
//!
//! A draft belongs to exactly one reporting session. It is created at flow
//! start, passed by reference to each step, and reset after a successful
//! submission or when the submitter abandons the flow. Setters are
//! last-write-wins; there is no history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::{Coordinates, PrecisionRadius};
use crate::security::pii::validate_description;
use crate::storage::models::{IncidentCategory, MediaKind};

/// A media file picked on the device, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub local_reference: String,
    pub kind: MediaKind,
}

/// Draft fields required before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Category,
    Location,
    Precision,
    OccurredAt,
    Description,
}

/// When the incident happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurredAt {
    Now,
    At(DateTime<Utc>),
}

impl OccurredAt {
    pub fn resolve(self) -> DateTime<Utc> {
        match self {
            OccurredAt::Now => Utc::now(),
            OccurredAt::At(at) => at,
        }
    }
}

/// In-progress report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    category: Option<IncidentCategory>,
    raw_location: Option<Coordinates>,
    precision: Option<PrecisionRadius>,
    occurred_at: Option<DateTime<Utc>>,
    description: String,
    media: Vec<MediaAttachment>,
}

/// Snapshot of a draft that passed the completeness check.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteDraft {
    pub category: IncidentCategory,
    pub raw_location: Coordinates,
    pub precision_m: u32,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub media: Vec<MediaAttachment>,
}

impl ReportDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_category(&mut self, category: IncidentCategory) {
        self.category = Some(category);
    }

    /// Location and precision are chosen together on the location step.
    pub fn set_location(&mut self, location: Coordinates, precision: PrecisionRadius) {
        self.raw_location = Some(location);
        self.precision = Some(precision);
    }

    pub fn set_occurred_at(&mut self, occurred_at: OccurredAt) {
        self.occurred_at = Some(occurred_at.resolve());
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Description step: screen the text and require the privacy notice to
    /// be acknowledged before storing it. On error the draft is unchanged.
    pub fn accept_description(
        &mut self,
        description: &str,
        acknowledged: bool,
    ) -> Result<(), ValidationError> {
        validate_description(description)
            .into_result()
            .map_err(ValidationError::Pii)?;
        if !acknowledged {
            return Err(ValidationError::NotAcknowledged);
        }
        self.description = description.to_string();
        Ok(())
    }

    pub fn add_media(&mut self, local_reference: impl Into<String>, kind: MediaKind) {
        self.media.push(MediaAttachment {
            local_reference: local_reference.into(),
            kind,
        });
    }

    /// Remove the attachment at `index`; out-of-range is a no-op.
    pub fn remove_media(&mut self, index: usize) -> Option<MediaAttachment> {
        if index < self.media.len() {
            Some(self.media.remove(index))
        } else {
            None
        }
    }

    /// Restore every field to unset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn category(&self) -> Option<IncidentCategory> {
        self.category
    }

    pub fn raw_location(&self) -> Option<Coordinates> {
        self.raw_location
    }

    pub fn precision(&self) -> Option<PrecisionRadius> {
        self.precision
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.occurred_at
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn media(&self) -> &[MediaAttachment] {
        &self.media
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fields still missing before submission.
    pub fn missing_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if self.category.is_none() {
            missing.push(MissingField::Category);
        }
        if self.raw_location.is_none() {
            missing.push(MissingField::Location);
        }
        if self.precision.is_none() {
            missing.push(MissingField::Precision);
        }
        if self.occurred_at.is_none() {
            missing.push(MissingField::OccurredAt);
        }
        if self.description.trim().is_empty() {
            missing.push(MissingField::Description);
        }
        missing
    }

    /// Completeness check. Media may be empty.
    pub fn check_complete(&self) -> Result<CompleteDraft, ValidationError> {
        match (
            self.category,
            self.raw_location,
            self.precision,
            self.occurred_at,
        ) {
            (Some(category), Some(raw_location), Some(precision), Some(occurred_at))
                if !self.description.trim().is_empty() =>
            {
                Ok(CompleteDraft {
                    category,
                    raw_location,
                    precision_m: precision.metres(),
                    occurred_at,
                    description: self.description.clone(),
                    media: self.media.clone(),
                })
            }
            _ => Err(ValidationError::Incomplete(self.missing_fields())),
        }
    }
}
