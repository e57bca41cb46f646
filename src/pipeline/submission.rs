//! Incident submission pipeline.
//!
//! Coordinates the full submission workflow:
//! 1. Draft completeness check
//! 2. PII screen on the description
//! 3. Cooldown check
//! 4. Coordinate rounding
//! 5. Incident creation (pending)
//! 6. Media upload and linking, per attachment
//! 7. Cooldown record and draft reset
//!
//! Steps 1-4 have no side effects. A failure in step 5 leaves the draft
//! intact for a retry and records nothing. Once step 5 succeeds the
//! incident stands; media failures are only reported.

use chrono::{DateTime, Utc};

use crate::cooldown::guard::SubmissionCooldownGuard;
use crate::cooldown::store::SecureStore;
use crate::draft::ReportDraft;
use crate::error::{MediaUploadError, SubmissionError};
use crate::geo::{round_coordinates, RoundedCoordinates};
use crate::security::pii::validate_description;
use crate::storage::backend::IncidentBackend;
use crate::storage::models::NewIncident;

use super::context::SubmissionContext;
use super::media::{attach_media, MediaLoader};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub incident_id: String,
    /// Coordinates as persisted.
    pub rounded: RoundedCoordinates,
    pub precision_m: u32,
    /// Storage paths of linked attachments.
    pub linked_media: Vec<String>,
    pub media_failures: Vec<MediaUploadError>,
}

impl SubmissionReceipt {
    /// Per-attachment messages for the submitter, e.g. "Foto 2 fehlgeschlagen".
    pub fn media_failure_messages(&self) -> Vec<String> {
        self.media_failures.iter().map(|f| f.user_message()).collect()
    }
}

/// Composition root for anonymous incident submission.
pub struct IncidentSubmissionPipeline<B, S, L> {
    backend: B,
    cooldown: SubmissionCooldownGuard<S>,
    loader: L,
}

impl<B, S, L> IncidentSubmissionPipeline<B, S, L>
where
    B: IncidentBackend,
    S: SecureStore,
    L: MediaLoader,
{
    pub fn new(backend: B, cooldown: SubmissionCooldownGuard<S>, loader: L) -> Self {
        Self {
            backend,
            cooldown,
            loader,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cooldown(&self) -> &SubmissionCooldownGuard<S> {
        &self.cooldown
    }

    pub fn submit(
        &self,
        draft: &mut ReportDraft,
        ctx: &SubmissionContext,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.submit_at(draft, ctx, Utc::now())
    }

    /// Submit with an explicit clock reading for the cooldown.
    pub fn submit_at(
        &self,
        draft: &mut ReportDraft,
        ctx: &SubmissionContext,
        now: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let log_ctx = ctx.log_context();
        crate::log_debug!(log_ctx, "SUBMISSION_START", media = draft.media().len());

        // [1] COMPLETENESS
        let complete = match draft.check_complete() {
            Ok(complete) => complete,
            Err(e) => {
                crate::log_info!(log_ctx, "SUBMISSION_INCOMPLETE", missing = draft.missing_fields());
                return Err(e.into());
            }
        };

        // [2] PII SCREEN
        if let Err(reason) = validate_description(&complete.description).into_result() {
            crate::log_info!(log_ctx, "SUBMISSION_PII_REJECTED", reason = reason.code());
            return Err(SubmissionError::PiiRejected(reason));
        }

        // [3] COOLDOWN
        let decision = self.cooldown.can_submit_at(now);
        if !decision.allowed {
            let retry_after_secs = decision.retry_after_secs.unwrap_or(0);
            crate::log_info!(
                log_ctx,
                "SUBMISSION_RATE_LIMITED",
                retry_after_secs = retry_after_secs
            );
            return Err(SubmissionError::RateLimited { retry_after_secs });
        }

        // [4] ROUNDING
        let rounded = round_coordinates(
            complete.raw_location.latitude,
            complete.raw_location.longitude,
            complete.precision_m as f64,
        )?;

        // [5] PERSIST
        let new_incident = NewIncident::pending(
            complete.category,
            &complete.description,
            complete.occurred_at,
            rounded,
            complete.precision_m,
        );
        let incident_id = match self.backend.create_incident(&new_incident) {
            Ok(id) => id,
            Err(e) => {
                crate::log_warn!(log_ctx, "SUBMISSION_PERSIST_FAILED", error = e.to_string());
                return Err(SubmissionError::Persistence(e));
            }
        };
        let incident_ctx = ctx.incident_context(&incident_id);
        crate::log_info!(
            incident_ctx,
            "INCIDENT_CREATED",
            category = complete.category.as_str(),
            lat = rounded.lat,
            lon = rounded.lon,
            precision_m = complete.precision_m
        );

        // [6] MEDIA
        let media = attach_media(
            &self.backend,
            &self.loader,
            &incident_id,
            &complete.media,
            &incident_ctx,
        );

        // [7] RECORD + RESET
        self.cooldown.record_submission_at(now);
        draft.reset();

        crate::log_info!(
            incident_ctx,
            "SUBMISSION_COMPLETE",
            media_linked = media.linked.len(),
            media_failed = media.failures.len()
        );

        Ok(SubmissionReceipt {
            incident_id,
            rounded,
            precision_m: complete.precision_m,
            linked_media: media.linked,
            media_failures: media.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::cooldown::guard::COOLDOWN_STORAGE_KEY;
    use crate::cooldown::store::MemorySecureStore;
    use crate::draft::{MissingField, OccurredAt};
    use crate::error::BackendError;
    use crate::geo::{Coordinates, PrecisionRadius};
    use crate::pipeline::media::MemoryMediaLoader;
    use crate::security::pii::PiiReason;
    use crate::storage::memory::InMemoryBackend;
    use crate::storage::models::{IncidentCategory, IncidentStatus, MediaKind};

    type TestPipeline<'a> =
        IncidentSubmissionPipeline<&'a InMemoryBackend, MemorySecureStore, MemoryMediaLoader>;

    fn pipeline(backend: &InMemoryBackend) -> TestPipeline<'_> {
        let mut loader = MemoryMediaLoader::new();
        loader.insert("photo-1.jpg", b"one".to_vec());
        loader.insert("photo-2.jpg", b"two".to_vec());
        loader.insert("clip-3.mp4", b"three".to_vec());
        IncidentSubmissionPipeline::new(
            backend,
            SubmissionCooldownGuard::new(MemorySecureStore::new()),
            loader,
        )
    }

    fn draft() -> ReportDraft {
        let mut draft = ReportDraft::new();
        draft.set_category(IncidentCategory::Threat);
        draft.set_location(Coordinates::new(52.5200, 13.4050), PrecisionRadius::M500);
        draft.set_occurred_at(OccurredAt::Now);
        draft.set_description("  Bedrohung vor dem Jugendzentrum  ");
        draft
    }

    fn history_len(pipeline: &TestPipeline<'_>) -> usize {
        pipeline
            .cooldown()
            .store()
            .get(COOLDOWN_STORAGE_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str::<Vec<i64>>(&raw).unwrap().len())
            .unwrap_or(0)
    }

    #[test]
    fn test_successful_submission() {
        let backend = InMemoryBackend::new();
        let pipeline = pipeline(&backend);
        let mut draft = draft();
        let ctx = SubmissionContext::new();

        let receipt = pipeline.submit(&mut draft, &ctx).unwrap();

        assert_eq!(backend.status_of(&receipt.incident_id), Some(IncidentStatus::Pending));
        assert_eq!(receipt.rounded, round_coordinates(52.5200, 13.4050, 500.0).unwrap());
        assert_eq!(receipt.precision_m, 500);
        assert!(draft.is_empty());
        assert_eq!(history_len(&pipeline), 1);

        let pending = backend.list_pending_incidents().unwrap();
        assert_eq!(pending[0].description, "Bedrohung vor dem Jugendzentrum");
        assert_eq!(pending[0].region_text, None);
        assert_ne!(pending[0].lat, 52.5200);
    }

    #[test]
    fn test_incomplete_draft_never_reaches_backend() {
        let backend = InMemoryBackend::new();
        let pipeline = pipeline(&backend);
        let mut draft = ReportDraft::new();
        draft.set_category(IncidentCategory::Other);

        let err = pipeline
            .submit(&mut draft, &SubmissionContext::new())
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Incomplete(ref missing) if missing.contains(&MissingField::Location)));
        assert_eq!(backend.calls().total_writes(), 0);
        assert_eq!(draft.category(), Some(IncidentCategory::Other));
        assert_eq!(history_len(&pipeline), 0);
    }

    #[test]
    fn test_pii_is_rechecked() {
        let backend = InMemoryBackend::new();
        let pipeline = pipeline(&backend);
        let mut draft = draft();
        draft.set_description("Treffpunkt war Hauptstraße 12 gestern");

        let err = pipeline
            .submit(&mut draft, &SubmissionContext::new())
            .unwrap_err();
        assert_eq!(err, SubmissionError::PiiRejected(PiiReason::ExactAddress));
        assert_eq!(backend.calls().total_writes(), 0);
        assert!(!draft.is_empty());
    }

    #[test]
    fn test_rate_limited_after_three() {
        let backend = InMemoryBackend::new();
        let pipeline = pipeline(&backend);
        let ctx = SubmissionContext::new();
        let start = Utc::now();

        for i in 0..3 {
            let mut d = draft();
            pipeline
                .submit_at(&mut d, &ctx, start + Duration::seconds(i * 60))
                .unwrap();
        }

        let mut fourth = draft();
        let err = pipeline
            .submit_at(&mut fourth, &ctx, start + Duration::seconds(180))
            .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::RateLimited {
                retry_after_secs: 1620
            }
        );
        assert_eq!(backend.incident_count(), 3);
        assert!(!fourth.is_empty());

        // Oldest leaves the window
        pipeline
            .submit_at(&mut fourth, &ctx, start + Duration::seconds(1800))
            .unwrap();
        assert_eq!(backend.incident_count(), 4);
    }

    #[test]
    fn test_persistence_failure_keeps_draft_and_history() {
        let backend = InMemoryBackend::new();
        backend.fail_create_with(Some(BackendError::Connection("offline".to_string())));
        let pipeline = pipeline(&backend);
        let mut draft = draft();
        draft.add_media("photo-1.jpg", MediaKind::Image);
        let before = draft.clone();

        let err = pipeline
            .submit(&mut draft, &SubmissionContext::new())
            .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::Persistence(BackendError::Connection("offline".to_string()))
        );
        assert_eq!(draft, before);
        assert_eq!(history_len(&pipeline), 0);
        assert_eq!(backend.calls().upload_media, 0);

        // Retry succeeds with the preserved draft
        backend.fail_create_with(None);
        let receipt = pipeline
            .submit(&mut draft, &SubmissionContext::new())
            .unwrap();
        assert_eq!(receipt.linked_media.len(), 1);
    }

    #[test]
    fn test_one_failing_attachment_of_three() {
        let backend = InMemoryBackend::new();
        backend.fail_upload_call(2);
        let pipeline = pipeline(&backend);
        let mut draft = draft();
        draft.add_media("photo-1.jpg", MediaKind::Image);
        draft.add_media("photo-2.jpg", MediaKind::Image);
        draft.add_media("clip-3.mp4", MediaKind::Video);

        let receipt = pipeline
            .submit(&mut draft, &SubmissionContext::new())
            .unwrap();

        assert_eq!(receipt.linked_media.len(), 2);
        assert_eq!(receipt.media_failures.len(), 1);
        assert_eq!(receipt.media_failures[0].index, 1);
        assert_eq!(
            receipt.media_failure_messages(),
            vec!["Foto 2 fehlgeschlagen".to_string()]
        );
        assert_eq!(backend.media_of(&receipt.incident_id).len(), 2);
        assert_eq!(backend.status_of(&receipt.incident_id), Some(IncidentStatus::Pending));
        // Submission still counts and the draft is consumed
        assert_eq!(history_len(&pipeline), 1);
        assert!(draft.is_empty());
    }

    #[test]
    fn test_invalid_coordinates_rejected_before_persist() {
        let backend = InMemoryBackend::new();
        let pipeline = pipeline(&backend);
        let mut draft = draft();
        draft.set_location(Coordinates::new(f64::NAN, 13.0), PrecisionRadius::M500);

        let err = pipeline
            .submit(&mut draft, &SubmissionContext::new())
            .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidCoordinates(_)));
        assert_eq!(backend.calls().total_writes(), 0);
    }
}
