//! End-to-end flow: wizard draft -> submission -> moderation -> public feed.

use reportguard_core::cooldown::{FileSecureStore, MemorySecureStore, SubmissionCooldownGuard};
use reportguard_core::draft::{OccurredAt, ReportDraft};
use reportguard_core::feed::{FeedFilters, IncidentFeed};
use reportguard_core::geo::{round_coordinates, Coordinates, PrecisionRadius};
use reportguard_core::moderation::{ModerationService, ModeratorGate};
use reportguard_core::pipeline::{
    IncidentSubmissionPipeline, MemoryMediaLoader, SubmissionContext,
};
use reportguard_core::storage::{
    IncidentBackend, IncidentCategory, IncidentFilters, IncidentStatus, InMemoryBackend,
    MediaKind, Pagination,
};
use reportguard_core::{Config, SubmissionError};

fn wizard_draft() -> ReportDraft {
    let mut draft = ReportDraft::new();
    draft.set_category(IncidentCategory::Propaganda);
    draft.set_location(Coordinates::new(52.5200, 13.4050), PrecisionRadius::M500);
    draft.set_occurred_at(OccurredAt::Now);
    draft
        .accept_description("Hakenkreuz an die Brücke gesprüht", true)
        .unwrap();
    draft
}

#[test]
fn test_pending_incident_is_invisible_until_approved() {
    reportguard_core::init_logger();
    let backend = InMemoryBackend::new();
    let mut loader = MemoryMediaLoader::new();
    loader.insert("file:///photo.jpg", b"jpeg".to_vec());
    let pipeline = IncidentSubmissionPipeline::new(
        &backend,
        SubmissionCooldownGuard::new(MemorySecureStore::new()),
        loader,
    );

    let mut draft = wizard_draft();
    draft.add_media("file:///photo.jpg", MediaKind::Image);
    let receipt = pipeline
        .submit(&mut draft, &SubmissionContext::new())
        .unwrap();

    assert_eq!(
        backend.status_of(&receipt.incident_id),
        Some(IncidentStatus::Pending)
    );
    let feed = IncidentFeed::new(&backend);
    assert!(feed
        .list(&FeedFilters::default(), None, 0)
        .unwrap()
        .items
        .is_empty());
    assert!(feed.get(&receipt.incident_id).unwrap().is_none());

    let config = Config {
        moderation_enabled: true,
        moderator_code: "review-board".to_string(),
        ..Config::default()
    };
    let gate = ModeratorGate::from_config(&config);
    let session = gate.unlock("review-board").unwrap();
    let moderation = ModerationService::new(&backend);

    let queue = moderation.list_pending(&session).unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].media.len(), 1);

    moderation.approve(&session, &receipt.incident_id).unwrap();

    let page = feed.list(&FeedFilters::default(), None, 0).unwrap();
    assert_eq!(page.items.len(), 1);
    let incident = &page.items[0];
    assert_eq!(incident.id, receipt.incident_id);
    let expected = round_coordinates(52.5200, 13.4050, 500.0).unwrap();
    assert_eq!((incident.lat, incident.lon), (expected.lat, expected.lon));
    assert_eq!(incident.precision_m, 500);

    let detail = feed.get(&receipt.incident_id).unwrap().unwrap();
    let paths: Vec<String> = detail.media.iter().map(|m| m.storage_path.clone()).collect();
    assert_eq!(feed.signed_media_urls(&paths).len(), 1);
}

#[test]
fn test_rejected_incident_never_listed() {
    let backend = InMemoryBackend::new();
    let pipeline = IncidentSubmissionPipeline::new(
        &backend,
        SubmissionCooldownGuard::new(MemorySecureStore::new()),
        MemoryMediaLoader::new(),
    );
    let receipt = pipeline
        .submit(&mut wizard_draft(), &SubmissionContext::new())
        .unwrap();

    let session = ModeratorGate::new(true, "x").unlock("x").unwrap();
    ModerationService::new(&backend)
        .reject(&session, &receipt.incident_id)
        .unwrap();

    assert!(backend
        .list_approved_incidents(&IncidentFilters::default(), Pagination::default())
        .unwrap()
        .is_empty());
    assert!(backend.list_pending_incidents().unwrap().is_empty());
}

#[test]
fn test_cooldown_survives_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let backend = InMemoryBackend::new();

    for _ in 0..3 {
        // Fresh pipeline each time, as after an app restart
        let pipeline = IncidentSubmissionPipeline::new(
            &backend,
            SubmissionCooldownGuard::new(FileSecureStore::new(dir.path())),
            MemoryMediaLoader::new(),
        );
        pipeline
            .submit(&mut wizard_draft(), &SubmissionContext::new())
            .unwrap();
    }

    let pipeline = IncidentSubmissionPipeline::new(
        &backend,
        SubmissionCooldownGuard::new(FileSecureStore::new(dir.path())),
        MemoryMediaLoader::new(),
    );
    let err = pipeline
        .submit(&mut wizard_draft(), &SubmissionContext::new())
        .unwrap_err();
    match err {
        SubmissionError::RateLimited { retry_after_secs } => {
            assert!(retry_after_secs > 0 && retry_after_secs <= 1800)
        }
        other => panic!("expected rate limit, got {:?}", other),
    }
    assert_eq!(backend.incident_count(), 3);
}
