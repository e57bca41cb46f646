//! Media attachment upload.
//!
//! Each attachment is read from the device, uploaded to the private bucket
//! under the incident id, then linked with a metadata row. Attachments are
//! independent: a failure is recorded for that item only and the rest
//! carry on. Nothing is retried.

use std::collections::HashMap;
use std::fs;

use crate::draft::MediaAttachment;
use crate::error::{MediaStage, MediaUploadError, StorageError};
use crate::logging::structured::LogContext;
use crate::storage::backend::IncidentBackend;

/// Reads picked media from the device.
pub trait MediaLoader {
    fn load(&self, local_reference: &str) -> Result<Vec<u8>, StorageError>;
}

/// Loads `file://` URIs or plain paths from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMediaLoader;

impl MediaLoader for FsMediaLoader {
    fn load(&self, local_reference: &str) -> Result<Vec<u8>, StorageError> {
        let path = local_reference
            .strip_prefix("file://")
            .unwrap_or(local_reference);
        Ok(fs::read(path)?)
    }
}

/// Loads from an in-memory map keyed by local reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryMediaLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryMediaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, local_reference: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(local_reference.into(), bytes);
    }
}

impl MediaLoader for MemoryMediaLoader {
    fn load(&self, local_reference: &str) -> Result<Vec<u8>, StorageError> {
        self.files
            .get(local_reference)
            .cloned()
            .ok_or_else(|| StorageError::Unavailable(format!("no such file: {}", local_reference)))
    }
}

/// Result of uploading a draft's attachments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaOutcome {
    /// Storage paths of attachments that were uploaded and linked.
    pub linked: Vec<String>,
    pub failures: Vec<MediaUploadError>,
}

impl MediaOutcome {
    pub fn all_linked(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Upload and link every attachment, in order, collecting per-item failures.
pub fn attach_media<B, L>(
    backend: &B,
    loader: &L,
    incident_id: &str,
    attachments: &[MediaAttachment],
    ctx: &LogContext,
) -> MediaOutcome
where
    B: IncidentBackend + ?Sized,
    L: MediaLoader + ?Sized,
{
    let mut outcome = MediaOutcome::default();

    for (index, attachment) in attachments.iter().enumerate() {
        match upload_one(backend, loader, incident_id, attachment) {
            Ok(path) => {
                crate::log_debug!(ctx, "MEDIA_LINKED", index = index, kind = attachment.kind.as_str());
                outcome.linked.push(path);
            }
            Err((stage, reason)) => {
                crate::log_warn!(
                    ctx,
                    "MEDIA_FAILED",
                    index = index,
                    stage = stage.as_str(),
                    reason = reason
                );
                outcome.failures.push(MediaUploadError {
                    index,
                    kind: attachment.kind,
                    stage,
                    reason,
                });
            }
        }
    }

    crate::log_info!(
        ctx,
        "MEDIA_COMPLETE",
        linked = outcome.linked.len(),
        failed = outcome.failures.len()
    );
    outcome
}

fn upload_one<B, L>(
    backend: &B,
    loader: &L,
    incident_id: &str,
    attachment: &MediaAttachment,
) -> Result<String, (MediaStage, String)>
where
    B: IncidentBackend + ?Sized,
    L: MediaLoader + ?Sized,
{
    let bytes = loader
        .load(&attachment.local_reference)
        .map_err(|e| (MediaStage::Read, e.to_string()))?;
    let path = backend
        .upload_media(incident_id, &bytes, attachment.kind.mime_type())
        .map_err(|e| (MediaStage::Upload, e.to_string()))?;
    backend
        .link_media(incident_id, attachment.kind, &path)
        .map_err(|e| (MediaStage::Link, e.to_string()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::geo::RoundedCoordinates;
    use crate::storage::memory::InMemoryBackend;
    use crate::storage::models::{IncidentCategory, MediaKind, NewIncident};

    fn incident(backend: &InMemoryBackend) -> String {
        backend
            .create_incident(&NewIncident::pending(
                IncidentCategory::Other,
                "Schmiererei an der Wand",
                Utc::now(),
                RoundedCoordinates { lat: 50.0, lon: 8.0 },
                200,
            ))
            .unwrap()
    }

    fn attachment(reference: &str, kind: MediaKind) -> MediaAttachment {
        MediaAttachment {
            local_reference: reference.to_string(),
            kind,
        }
    }

    #[test]
    fn test_fs_loader_strips_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, b"jpeg-bytes").unwrap();

        let uri = format!("file://{}", path.display());
        assert_eq!(FsMediaLoader.load(&uri).unwrap(), b"jpeg-bytes".to_vec());
        assert!(FsMediaLoader.load("/does/not/exist.jpg").is_err());
    }

    #[test]
    fn test_read_failure_is_isolated() {
        let backend = InMemoryBackend::new();
        let id = incident(&backend);
        let mut loader = MemoryMediaLoader::new();
        loader.insert("a.jpg", b"a".to_vec());
        loader.insert("c.mp4", b"c".to_vec());

        let ctx = LogContext::reporter("session-media");
        let outcome = attach_media(
            &backend,
            &loader,
            &id,
            &[
                attachment("a.jpg", MediaKind::Image),
                attachment("missing.jpg", MediaKind::Image),
                attachment("c.mp4", MediaKind::Video),
            ],
            &ctx,
        );

        assert_eq!(outcome.linked.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].stage, MediaStage::Read);
        assert_eq!(backend.media_of(&id).len(), 2);
        // Nothing was uploaded for the unreadable file
        assert_eq!(backend.calls().upload_media, 2);
    }

    #[test]
    fn test_link_failure_reports_link_stage() {
        let backend = InMemoryBackend::new();
        let id = incident(&backend);
        backend.fail_link_call(1);
        let mut loader = MemoryMediaLoader::new();
        loader.insert("a.jpg", b"a".to_vec());

        let outcome = attach_media(
            &backend,
            &loader,
            &id,
            &[attachment("a.jpg", MediaKind::Image)],
            &LogContext::reporter("session-media"),
        );
        assert!(!outcome.all_linked());
        assert_eq!(outcome.failures[0].stage, MediaStage::Link);
        assert_eq!(outcome.failures[0].user_message(), "Foto 1 fehlgeschlagen");
    }

    #[test]
    fn test_no_attachments() {
        let backend = InMemoryBackend::new();
        let id = incident(&backend);
        let outcome = attach_media(
            &backend,
            &MemoryMediaLoader::new(),
            &id,
            &[],
            &LogContext::reporter("session-media"),
        );
        assert!(outcome.all_linked());
        assert!(outcome.linked.is_empty());
    }
}
