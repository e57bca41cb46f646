//! In-memory persistence backend.
//!
//! Mirrors the remote backend's contract (row-level visibility, moderation
//! transitions, private media bucket) for local runs and tests. Failures
//! can be injected per call to exercise the pipeline's error paths.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{BackendError, ModerationError};
use crate::moderation::state::ModerationStateMachine;

use super::backend::IncidentBackend;
use super::models::{
    media_storage_path, Incident, IncidentFilters, IncidentStatus, IncidentWithMedia, Media,
    MediaKind, NewIncident, Pagination,
};

/// Number of calls received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCalls {
    pub create_incident: usize,
    pub upload_media: usize,
    pub link_media: usize,
    pub update_status: usize,
}

impl BackendCalls {
    pub fn total_writes(&self) -> usize {
        self.create_incident + self.upload_media + self.link_media + self.update_status
    }
}

#[derive(Debug, Default)]
struct State {
    incidents: Vec<Incident>,
    media: Vec<Media>,
    objects: HashMap<String, Vec<u8>>,
    calls: BackendCalls,
    fail_create: Option<BackendError>,
    // 1-based call numbers that fail
    fail_uploads: HashSet<usize>,
    fail_links: HashSet<usize>,
}

/// Backend holding all rows in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_incident` call fail with `error` until cleared.
    pub fn fail_create_with(&self, error: Option<BackendError>) {
        self.state.lock().fail_create = error;
    }

    /// Make the n-th `upload_media` call (1-based) fail.
    pub fn fail_upload_call(&self, call: usize) {
        self.state.lock().fail_uploads.insert(call);
    }

    /// Make the n-th `link_media` call (1-based) fail.
    pub fn fail_link_call(&self, call: usize) {
        self.state.lock().fail_links.insert(call);
    }

    pub fn calls(&self) -> BackendCalls {
        self.state.lock().calls
    }

    /// Status of any incident, bypassing visibility rules.
    pub fn status_of(&self, id: &str) -> Option<IncidentStatus> {
        self.state
            .lock()
            .incidents
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.status)
    }

    pub fn incident_count(&self) -> usize {
        self.state.lock().incidents.len()
    }

    pub fn media_of(&self, incident_id: &str) -> Vec<Media> {
        self.state
            .lock()
            .media
            .iter()
            .filter(|m| m.incident_id == incident_id)
            .cloned()
            .collect()
    }

    pub fn object(&self, storage_path: &str) -> Option<Vec<u8>> {
        self.state.lock().objects.get(storage_path).cloned()
    }
}

/// Newest first by `key`; ties keep the later insertion first.
fn newest_first<K: Ord>(rows: &[Incident], key: impl Fn(&Incident) -> K) -> Vec<Incident> {
    let mut out: Vec<Incident> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

impl IncidentBackend for InMemoryBackend {
    fn create_incident(&self, incident: &NewIncident) -> Result<String, BackendError> {
        let mut state = self.state.lock();
        state.calls.create_incident += 1;

        if let Some(err) = state.fail_create.clone() {
            return Err(err);
        }
        if incident.status != ModerationStateMachine::INITIAL {
            return Err(BackendError::Constraint(format!(
                "new incidents must be {}",
                ModerationStateMachine::INITIAL
            )));
        }
        if incident.description.trim().is_empty() {
            return Err(BackendError::Constraint("description is empty".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        state.incidents.push(Incident {
            id: id.clone(),
            created_at: Utc::now(),
            category: incident.category,
            description: incident.description.clone(),
            occurred_at: incident.occurred_at,
            lat: incident.lat,
            lon: incident.lon,
            precision_m: incident.precision_m,
            region_text: incident.region_text.clone(),
            status: incident.status,
        });
        Ok(id)
    }

    fn upload_media(
        &self,
        incident_id: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.state.lock();
        state.calls.upload_media += 1;
        let call = state.calls.upload_media;

        if state.fail_uploads.contains(&call) {
            return Err(BackendError::Connection(format!("upload {} dropped", call)));
        }
        if !state.incidents.iter().any(|i| i.id == incident_id) {
            return Err(BackendError::NotFound(incident_id.to_string()));
        }
        let kind = MediaKind::from_mime_type(mime_type)
            .ok_or_else(|| BackendError::Constraint(format!("unsupported mime type: {}", mime_type)))?;

        let path = media_storage_path(incident_id, kind);
        state.objects.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    fn link_media(
        &self,
        incident_id: &str,
        kind: MediaKind,
        storage_path: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.calls.link_media += 1;
        let call = state.calls.link_media;

        if state.fail_links.contains(&call) {
            return Err(BackendError::Connection(format!("link {} dropped", call)));
        }
        if !state.objects.contains_key(storage_path) {
            return Err(BackendError::NotFound(storage_path.to_string()));
        }

        state.media.push(Media {
            id: Uuid::new_v4().to_string(),
            incident_id: incident_id.to_string(),
            kind,
            storage_path: storage_path.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn list_approved_incidents(
        &self,
        filters: &IncidentFilters,
        pagination: Pagination,
    ) -> Result<Vec<Incident>, BackendError> {
        let state = self.state.lock();
        let visible: Vec<Incident> = state
            .incidents
            .iter()
            .filter(|i| ModerationStateMachine::is_publicly_visible(i.status))
            .filter(|i| filters.matches(i))
            .cloned()
            .collect();

        Ok(newest_first(&visible, |i| i.occurred_at)
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.page_size)
            .collect())
    }

    fn get_approved_incident_by_id(
        &self,
        id: &str,
    ) -> Result<Option<IncidentWithMedia>, BackendError> {
        let state = self.state.lock();
        let incident = state
            .incidents
            .iter()
            .find(|i| i.id == id && ModerationStateMachine::is_publicly_visible(i.status))
            .cloned();

        Ok(incident.map(|incident| {
            let media = state
                .media
                .iter()
                .filter(|m| m.incident_id == incident.id)
                .cloned()
                .collect();
            IncidentWithMedia { incident, media }
        }))
    }

    fn list_pending_incidents(&self) -> Result<Vec<Incident>, BackendError> {
        let state = self.state.lock();
        let pending: Vec<Incident> = state
            .incidents
            .iter()
            .filter(|i| i.status == IncidentStatus::Pending)
            .cloned()
            .collect();
        Ok(newest_first(&pending, |i| i.created_at))
    }

    fn media_for_incidents(&self, incident_ids: &[String]) -> Result<Vec<Media>, BackendError> {
        let state = self.state.lock();
        Ok(state
            .media
            .iter()
            .filter(|m| incident_ids.contains(&m.incident_id))
            .cloned()
            .collect())
    }

    fn update_incident_status(
        &self,
        id: &str,
        status: IncidentStatus,
    ) -> Result<(), BackendError> {
        let mut state = self.state.lock();
        state.calls.update_status += 1;

        let incident = state
            .incidents
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;

        incident.status = ModerationStateMachine::transition(incident.status, status).map_err(
            |err| match err {
                ModerationError::InvalidTransition { from, to } => {
                    BackendError::InvalidTransition { from, to }
                }
                other => BackendError::Other(other.to_string()),
            },
        )?;
        Ok(())
    }

    fn signed_media_url(
        &self,
        storage_path: &str,
        expiry_secs: u64,
    ) -> Result<String, BackendError> {
        let state = self.state.lock();
        if !state.objects.contains_key(storage_path) {
            return Err(BackendError::NotFound(storage_path.to_string()));
        }
        let expires_at = Utc::now().timestamp() + expiry_secs as i64;
        Ok(format!(
            "memory://incident-media/{}?expires={}",
            storage_path, expires_at
        ))
    }
}
