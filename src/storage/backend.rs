//! Persistence backend interface.
//!
//! The backend is an external collaborator reached over blocking network
//! calls. It enforces row-level authorization itself: only approved rows
//! are readable by unprivileged clients.

use crate::error::BackendError;

use super::models::{
    Incident, IncidentFilters, IncidentStatus, IncidentWithMedia, Media, MediaKind, NewIncident,
    Pagination,
};

/// Operations the core consumes from the persistence backend.
pub trait IncidentBackend {
    /// Insert an incident row and return the backend-assigned id.
    fn create_incident(&self, incident: &NewIncident) -> Result<String, BackendError>;

    /// Store media bytes in the private bucket under the incident and
    /// return the storage path.
    fn upload_media(
        &self,
        incident_id: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<String, BackendError>;

    /// Insert the media metadata row for an uploaded object.
    fn link_media(
        &self,
        incident_id: &str,
        kind: MediaKind,
        storage_path: &str,
    ) -> Result<(), BackendError>;

    /// Approved incidents, newest `occurred_at` first.
    fn list_approved_incidents(
        &self,
        filters: &IncidentFilters,
        pagination: Pagination,
    ) -> Result<Vec<Incident>, BackendError>;

    /// An approved incident with its media; `None` when absent or not approved.
    fn get_approved_incident_by_id(
        &self,
        id: &str,
    ) -> Result<Option<IncidentWithMedia>, BackendError>;

    /// Pending incidents, newest `created_at` first. Moderation only.
    fn list_pending_incidents(&self) -> Result<Vec<Incident>, BackendError>;

    /// Media rows for a set of incidents. Moderation only.
    fn media_for_incidents(&self, incident_ids: &[String]) -> Result<Vec<Media>, BackendError>;

    /// Set an incident's moderation status. Moderation only.
    fn update_incident_status(&self, id: &str, status: IncidentStatus)
        -> Result<(), BackendError>;

    /// Short-lived signed URL for a private media object.
    fn signed_media_url(&self, storage_path: &str, expiry_secs: u64)
        -> Result<String, BackendError>;
}

impl<B: IncidentBackend + ?Sized> IncidentBackend for &B {
    fn create_incident(&self, incident: &NewIncident) -> Result<String, BackendError> {
        (**self).create_incident(incident)
    }

    fn upload_media(
        &self,
        incident_id: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<String, BackendError> {
        (**self).upload_media(incident_id, bytes, mime_type)
    }

    fn link_media(
        &self,
        incident_id: &str,
        kind: MediaKind,
        storage_path: &str,
    ) -> Result<(), BackendError> {
        (**self).link_media(incident_id, kind, storage_path)
    }

    fn list_approved_incidents(
        &self,
        filters: &IncidentFilters,
        pagination: Pagination,
    ) -> Result<Vec<Incident>, BackendError> {
        (**self).list_approved_incidents(filters, pagination)
    }

    fn get_approved_incident_by_id(
        &self,
        id: &str,
    ) -> Result<Option<IncidentWithMedia>, BackendError> {
        (**self).get_approved_incident_by_id(id)
    }

    fn list_pending_incidents(&self) -> Result<Vec<Incident>, BackendError> {
        (**self).list_pending_incidents()
    }

    fn media_for_incidents(&self, incident_ids: &[String]) -> Result<Vec<Media>, BackendError> {
        (**self).media_for_incidents(incident_ids)
    }

    fn update_incident_status(
        &self,
        id: &str,
        status: IncidentStatus,
    ) -> Result<(), BackendError> {
        (**self).update_incident_status(id, status)
    }

    fn signed_media_url(
        &self,
        storage_path: &str,
        expiry_secs: u64,
    ) -> Result<String, BackendError> {
        (**self).signed_media_url(storage_path, expiry_secs)
    }
}
