//! Moderation queue operations.
//!
//! Lists pending incidents with their media and applies approve/reject
//! decisions. Every call needs a [`ModeratorSession`]. No notification is
//! sent anywhere: incidents carry no submitter identity.

use std::collections::HashMap;

use crate::error::ModerationError;
use crate::storage::backend::IncidentBackend;
use crate::storage::models::{Incident, IncidentStatus, Media};

use super::gate::ModeratorSession;
use super::state::{ModerationAction, ModerationStateMachine};

/// A pending incident with its attachments, as shown in the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingItem {
    pub incident: Incident,
    pub media: Vec<Media>,
}

/// Moderation operations over a backend.
pub struct ModerationService<B> {
    backend: B,
}

impl<B: IncidentBackend> ModerationService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Pending incidents, newest first, each with its media.
    pub fn list_pending(
        &self,
        session: &ModeratorSession,
    ) -> Result<Vec<PendingItem>, ModerationError> {
        let ctx = session.log_context();
        let incidents = self.backend.list_pending_incidents()?;
        if incidents.is_empty() {
            crate::log_debug!(ctx, "MODERATION_QUEUE_EMPTY");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = incidents.iter().map(|i| i.id.clone()).collect();
        let mut media_by_incident: HashMap<String, Vec<Media>> = HashMap::new();
        for media in self.backend.media_for_incidents(&ids)? {
            media_by_incident
                .entry(media.incident_id.clone())
                .or_default()
                .push(media);
        }

        crate::log_info!(ctx, "MODERATION_QUEUE_LOADED", pending = incidents.len());
        Ok(incidents
            .into_iter()
            .filter(|i| i.status == IncidentStatus::Pending)
            .map(|incident| {
                let media = media_by_incident.remove(&incident.id).unwrap_or_default();
                PendingItem { incident, media }
            })
            .collect())
    }

    pub fn approve(&self, session: &ModeratorSession, id: &str) -> Result<(), ModerationError> {
        self.decide(session, id, ModerationAction::Approve)
    }

    pub fn reject(&self, session: &ModeratorSession, id: &str) -> Result<(), ModerationError> {
        self.decide(session, id, ModerationAction::Reject)
    }

    /// Apply an explicit target status. Only approved or rejected are
    /// reachable.
    pub fn update_status(
        &self,
        session: &ModeratorSession,
        id: &str,
        status: IncidentStatus,
    ) -> Result<(), ModerationError> {
        let action = match status {
            IncidentStatus::Approved => ModerationAction::Approve,
            IncidentStatus::Rejected => ModerationAction::Reject,
            IncidentStatus::Pending => {
                return Err(ModerationError::InvalidTransition {
                    from: IncidentStatus::Pending,
                    to: IncidentStatus::Pending,
                })
            }
        };
        self.decide(session, id, action)
    }

    fn decide(
        &self,
        session: &ModeratorSession,
        id: &str,
        action: ModerationAction,
    ) -> Result<(), ModerationError> {
        let ctx = session.review_context(id);
        // The backend holds the current status; it re-checks the transition.
        let target = ModerationStateMachine::apply(ModerationStateMachine::INITIAL, action)?;

        match self.backend.update_incident_status(id, target) {
            Ok(()) => {
                crate::log_info!(ctx, "MODERATION_DECIDED", status = target.as_str());
                Ok(())
            }
            Err(crate::error::BackendError::InvalidTransition { from, to }) => {
                crate::log_warn!(ctx, "MODERATION_INVALID_TRANSITION", from = from.as_str(), to = to.as_str());
                Err(ModerationError::InvalidTransition { from, to })
            }
            Err(e) => {
                crate::log_error!(ctx, "MODERATION_UPDATE_FAILED", error = e.to_string());
                Err(e.into())
            }
        }
    }
}
