//! Reporting session context.
//!
//! Provides the session identity used to correlate log lines across one
//! submission flow. Carries no submitter identity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Context for one reporting session.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
}

impl SubmissionContext {
    pub fn new() -> Self {
        Self::with_session_id(&format!("session-{}", &Uuid::new_v4().to_string()[..8]))
    }

    pub fn with_session_id(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::reporter(&self.session_id)
    }

    /// Log context once the backend has assigned an incident id.
    pub fn incident_context(&self, incident_id: &str) -> LogContext {
        self.log_context().with_incident(incident_id)
    }
}

impl Default for SubmissionContext {
    fn default() -> Self {
        Self::new()
    }
}
