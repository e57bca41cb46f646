//! Structured logging for reporter and moderator sessions.
//!
//! Every line carries the acting role and its short-lived session id, plus
//! the incident id once one exists. Nothing here identifies a submitter:
//! session ids are random per flow and never persisted. Raw coordinates and
//! description text are never logged; log lengths, reason codes and ids.

use std::fmt;

/// Initialize the process-wide logger.
///
/// Safe to call repeatedly; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}

/// Who acts in a logged session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    /// Anonymous submitter walking the report wizard.
    Reporter,
    /// Holder of an unlocked moderator gate.
    Moderator,
}

impl SessionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionRole::Reporter => "reporter",
            SessionRole::Moderator => "moderator",
        }
    }
}

/// Log prefix for one reporting or moderation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub role: SessionRole,
    pub session_id: String,
    pub incident_id: Option<String>,
}

impl LogContext {
    pub fn reporter(session_id: &str) -> Self {
        Self::for_role(SessionRole::Reporter, session_id)
    }

    pub fn moderator(session_id: &str) -> Self {
        Self::for_role(SessionRole::Moderator, session_id)
    }

    fn for_role(role: SessionRole, session_id: &str) -> Self {
        Self {
            role,
            session_id: session_id.to_string(),
            incident_id: None,
        }
    }

    /// Same session, scoped to the incident being created or reviewed.
    pub fn with_incident(&self, incident_id: &str) -> Self {
        Self {
            incident_id: Some(incident_id.to_string()),
            ..self.clone()
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}={}]", self.role.as_str(), self.session_id)?;
        if let Some(iid) = &self.incident_id {
            write!(f, " [incident={}]", iid)?;
        }
        Ok(())
    }
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*) $(, $value)*)
        );
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*) $(, $value)*)
        );
    };
}

/// Log an error message with context.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::error!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*) $(, $value)*)
        );
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::debug!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*) $(, $value)*)
        );
    };
}
