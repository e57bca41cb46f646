//! Shared-secret moderation gate.
//!
//! Moderation is off unless enabled in config. Unlocking compares SHA-256
//! digests of the entered code and the configured code; a successful
//! unlock yields a [`ModeratorSession`] which every moderation call takes.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ModerationError;
use crate::logging::structured::LogContext;

/// Compute SHA-256 hash of a code, hex encoded.
pub fn code_digest(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Byte comparison that does not stop at the first difference.
fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

/// Proof that the moderator code was entered. Not constructible elsewhere.
#[derive(Debug, Clone)]
pub struct ModeratorSession {
    session_id: String,
}

impl ModeratorSession {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::moderator(&self.session_id)
    }

    /// Log context for a decision on one incident.
    pub fn review_context(&self, incident_id: &str) -> LogContext {
        self.log_context().with_incident(incident_id)
    }
}

/// Gate holding the digest of the configured moderator code.
#[derive(Debug, Clone)]
pub struct ModeratorGate {
    enabled: bool,
    code_digest: String,
}

impl ModeratorGate {
    pub fn new(enabled: bool, moderator_code: &str) -> Self {
        Self {
            enabled,
            code_digest: code_digest(moderator_code),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.moderation_enabled, &config.moderator_code)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn unlock(&self, entered_code: &str) -> Result<ModeratorSession, ModerationError> {
        if !self.enabled {
            log::warn!("MODERATION_UNLOCK_DENIED reason=disabled");
            return Err(ModerationError::Disabled);
        }
        if !digests_match(&code_digest(entered_code), &self.code_digest) {
            log::warn!("MODERATION_UNLOCK_DENIED reason=invalid_code");
            return Err(ModerationError::InvalidCode);
        }

        let session = ModeratorSession {
            session_id: format!("mod-{}", &Uuid::new_v4().to_string()[..8]),
        };
        log::info!("{} MODERATION_UNLOCKED", session.log_context());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_digest() {
        let hash = code_digest("secret");
        assert_eq!(hash.len(), 64); // SHA-256 = 32 bytes = 64 hex chars
        assert_eq!(hash, code_digest("  secret "));
        assert_ne!(hash, code_digest("Secret"));
    }

    #[test]
    fn test_unlock() {
        let gate = ModeratorGate::new(true, "letmein");
        let session = gate.unlock("letmein").unwrap();
        assert!(session.session_id().starts_with("mod-"));
        assert_eq!(
            session.review_context("inc-1").to_string(),
            format!("[moderator={}] [incident=inc-1]", session.session_id())
        );
        assert_eq!(gate.unlock("wrong").unwrap_err(), ModerationError::InvalidCode);
    }

    #[test]
    fn test_disabled_gate_never_unlocks() {
        let gate = ModeratorGate::new(false, "letmein");
        assert_eq!(gate.unlock("letmein").unwrap_err(), ModerationError::Disabled);
    }

    #[test]
    fn test_digest_compare() {
        assert!(digests_match("abc", "abc"));
        assert!(!digests_match("abc", "abd"));
        assert!(!digests_match("abc", "abcd"));
    }
}
