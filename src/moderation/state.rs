//! Moderation state machine.
//!
//! ```text
//! pending --approve--> approved
//!    \------reject---> rejected
//! ```
//!
//! Approved and rejected are terminal. Only approved incidents are ever
//! listed to end users.

use crate::error::ModerationError;
use crate::storage::models::IncidentStatus;

/// Decision taken by a moderator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl ModerationAction {
    pub fn target(&self) -> IncidentStatus {
        match self {
            ModerationAction::Approve => IncidentStatus::Approved,
            ModerationAction::Reject => IncidentStatus::Rejected,
        }
    }
}

/// Transition rules for incident status.
pub struct ModerationStateMachine;

impl ModerationStateMachine {
    /// Status every new incident starts in.
    pub const INITIAL: IncidentStatus = IncidentStatus::Pending;

    pub fn is_terminal(status: IncidentStatus) -> bool {
        !matches!(status, IncidentStatus::Pending)
    }

    /// Whether end users may see an incident in this status.
    pub fn is_publicly_visible(status: IncidentStatus) -> bool {
        status == IncidentStatus::Approved
    }

    /// Check a transition and return the new status.
    pub fn transition(
        from: IncidentStatus,
        to: IncidentStatus,
    ) -> Result<IncidentStatus, ModerationError> {
        match (from, to) {
            (IncidentStatus::Pending, IncidentStatus::Approved)
            | (IncidentStatus::Pending, IncidentStatus::Rejected) => Ok(to),
            _ => Err(ModerationError::InvalidTransition { from, to }),
        }
    }

    /// Apply a moderator action to the current status.
    pub fn apply(
        from: IncidentStatus,
        action: ModerationAction,
    ) -> Result<IncidentStatus, ModerationError> {
        Self::transition(from, action.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert_eq!(
            ModerationStateMachine::apply(IncidentStatus::Pending, ModerationAction::Approve),
            Ok(IncidentStatus::Approved)
        );
        assert_eq!(
            ModerationStateMachine::apply(IncidentStatus::Pending, ModerationAction::Reject),
            Ok(IncidentStatus::Rejected)
        );
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        for from in [IncidentStatus::Approved, IncidentStatus::Rejected] {
            assert!(ModerationStateMachine::is_terminal(from));
            for to in [
                IncidentStatus::Pending,
                IncidentStatus::Approved,
                IncidentStatus::Rejected,
            ] {
                assert_eq!(
                    ModerationStateMachine::transition(from, to),
                    Err(ModerationError::InvalidTransition { from, to })
                );
            }
        }
    }

    #[test]
    fn test_pending_to_pending_is_invalid() {
        assert!(ModerationStateMachine::transition(
            IncidentStatus::Pending,
            IncidentStatus::Pending
        )
        .is_err());
    }

    #[test]
    fn test_visibility() {
        assert_eq!(ModerationStateMachine::INITIAL, IncidentStatus::Pending);
        assert!(ModerationStateMachine::is_publicly_visible(
            IncidentStatus::Approved
        ));
        assert!(!ModerationStateMachine::is_publicly_visible(
            IncidentStatus::Pending
        ));
        assert!(!ModerationStateMachine::is_publicly_visible(
            IncidentStatus::Rejected
        ));
    }
}
