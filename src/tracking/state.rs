//! Tracking activation state machine
//!
//! ```text
//!              create                deactivate
//! Untracked ──────────► Active ◄──────────────► Inactive
//!                         │        activate        │
//!                         └───────► Deleted ◄──────┘
//!                           delete
//! ```
//!
//! There are no automatic transitions.

use serde::Serialize;

/// Lifecycle state of one version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    /// No such version exists
    Untracked,
    /// Statements are appended to the logs
    Active,
    /// Version exists, appends are suppressed
    Inactive,
    /// Version and its logs are gone
    Deleted,
}

/// Operations that move a version between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingAction {
    Create,
    Activate,
    Deactivate,
    Delete,
}

/// Errors produced during state transitions
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("illegal tracking transition: cannot {action:?} while {state:?}")]
    IllegalTransition {
        state: TrackingState,
        action: TrackingAction,
    },
}

impl TrackingState {
    /// State of an existing version given its `active` flag
    pub fn from_active(active: bool) -> Self {
        if active {
            TrackingState::Active
        } else {
            TrackingState::Inactive
        }
    }

    /// Apply an action, returning the next state
    ///
    /// Activating an active version (or deactivating an inactive one) is
    /// allowed and leaves the state unchanged.
    pub fn apply(self, action: TrackingAction) -> Result<TrackingState, StateError> {
        use TrackingAction::*;
        use TrackingState::*;

        match (self, action) {
            (Untracked, Create) => Ok(Active),
            (Active | Inactive, Activate) => Ok(Active),
            (Active | Inactive, Deactivate) => Ok(Inactive),
            (Active | Inactive, Delete) => Ok(Deleted),
            (state, action) => Err(StateError::IllegalTransition { state, action }),
        }
    }

    /// Whether statements are appended in this state
    pub fn records_statements(&self) -> bool {
        matches!(self, TrackingState::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_lifecycle() {
        let state = TrackingState::Untracked;

        let state = state.apply(TrackingAction::Create).unwrap();
        assert_eq!(state, TrackingState::Active);

        let state = state.apply(TrackingAction::Deactivate).unwrap();
        assert_eq!(state, TrackingState::Inactive);
        assert!(!state.records_statements());

        let state = state.apply(TrackingAction::Activate).unwrap();
        assert!(state.records_statements());

        let state = state.apply(TrackingAction::Delete).unwrap();
        assert_eq!(state, TrackingState::Deleted);
    }

    #[test]
    fn test_toggles_are_idempotent() {
        assert_eq!(
            TrackingState::Active.apply(TrackingAction::Activate),
            Ok(TrackingState::Active)
        );
        assert_eq!(
            TrackingState::Inactive.apply(TrackingAction::Deactivate),
            Ok(TrackingState::Inactive)
        );
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        assert!(TrackingState::Untracked.apply(TrackingAction::Activate).is_err());
        assert!(TrackingState::Untracked.apply(TrackingAction::Delete).is_err());
        assert!(TrackingState::Active.apply(TrackingAction::Create).is_err());

        for action in [
            TrackingAction::Create,
            TrackingAction::Activate,
            TrackingAction::Deactivate,
            TrackingAction::Delete,
        ] {
            assert!(matches!(
                TrackingState::Deleted.apply(action),
                Err(StateError::IllegalTransition { .. })
            ));
        }
    }
}
