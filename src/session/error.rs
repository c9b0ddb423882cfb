//! Session engine error types.
//!
//! These errors are caller-visible: the UI layer decides whether to
//! re-prompt or ignore them. A failed call never changes engine state.

use thiserror::Error;

use crate::types::SessionStatus;

/// Errors returned by the session timer engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The step sequence is empty or malformed; no session was created.
    #[error("invalid recipe: {0}")]
    InvalidSpec(String),

    /// The operation is not allowed in the current session status.
    #[error("cannot {operation} while the session is {status}")]
    IllegalTransition {
        /// Name of the rejected operation
        operation: &'static str,
        /// Status at the time of the call
        status: SessionStatus,
    },
}

impl SessionError {
    pub(crate) fn illegal(operation: &'static str, status: SessionStatus) -> Self {
        Self::IllegalTransition { operation, status }
    }

    /// Returns true if this error rejected a state transition.
    #[must_use]
    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, Self::IllegalTransition { .. })
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::InvalidSpec(_) => "check the recipe file: steps need increasing ordinals and positive durations",
            Self::IllegalTransition { status, .. } if status.is_terminal() => {
                "this session has ended; start a new one"
            }
            Self::IllegalTransition {
                status: SessionStatus::StepJustCompleted,
                ..
            } => "the step is done; move on to the next step",
            Self::IllegalTransition { .. } => "start a session first",
        }
    }
}
