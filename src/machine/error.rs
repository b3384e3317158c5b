//! Errors returned by a firing attempt.

use crate::core::{HookError, HookPhase};
use thiserror::Error;

/// Errors that can occur while firing an event.
///
/// The first four variants are expected outcomes (the caller can, for
/// instance, disable the matching UI action) and never change the current
/// state. [`FiringError::Hook`] carries an error raised by a hook; see
/// [`FiringError::committed`] for where that leaves the machine.
#[derive(Debug, Error)]
pub enum FiringError {
    #[error("No event named '{event}'")]
    UnknownEvent { event: String },

    #[error("Event '{event}' cannot fire from state '{state}'")]
    NoTransitionForCurrentState { event: String, state: String },

    #[error("Guard vetoed event '{event}' from '{from}' to '{to}'")]
    FiringVetoedByGuard {
        event: String,
        from: String,
        to: String,
    },

    #[error("Event '{event}' was fired while another event is firing on the same machine")]
    Reentrant { event: String },

    #[error("The {phase} hook failed while firing '{event}': {source}")]
    Hook {
        event: String,
        phase: HookPhase,
        #[source]
        source: HookError,
    },
}

impl FiringError {
    /// Name of the event the failed request was for.
    pub fn event(&self) -> &str {
        match self {
            Self::UnknownEvent { event }
            | Self::NoTransitionForCurrentState { event, .. }
            | Self::FiringVetoedByGuard { event, .. }
            | Self::Reentrant { event }
            | Self::Hook { event, .. } => event,
        }
    }

    /// Whether the machine had already moved to the destination state.
    ///
    /// Only a failing entry or did-fire hook leaves the state committed.
    pub fn committed(&self) -> bool {
        matches!(self, Self::Hook { phase, .. } if phase.is_after_commit())
    }
}
