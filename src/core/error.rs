//! Configuration errors raised while declaring states and events.

use thiserror::Error;

/// Errors raised at configuration time.
///
/// Every operation that can return one of these is atomic: on error the
/// event or machine being configured is left exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("State '{name}' is already registered")]
    DuplicateStateName { name: String },

    #[error("Event '{name}' is already registered")]
    DuplicateEventName { name: String },

    #[error("State '{state}' is already a source state of event '{event}'")]
    DuplicateSourceState { event: String, state: String },

    #[error("Event '{event}' needs at least one source state per transition")]
    EmptySourceStates { event: String },

    #[error("Event '{event}' references state '{state}', which is not registered with this machine")]
    UnregisteredState { event: String, state: String },

    #[error("Unknown state '{name}'")]
    UnknownState { name: String },
}
