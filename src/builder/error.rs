//! Build errors for the machine builder.

use crate::core::ConfigurationError;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(name) before .build()")]
    MissingInitialState,

    /// Every problem found in the declared graph, not just the first one.
    #[error("Invalid machine configuration: {}", summarize(.0))]
    Invalid(Vec<ConfigurationError>),
}

impl BuildError {
    /// The individual configuration errors, empty for `MissingInitialState`.
    pub fn errors(&self) -> &[ConfigurationError] {
        match self {
            Self::MissingInitialState => &[],
            Self::Invalid(errors) => errors,
        }
    }
}

fn summarize(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
