//! Builder API for declarative machine construction.
//!
//! [`MachineBuilder`] takes states as values and events as name-based
//! [`EventDef`] declarations, then validates the whole graph in one pass.
//! Validation uses Stillwater's `Validation` to accumulate every problem
//! instead of failing on the first one.

pub mod error;
pub mod event;
pub mod machine;

pub use error::BuildError;
pub use event::EventDef;
pub use machine::MachineBuilder;
