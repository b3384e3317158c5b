//! Core state machine types.
//!
//! This module contains the building blocks a machine is declared with:
//! - [`State`]: named nodes with entry/exit hooks
//! - [`Event`]: named triggers with a per-source destination map
//! - [`Guard`]: pure predicates that may veto a firing
//! - [`Transition`]: the record of one firing, shared by every hook
//! - [`TransitionHistory`]: the log of committed firings

mod error;
mod event;
mod guard;
mod history;
mod hook;
mod state;
mod transition;

pub use error::ConfigurationError;
pub use event::Event;
pub use guard::Guard;
pub use history::{TransitionHistory, TransitionRecord};
pub use hook::{EventHook, HookError, HookPhase, HookResult, StateHook};
pub use state::State;
pub use transition::Transition;
