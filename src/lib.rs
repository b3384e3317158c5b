//! Turnstile: an embeddable finite state machine engine
//!
//! Callers declare named states, named events mapping source states to a
//! destination state, and optional guards and hooks. The machine checks
//! each firing request against its current state and runs the hooks in a
//! fixed order around a single state change.
//!
//! # Core Concepts
//!
//! - **State**: a named node with optional entry/exit hooks
//! - **Event**: a named trigger with one destination per source state
//! - **Guard**: a pure predicate that may veto a firing
//! - **Transition**: the record of one firing, shared by every hook
//! - **Machine**: owns the registries and the current state, fires events
//!
//! Firing order is: guard, source exit, event will-fire, state change,
//! destination entry, event did-fire.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use turnstile::builder::{EventDef, MachineBuilder};
//! use turnstile::core::State;
//! use turnstile::machine::FiringError;
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//! let entered = Arc::clone(&log);
//!
//! let machine = MachineBuilder::<()>::new()
//!     .initial("Locked")
//!     .state(State::new("Locked"))
//!     .state(State::new("Unlocked").on_entry(move |state, _| {
//!         entered.lock().unwrap().push(state.name().to_string());
//!         Ok(())
//!     }))
//!     .event(EventDef::new("unlock").transition(["Locked"], "Unlocked"))
//!     .event(EventDef::new("lock").transition(["Unlocked"], "Locked"))
//!     .build()
//!     .unwrap();
//!
//! assert!(matches!(
//!     machine.fire("lock"),
//!     Err(FiringError::NoTransitionForCurrentState { .. })
//! ));
//! machine.fire("unlock").unwrap();
//! assert!(machine.is_in_state("Unlocked"));
//! assert_eq!(*log.lock().unwrap(), vec!["Unlocked".to_string()]);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use crate::builder::{BuildError, EventDef, MachineBuilder};
pub use crate::checkpoint::{CheckpointError, MachineSnapshot};
pub use crate::core::{ConfigurationError, Event, Guard, HookError, State, Transition};
pub use crate::machine::{FiringError, Machine};
