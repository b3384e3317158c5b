//! The machine and its firing protocol.
//!
//! Firing an event goes through a fixed sequence:
//!
//! 1. resolve the event by name and its destination for the current state
//! 2. ask the event's guard; a veto stops here with nothing changed
//! 3. run the source state's exit hook, then the event's will-fire hook
//! 4. commit the destination as the current state and log the firing
//! 5. run the destination state's entry hook, then the event's did-fire hook
//!
//! A hook error stops the sequence where it happened. Failures in step 3
//! leave the machine in the source state; failures in step 5 leave it in
//! the destination state, which was already committed.

#[allow(clippy::module_inception)]
mod machine;

mod error;

pub use error::FiringError;
pub use machine::Machine;
