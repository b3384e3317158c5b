//! Guard predicates for controlling event firing.
//!
//! Guards are pure boolean functions that decide whether an event may fire
//! for a given transition. They run before any hook, so a veto has no side
//! effects.

use super::event::Event;
use super::transition::Transition;
use std::fmt;
use std::sync::Arc;

/// Pure predicate that determines if an event can fire.
///
/// A guard sees the event and the fully resolved transition (source,
/// destination and payload). It must not mutate the machine.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use turnstile::core::{Event, Guard, State};
/// use turnstile::machine::Machine;
///
/// let locked: Arc<State<u32>> = Arc::new(State::new("Locked"));
/// let unlocked = Arc::new(State::new("Unlocked"));
///
/// let paid = Guard::new(|_event: &Event<u32>, transition| {
///     transition.payload().is_some_and(|coins| *coins >= 2)
/// });
///
/// let mut machine = Machine::new(Arc::clone(&locked));
/// machine.add_state(Arc::clone(&unlocked)).unwrap();
/// machine
///     .add_event(Event::with_transition("coin", [&locked], &unlocked).unwrap().guard(paid))
///     .unwrap();
///
/// assert!(machine.fire_with("coin", 1).is_err());
/// assert!(machine.fire_with("coin", 2).is_ok());
/// ```
pub struct Guard<P = ()> {
    predicate: Arc<dyn Fn(&Event<P>, &Transition<'_, P>) -> bool + Send + Sync>,
}

impl<P> Guard<P> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be pure (deterministic, no side effects) and
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Event<P>, &Transition<'_, P>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check whether the guard lets `event` fire for `transition`.
    pub fn check(&self, event: &Event<P>, transition: &Transition<'_, P>) -> bool {
        (self.predicate)(event, transition)
    }
}

impl<P> Clone for Guard<P> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<P> fmt::Debug for Guard<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
