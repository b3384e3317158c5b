//! Named states with optional entry and exit hooks.

use super::hook::{HookResult, StateHook};
use super::transition::Transition;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A named node of a state machine.
///
/// States are immutable once shared: hooks are attached with the consuming
/// setters before the state is wrapped in an [`Arc`] and registered with a
/// [`Machine`](crate::machine::Machine). Two states are equal when their
/// names are equal; the machine registry guarantees names are unique.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use turnstile::core::State;
///
/// let locked: State = State::new("Locked")
///     .on_exit(|state, transition| {
///         assert_eq!(state.name(), transition.source().name());
///         Ok(())
///     });
///
/// let locked = Arc::new(locked);
/// assert_eq!(locked.name(), "Locked");
/// assert!(locked.has_exit_hook());
/// assert!(!locked.has_entry_hook());
/// ```
pub struct State<P = ()> {
    name: String,
    on_entry: Option<StateHook<P>>,
    on_exit: Option<StateHook<P>>,
}

impl<P> State<P> {
    /// Create a state with no hooks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_entry: None,
            on_exit: None,
        }
    }

    /// Run `hook` whenever the machine transitions into this state.
    ///
    /// It runs after the current state has been updated.
    pub fn on_entry<F>(mut self, hook: F) -> Self
    where
        F: Fn(&State<P>, &Transition<'_, P>) -> HookResult + Send + Sync + 'static,
    {
        self.on_entry = Some(Arc::new(hook));
        self
    }

    /// Run `hook` whenever the machine transitions out of this state.
    ///
    /// It runs before the event's will-fire hook, while the machine is
    /// still in this state.
    pub fn on_exit<F>(mut self, hook: F) -> Self
    where
        F: Fn(&State<P>, &Transition<'_, P>) -> HookResult + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_entry_hook(&self) -> bool {
        self.on_entry.is_some()
    }

    pub fn has_exit_hook(&self) -> bool {
        self.on_exit.is_some()
    }

    pub(crate) fn enter(&self, transition: &Transition<'_, P>) -> HookResult {
        self.on_entry
            .as_ref()
            .map_or(Ok(()), |hook| hook(self, transition))
    }

    pub(crate) fn exit(&self, transition: &Transition<'_, P>) -> HookResult {
        self.on_exit
            .as_ref()
            .map_or(Ok(()), |hook| hook(self, transition))
    }
}

impl<P> PartialEq for State<P> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<P> Eq for State<P> {}

impl<P> Hash for State<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<P> fmt::Debug for State<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("on_entry", &self.on_entry.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

impl<P> fmt::Display for State<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
