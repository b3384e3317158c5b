//! Name-based event declarations for the machine builder.

use crate::core::{Event, EventHook, Guard, HookResult, Transition};
use std::sync::Arc;

/// A declared transition group: source state names and a destination name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TransitionDef {
    pub(crate) sources: Vec<String>,
    pub(crate) destination: String,
}

/// Declaration of an event by state *names*, resolved when the machine is
/// built.
///
/// # Example
///
/// ```rust
/// use turnstile::builder::EventDef;
///
/// let advance: EventDef = EventDef::new("advance")
///     .transition(["Draft"], "Review")
///     .transition(["Review"], "Published")
///     .should_fire(|_event, transition| transition.source().name() != "Archived");
///
/// assert_eq!(advance.name(), "advance");
/// ```
pub struct EventDef<P = ()> {
    pub(crate) name: String,
    pub(crate) transitions: Vec<TransitionDef>,
    pub(crate) guard: Option<Guard<P>>,
    pub(crate) will_fire: Option<EventHook<P>>,
    pub(crate) did_fire: Option<EventHook<P>>,
}

impl<P> EventDef<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: Vec::new(),
            guard: None,
            will_fire: None,
            did_fire: None,
        }
    }

    /// Map every named source state to the named destination.
    ///
    /// Groups must be disjoint; overlaps are reported by
    /// [`MachineBuilder::build`](super::MachineBuilder::build).
    pub fn transition<I, S>(mut self, sources: I, destination: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transitions.push(TransitionDef {
            sources: sources.into_iter().map(Into::into).collect(),
            destination: destination.into(),
        });
        self
    }

    pub fn guard(mut self, guard: Guard<P>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn should_fire<F>(self, predicate: F) -> Self
    where
        F: Fn(&Event<P>, &Transition<'_, P>) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    pub fn will_fire<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event<P>, &Transition<'_, P>) -> HookResult + Send + Sync + 'static,
    {
        self.will_fire = Some(Arc::new(hook));
        self
    }

    pub fn did_fire<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event<P>, &Transition<'_, P>) -> HookResult + Send + Sync + 'static,
    {
        self.did_fire = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
