//! The record of a single firing attempt.

use super::event::Event;
use super::state::State;
use crate::machine::Machine;
use std::fmt;
use std::sync::Arc;

/// An immutable description of one firing: which event, from which state,
/// to which state, on which machine, carrying which payload.
///
/// Transitions are only built by the [`Machine`], after it has resolved the
/// destination from the event, so `destination` is always reachable from
/// `source` through `event`. Every hook of the firing borrows the same
/// value, and a successful [`Machine::fire`] hands it back to the caller.
pub struct Transition<'m, P = ()> {
    event: Arc<Event<P>>,
    source: Arc<State<P>>,
    destination: Arc<State<P>>,
    machine: &'m Machine<P>,
    payload: Option<P>,
}

impl<'m, P> Transition<'m, P> {
    pub(crate) fn new(
        event: Arc<Event<P>>,
        source: Arc<State<P>>,
        destination: Arc<State<P>>,
        machine: &'m Machine<P>,
        payload: Option<P>,
    ) -> Self {
        Self {
            event,
            source,
            destination,
            machine,
            payload,
        }
    }

    pub fn event(&self) -> &Arc<Event<P>> {
        &self.event
    }

    /// State the machine was in when the event was fired.
    pub fn source(&self) -> &Arc<State<P>> {
        &self.source
    }

    /// State the event leads to from [`source`](Self::source).
    pub fn destination(&self) -> &Arc<State<P>> {
        &self.destination
    }

    /// The machine the event is being fired on.
    pub fn machine(&self) -> &'m Machine<P> {
        self.machine
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<P> {
        self.payload
    }
}

impl<P: fmt::Debug> fmt::Debug for Transition<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("event", &self.event.name())
            .field("source", &self.source.name())
            .field("destination", &self.destination.name())
            .field("payload", &self.payload)
            .finish()
    }
}
