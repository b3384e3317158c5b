//! Events: named triggers mapping each source state to one destination.

use super::error::ConfigurationError;
use super::guard::Guard;
use super::hook::{EventHook, HookResult};
use super::state::State;
use super::transition::Transition;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// A named event that moves the machine from one of its source states to
/// the destination registered for that source.
///
/// Different sources may lead to different destinations, so one event name
/// can describe several edges of the graph. Each state is a source at most
/// once per event.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use turnstile::core::{Event, State};
///
/// let draft: Arc<State> = Arc::new(State::new("Draft"));
/// let review = Arc::new(State::new("Review"));
/// let rejected = Arc::new(State::new("Rejected"));
/// let published = Arc::new(State::new("Published"));
///
/// let mut advance = Event::with_transition("advance", [&draft], &review).unwrap();
/// advance.add_transition([&review], &published).unwrap();
///
/// assert_eq!(advance.destination_for(&draft), Some(&review));
/// assert_eq!(advance.destination_for(&review), Some(&published));
/// assert_eq!(advance.destination_for(&rejected), None);
///
/// // `review` is already a source of this event.
/// assert!(advance.add_transition([&review], &rejected).is_err());
/// assert_eq!(advance.destination_for(&review), Some(&published));
/// ```
pub struct Event<P = ()> {
    name: String,
    sources: Vec<Arc<State<P>>>,
    destinations: HashMap<String, Arc<State<P>>>,
    pub(crate) guard: Option<Guard<P>>,
    pub(crate) will_fire: Option<EventHook<P>>,
    pub(crate) did_fire: Option<EventHook<P>>,
}

impl<P> Event<P> {
    /// Create an event with no transitions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            destinations: HashMap::new(),
            guard: None,
            will_fire: None,
            did_fire: None,
        }
    }

    /// Create an event and register `sources -> destination` in one step.
    ///
    /// Fails with [`ConfigurationError::EmptySourceStates`] when `sources`
    /// is empty.
    pub fn with_transition<'a, I>(
        name: impl Into<String>,
        sources: I,
        destination: &Arc<State<P>>,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = &'a Arc<State<P>>>,
        P: 'a,
    {
        let mut event = Self::new(name);
        event.add_transition(sources, destination)?;
        Ok(event)
    }

    /// Map every state in `sources` to `destination`.
    ///
    /// The new sources must be disjoint from the sources already registered
    /// for this event and from each other. Otherwise the whole call is
    /// rejected with [`ConfigurationError::DuplicateSourceState`] and the
    /// event is left unchanged. Calling this several times with the same
    /// destination is allowed.
    pub fn add_transition<'a, I>(
        &mut self,
        sources: I,
        destination: &Arc<State<P>>,
    ) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = &'a Arc<State<P>>>,
        P: 'a,
    {
        let sources: Vec<&Arc<State<P>>> = sources.into_iter().collect();
        if sources.is_empty() {
            return Err(ConfigurationError::EmptySourceStates {
                event: self.name.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(sources.len());
        for source in &sources {
            if self.destinations.contains_key(source.name()) || !seen.insert(source.name()) {
                return Err(ConfigurationError::DuplicateSourceState {
                    event: self.name.clone(),
                    state: source.name().to_string(),
                });
            }
        }

        for source in sources {
            self.destinations
                .insert(source.name().to_string(), Arc::clone(destination));
            self.sources.push(Arc::clone(source));
        }
        Ok(())
    }

    /// Veto firing unless `guard` passes.
    pub fn guard(mut self, guard: Guard<P>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Veto firing unless `predicate` returns `true`.
    pub fn should_fire<F>(self, predicate: F) -> Self
    where
        F: Fn(&Event<P>, &Transition<'_, P>) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Run `hook` before the state changes, after the source's exit hook.
    pub fn will_fire<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Event<P>, &Transition<'_, P>) -> HookResult + Send + Sync + 'static,
    {
        self.will_fire = Some(Arc::new(hook));
        self
    }

    /// Run `hook` after the state changed, after the destination's entry hook.
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

    /// Source states in registration order.
    pub fn source_states(&self) -> &[Arc<State<P>>] {
        &self.sources
    }

    /// Distinct destination states, in the order they were first registered.
    pub fn destination_states(&self) -> Vec<&Arc<State<P>>> {
        let mut seen = HashSet::new();
        let mut destinations = Vec::new();
        for source in &self.sources {
            if let Some(destination) = self.destinations.get(source.name()) {
                if seen.insert(destination.name()) {
                    destinations.push(destination);
                }
            }
        }
        destinations
    }

    /// `(source, destination)` pairs in registration order.
    pub fn transitions(&self) -> impl Iterator<Item = (&Arc<State<P>>, &Arc<State<P>>)> + '_ {
        self.sources.iter().filter_map(move |source| {
            self.destinations
                .get(source.name())
                .map(|destination| (source, destination))
        })
    }

    /// Destination reached when firing from `source`, or `None` when
    /// `source` is not a source state of this event.
    pub fn destination_for(&self, source: &State<P>) -> Option<&Arc<State<P>>> {
        self.destinations.get(source.name())
    }

    pub fn has_source(&self, source: &State<P>) -> bool {
        self.destinations.contains_key(source.name())
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    pub(crate) fn allows(&self, transition: &Transition<'_, P>) -> bool {
        self.guard
            .as_ref()
            .is_none_or(|guard| guard.check(self, transition))
    }

    pub(crate) fn notify_will_fire(&self, transition: &Transition<'_, P>) -> HookResult {
        self.will_fire
            .as_ref()
            .map_or(Ok(()), |hook| hook(self, transition))
    }

    pub(crate) fn notify_did_fire(&self, transition: &Transition<'_, P>) -> HookResult {
        self.did_fire
            .as_ref()
            .map_or(Ok(()), |hook| hook(self, transition))
    }
}

impl<P> fmt::Debug for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transitions: Vec<(&str, &str)> = self
            .transitions()
            .map(|(source, destination)| (source.name(), destination.name()))
            .collect();
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("transitions", &transitions)
            .field("guard", &self.guard.is_some())
            .field("will_fire", &self.will_fire.is_some())
            .field("did_fire", &self.did_fire.is_some())
            .finish()
    }
}
