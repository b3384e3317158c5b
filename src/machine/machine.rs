//! State machine that owns the registries and fires events.

use crate::core::{
    ConfigurationError, Event, HookPhase, HookResult, State, Transition, TransitionHistory,
    TransitionRecord,
};
use crate::machine::error::FiringError;
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A flat finite state machine.
///
/// The machine owns the registry of states and events (names unique within
/// each registry), the current state and the history of committed firings.
///
/// Configuration needs `&mut self`; firing only needs `&self`, so hooks can
/// inspect the machine through [`Transition::machine`] while an event is
/// firing. A second `fire` issued from inside a hook is rejected with
/// [`FiringError::Reentrant`].
///
/// The machine is `Send` but not `Sync`: to fire from several threads, put
/// it behind a `Mutex`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use turnstile::core::{Event, State};
/// use turnstile::machine::{FiringError, Machine};
///
/// let locked: Arc<State> = Arc::new(State::new("Locked"));
/// let unlocked = Arc::new(State::new("Unlocked"));
///
/// let mut machine = Machine::new(Arc::clone(&locked));
/// machine.add_state(Arc::clone(&unlocked)).unwrap();
/// machine.add_event(Event::with_transition("unlock", [&locked], &unlocked).unwrap()).unwrap();
/// machine.add_event(Event::with_transition("lock", [&unlocked], &locked).unwrap()).unwrap();
///
/// assert!(matches!(
///     machine.fire("lock"),
///     Err(FiringError::NoTransitionForCurrentState { .. })
/// ));
/// machine.fire("unlock").unwrap();
/// assert!(machine.is_in_state("Unlocked"));
/// ```
pub struct Machine<P = ()> {
    states: Vec<Arc<State<P>>>,
    state_index: HashMap<String, usize>,
    events: Vec<Arc<Event<P>>>,
    event_index: HashMap<String, usize>,
    initial: Arc<State<P>>,
    current: RefCell<Arc<State<P>>>,
    history: RefCell<TransitionHistory>,
    firing: Cell<bool>,
}

impl<P> Machine<P> {
    /// Create a machine in `initial`, which becomes its first registered state.
    pub fn new(initial: Arc<State<P>>) -> Self {
        let mut state_index = HashMap::new();
        state_index.insert(initial.name().to_string(), 0);
        Self {
            states: vec![Arc::clone(&initial)],
            state_index,
            events: Vec::new(),
            event_index: HashMap::new(),
            current: RefCell::new(Arc::clone(&initial)),
            initial,
            history: RefCell::new(TransitionHistory::new()),
            firing: Cell::new(false),
        }
    }

    /// Register a state.
    pub fn add_state(&mut self, state: Arc<State<P>>) -> Result<(), ConfigurationError> {
        if self.state_index.contains_key(state.name()) {
            return Err(ConfigurationError::DuplicateStateName {
                name: state.name().to_string(),
            });
        }

        debug!(state = %state.name(), "registered state");
        self.state_index
            .insert(state.name().to_string(), self.states.len());
        self.states.push(state);
        Ok(())
    }

    /// Register an event.
    ///
    /// Every source and destination of the event must be the very state
    /// object registered under that name, so events never point at copies
    /// the machine does not own. On error nothing is registered.
    pub fn add_event(&mut self, event: Event<P>) -> Result<Arc<Event<P>>, ConfigurationError> {
        if self.event_index.contains_key(event.name()) {
            return Err(ConfigurationError::DuplicateEventName {
                name: event.name().to_string(),
            });
        }

        for (source, destination) in event.transitions() {
            for state in [source, destination] {
                if !self.owns(state) {
                    return Err(ConfigurationError::UnregisteredState {
                        event: event.name().to_string(),
                        state: state.name().to_string(),
                    });
                }
            }
        }

        debug!(
            event = %event.name(),
            sources = event.source_states().len(),
            "registered event"
        );
        let event = Arc::new(event);
        self.event_index
            .insert(event.name().to_string(), self.events.len());
        self.events.push(Arc::clone(&event));
        Ok(event)
    }

    fn owns(&self, state: &Arc<State<P>>) -> bool {
        self.state(state.name())
            .is_some_and(|registered| Arc::ptr_eq(registered, state))
    }

    pub fn state(&self, name: &str) -> Option<&Arc<State<P>>> {
        self.state_index.get(name).map(|&index| &self.states[index])
    }

    pub fn event(&self, name: &str) -> Option<&Arc<Event<P>>> {
        self.event_index.get(name).map(|&index| &self.events[index])
    }

    /// Registered states, in registration order.
    pub fn states(&self) -> &[Arc<State<P>>] {
        &self.states
    }

    /// Registered events, in registration order.
    pub fn events(&self) -> &[Arc<Event<P>>] {
        &self.events
    }

    pub fn initial_state(&self) -> &Arc<State<P>> {
        &self.initial
    }

    pub fn current_state(&self) -> Arc<State<P>> {
        Arc::clone(&self.current.borrow())
    }

    pub fn is_in_state(&self, name: &str) -> bool {
        self.current.borrow().name() == name
    }

    /// Copy of the log of committed firings.
    ///
    /// Clones every kept record; prefer [`history_len`](Self::history_len)
    /// or [`last_transition`](Self::last_transition) on hot paths.
    pub fn history(&self) -> TransitionHistory {
        self.history.borrow().clone()
    }

    /// Number of records currently kept in the history.
    pub fn history_len(&self) -> usize {
        self.history.borrow().len()
    }

    /// The most recent committed firing, if it is still kept.
    pub fn last_transition(&self) -> Option<TransitionRecord> {
        self.history.borrow().last().cloned()
    }

    pub fn history_limit(&self) -> Option<usize> {
        self.history.borrow().limit()
    }

    /// Bound the history to `limit` records (`None` for unbounded).
    /// Records that no longer fit are evicted oldest first.
    pub fn set_history_limit(&mut self, limit: Option<usize>) {
        self.history.get_mut().set_limit(limit);
    }

    /// Forget every committed firing. The current state is unaffected.
    pub fn clear_history(&mut self) {
        self.history.get_mut().clear();
    }

    /// Whether an event is firing right now (i.e. we are inside a hook).
    pub fn is_firing(&self) -> bool {
        self.firing.get()
    }

    /// Check whether `event` would fire from the current state.
    ///
    /// Only the destination lookup and the guard run; no hook is invoked
    /// and nothing changes.
    pub fn can_fire(&self, event: &str) -> bool {
        self.resolve(event, None)
            .is_ok_and(|transition| transition.event().allows(&transition))
    }

    /// Fire `event` without a payload.
    pub fn fire(&self, event: &str) -> Result<Transition<'_, P>, FiringError> {
        self.fire_inner(event, None)
    }

    /// Fire `event`, handing `payload` to the guard and every hook.
    pub fn fire_with(&self, event: &str, payload: P) -> Result<Transition<'_, P>, FiringError> {
        self.fire_inner(event, Some(payload))
    }

    fn fire_inner(&self, name: &str, payload: Option<P>) -> Result<Transition<'_, P>, FiringError> {
        if self.firing.get() {
            debug!(event = %name, "rejected reentrant firing");
            return Err(FiringError::Reentrant {
                event: name.to_string(),
            });
        }
        let _scope = FiringScope::enter(&self.firing);

        let transition = self
            .resolve(name, payload)
            .inspect_err(|err| debug!(event = %name, error = %err, "event cannot fire"))?;
        let event = Arc::clone(transition.event());

        if !event.allows(&transition) {
            debug!(
                event = %name,
                from = %transition.source().name(),
                to = %transition.destination().name(),
                "guard vetoed firing"
            );
            return Err(FiringError::FiringVetoedByGuard {
                event: name.to_string(),
                from: transition.source().name().to_string(),
                to: transition.destination().name().to_string(),
            });
        }

        self.run_hook(HookPhase::Exit, &transition, || {
            transition.source().exit(&transition)
        })?;
        self.run_hook(HookPhase::WillFire, &transition, || {
            event.notify_will_fire(&transition)
        })?;

        self.commit(&transition);

        self.run_hook(HookPhase::Entry, &transition, || {
            transition.destination().enter(&transition)
        })?;
        self.run_hook(HookPhase::DidFire, &transition, || {
            event.notify_did_fire(&transition)
        })?;

        debug!(
            event = %name,
            from = %transition.source().name(),
            to = %transition.destination().name(),
            "event fired"
        );
        Ok(transition)
    }

    /// Resolve `name` against the current state and build the transition.
    fn resolve(&self, name: &str, payload: Option<P>) -> Result<Transition<'_, P>, FiringError> {
        let event = self.event(name).ok_or_else(|| FiringError::UnknownEvent {
            event: name.to_string(),
        })?;
        let source = self.current_state();
        let destination = event.destination_for(&source).cloned().ok_or_else(|| {
            FiringError::NoTransitionForCurrentState {
                event: name.to_string(),
                state: source.name().to_string(),
            }
        })?;

        Ok(Transition::new(
            Arc::clone(event),
            source,
            destination,
            self,
            payload,
        ))
    }

    fn run_hook<F>(
        &self,
        phase: HookPhase,
        transition: &Transition<'_, P>,
        hook: F,
    ) -> Result<(), FiringError>
    where
        F: FnOnce() -> HookResult,
    {
        trace!(event = %transition.event().name(), %phase, "running hook");
        hook().map_err(|source| {
            warn!(
                event = %transition.event().name(),
                %phase,
                committed = phase.is_after_commit(),
                error = %source,
                "hook failed"
            );
            FiringError::Hook {
                event: transition.event().name().to_string(),
                phase,
                source,
            }
        })
    }

    fn commit(&self, transition: &Transition<'_, P>) {
        *self.current.borrow_mut() = Arc::clone(transition.destination());
        self.history.borrow_mut().record(TransitionRecord {
            event: transition.event().name().to_string(),
            from: transition.source().name().to_string(),
            to: transition.destination().name().to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Replace the current state and history wholesale. Hooks do not run.
    pub(crate) fn resume_at(&mut self, current: Arc<State<P>>, history: TransitionHistory) {
        *self.current.get_mut() = current;
        *self.history.get_mut() = history;
    }
}

impl<P> fmt::Debug for Machine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let states: Vec<&str> = self.states.iter().map(|s| s.name()).collect();
        let events: Vec<&str> = self.events.iter().map(|e| e.name()).collect();
        f.debug_struct("Machine")
            .field("states", &states)
            .field("events", &events)
            .field("initial", &self.initial.name())
            .field("current", &self.current.borrow().name())
            .field("fired", &self.history.borrow().len())
            .finish()
    }
}

/// Marks the machine as firing until dropped, including on panic.
struct FiringScope<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> FiringScope<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for FiringScope<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
