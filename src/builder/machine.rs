//! Builder for constructing machines from named declarations.

use crate::builder::error::BuildError;
use crate::builder::event::EventDef;
use crate::core::{ConfigurationError, Event, State};
use crate::machine::Machine;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

type Check = Validation<(), NonEmptyVec<ConfigurationError>>;

/// Builder for constructing machines with a fluent API.
///
/// States are declared as values, events by state names. [`build`](Self::build)
/// resolves every name and reports *all* configuration problems at once
/// instead of stopping at the first one.
///
/// # Example
///
/// ```rust
/// use turnstile::builder::{EventDef, MachineBuilder};
/// use turnstile::core::State;
///
/// let machine = MachineBuilder::<()>::new()
///     .initial("Locked")
///     .state(State::new("Locked"))
///     .state(State::new("Unlocked"))
///     .event(EventDef::new("coin").transition(["Locked"], "Unlocked"))
///     .event(EventDef::new("push").transition(["Unlocked"], "Locked"))
///     .build()
///     .unwrap();
///
/// assert!(machine.can_fire("coin"));
/// assert!(!machine.can_fire("push"));
/// ```
pub struct MachineBuilder<P = ()> {
    initial: Option<String>,
    states: Vec<State<P>>,
    events: Vec<EventDef<P>>,
    history_limit: Option<usize>,
}

impl<P> MachineBuilder<P> {
    pub fn new() -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            events: Vec::new(),
            history_limit: None,
        }
    }

    /// Set the initial state by name (required).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    pub fn state(mut self, state: State<P>) -> Self {
        self.states.push(state);
        self
    }

    /// Add multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = State<P>>) -> Self {
        self.states.extend(states);
        self
    }

    pub fn event(mut self, event: EventDef<P>) -> Self {
        self.events.push(event);
        self
    }

    /// Keep at most `limit` records of committed firings. Unbounded by default.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Build the machine.
    ///
    /// Fails with [`BuildError::MissingInitialState`] if no initial state was
    /// named, otherwise with [`BuildError::Invalid`] listing every duplicate
    /// name, unknown state reference and overlapping source state.
    pub fn build(self) -> Result<Machine<P>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let mut checks: Vec<Check> = Vec::new();

        let mut registry: HashMap<String, Arc<State<P>>> = HashMap::new();
        let mut ordered = Vec::with_capacity(self.states.len());
        for state in self.states {
            if registry.contains_key(state.name()) {
                checks.push(Validation::fail(ConfigurationError::DuplicateStateName {
                    name: state.name().to_string(),
                }));
                continue;
            }
            let state = Arc::new(state);
            registry.insert(state.name().to_string(), Arc::clone(&state));
            ordered.push(state);
        }

        checks.push(match registry.get(&initial) {
            Some(_) => Validation::success(()),
            None => Validation::fail(ConfigurationError::UnknownState {
                name: initial.clone(),
            }),
        });

        let mut event_names = HashSet::new();
        let mut events = Vec::with_capacity(self.events.len());
        for def in self.events {
            if !event_names.insert(def.name.clone()) {
                checks.push(Validation::fail(ConfigurationError::DuplicateEventName {
                    name: def.name.clone(),
                }));
                continue;
            }
            match resolve_event(def, &registry) {
                Ok(event) => events.push(event),
                Err(errors) => checks.extend(errors.into_iter().map(Validation::fail)),
            }
        }

        if let Validation::Failure(errors) = Validation::all_vec(checks) {
            let errors: Vec<ConfigurationError> = errors.iter().cloned().collect();
            debug!(count = errors.len(), "machine configuration rejected");
            return Err(BuildError::Invalid(errors));
        }

        let initial = Arc::clone(&registry[&initial]);
        let mut machine = Machine::new(Arc::clone(&initial));
        machine.set_history_limit(self.history_limit);
        for state in ordered {
            if !Arc::ptr_eq(&state, &initial) {
                machine.add_state(state).map_err(invalid)?;
            }
        }
        for event in events {
            machine.add_event(event).map_err(invalid)?;
        }
        Ok(machine)
    }
}

impl<P> Default for MachineBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(error: ConfigurationError) -> BuildError {
    BuildError::Invalid(vec![error])
}

/// Turn a named declaration into an event over the registered states,
/// collecting every unknown name and overlap.
fn resolve_event<P>(
    def: EventDef<P>,
    registry: &HashMap<String, Arc<State<P>>>,
) -> Result<Event<P>, Vec<ConfigurationError>> {
    let mut errors = Vec::new();
    let mut event = Event::new(def.name.clone());

    for group in &def.transitions {
        let mut lookup = |name: &String| {
            let found = registry.get(name);
            if found.is_none() {
                errors.push(ConfigurationError::UnknownState { name: name.clone() });
            }
            found
        };
        let sources: Vec<_> = group.sources.iter().filter_map(&mut lookup).collect();
        let destination = lookup(&group.destination);
        let complete = sources.len() == group.sources.len();

        if let (Some(destination), true) = (destination, complete) {
            if let Err(err) = event.add_transition(sources, destination) {
                errors.push(err);
            }
        } else if group.sources.is_empty() {
            errors.push(ConfigurationError::EmptySourceStates {
                event: def.name.clone(),
            });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    event.guard = def.guard;
    event.will_fire = def.will_fire;
    event.did_fire = def.did_fire;
    Ok(event)
}
