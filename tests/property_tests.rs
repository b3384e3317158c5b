//! Property-based tests for events and firing.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated graphs.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use turnstile::core::{ConfigurationError, Event, State};
use turnstile::machine::{FiringError, Machine};

const STATE_COUNT: usize = 8;

fn states() -> Vec<Arc<State>> {
    (0..STATE_COUNT)
        .map(|i| Arc::new(State::new(format!("S{i}"))))
        .collect()
}

prop_compose! {
    // Disjoint groups of source indices, each with a destination index.
    fn disjoint_groups()(
        assignment in prop::collection::vec(prop::option::of(0..3usize), STATE_COUNT),
        destinations in prop::collection::vec(0..STATE_COUNT, 3),
    ) -> Vec<(Vec<usize>, usize)> {
        (0..3usize)
            .map(|group| {
                let sources: Vec<usize> = assignment
                    .iter()
                    .enumerate()
                    .filter(|(_, g)| **g == Some(group))
                    .map(|(i, _)| i)
                    .collect();
                (sources, destinations[group])
            })
            .filter(|(sources, _)| !sources.is_empty())
            .collect()
    }
}

fn build_event(states: &[Arc<State>], groups: &[(Vec<usize>, usize)]) -> Event {
    let mut event = Event::new("go");
    for (sources, destination) in groups {
        event
            .add_transition(sources.iter().map(|&i| &states[i]), &states[*destination])
            .unwrap();
    }
    event
}

proptest! {
    #[test]
    fn destination_matches_the_group_a_state_was_added_with(groups in disjoint_groups()) {
        let states = states();
        let event = build_event(&states, &groups);

        for (index, state) in states.iter().enumerate() {
            let expected = groups
                .iter()
                .find(|(sources, _)| sources.contains(&index))
                .map(|(_, destination)| &states[*destination]);
            prop_assert_eq!(event.destination_for(state), expected);
        }
    }

    #[test]
    fn overlapping_group_is_rejected_without_mutation(
        groups in disjoint_groups(),
        extra in prop::collection::btree_set(0..STATE_COUNT, 1..4),
        destination in 0..STATE_COUNT,
    ) {
        let states = states();
        let mut event = build_event(&states, &groups);
        let registered: BTreeSet<usize> =
            groups.iter().flat_map(|(s, _)| s.iter().copied()).collect();
        let before: Vec<(String, String)> = event
            .transitions()
            .map(|(s, d)| (s.name().to_string(), d.name().to_string()))
            .collect();

        let result =
            event.add_transition(extra.iter().map(|&i| &states[i]), &states[destination]);

        if extra.is_disjoint(&registered) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(event.transitions().count(), before.len() + extra.len());
        } else {
            let is_duplicate =
                matches!(result, Err(ConfigurationError::DuplicateSourceState { .. }));
            prop_assert!(is_duplicate);
            let after: Vec<(String, String)> = event
                .transitions()
                .map(|(s, d)| (s.name().to_string(), d.name().to_string()))
                .collect();
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn can_fire_and_fire_agree_with_source_membership(
        groups in disjoint_groups(),
        start in 0..STATE_COUNT,
    ) {
        let states = states();
        let mut machine = Machine::new(Arc::clone(&states[start]));
        for (index, state) in states.iter().enumerate() {
            if index != start {
                machine.add_state(Arc::clone(state)).unwrap();
            }
        }
        let event = build_event(&states, &groups);
        let is_source = event.has_source(&states[start]);
        let expected = event.destination_for(&states[start]).cloned();
        machine.add_event(event).unwrap();

        prop_assert_eq!(machine.can_fire("go"), is_source);
        match machine.fire("go") {
            Ok(transition) => {
                prop_assert!(is_source);
                prop_assert_eq!(Some(transition.destination()), expected.as_ref());
            }
            Err(FiringError::NoTransitionForCurrentState { .. }) => {
                prop_assert!(!is_source);
                prop_assert!(Arc::ptr_eq(&machine.current_state(), &states[start]));
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn history_path_follows_committed_firings(steps in prop::collection::vec(any::<bool>(), 0..20)) {
        let states = states();
        let (a, b) = (&states[0], &states[1]);
        let mut machine = Machine::new(Arc::clone(a));
        machine.add_state(Arc::clone(b)).unwrap();
        machine.add_event(Event::with_transition("forward", [a], b).unwrap()).unwrap();
        machine.add_event(Event::with_transition("back", [b], a).unwrap()).unwrap();

        let mut expected = vec!["S0".to_string()];
        for forward in steps {
            let name = if forward { "forward" } else { "back" };
            if let Ok(transition) = machine.fire(name) {
                expected.push(transition.destination().name().to_string());
            }
        }

        let history = machine.history();
        if history.is_empty() {
            prop_assert_eq!(expected.len(), 1);
        } else {
            let expected: Vec<&str> = expected.iter().map(String::as_str).collect();
            prop_assert_eq!(history.path(), expected);
        }
    }
}
