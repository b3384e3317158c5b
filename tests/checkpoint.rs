//! Snapshot round-trips: a restored machine must behave exactly like the
//! machine the snapshot was taken from.

use std::sync::{Arc, Mutex};
use turnstile::builder::{EventDef, MachineBuilder};
use turnstile::checkpoint::{CheckpointError, MachineSnapshot};
use turnstile::core::State;
use turnstile::machine::Machine;

const STATES: [&str; 3] = ["Pending", "Active", "Closed"];
const EVENTS: [&str; 2] = ["activate", "close"];

/// 3 states, 2 events, `close` has two disjoint source groups with
/// different destinations.
fn ticket() -> MachineBuilder {
    MachineBuilder::new()
        .initial("Pending")
        .states(STATES.map(State::new))
        .event(EventDef::new("activate").transition(["Pending"], "Active"))
        .event(
            EventDef::new("close")
                .transition(["Active"], "Closed")
                .transition(["Pending"], "Active"),
        )
}

/// For every (state, event) pair: can the event fire, and where does it lead?
fn behaviour(
    build: impl Fn() -> Machine,
    resume: impl Fn(&Machine, &str),
) -> Vec<(String, String, bool, Option<String>)> {
    let mut observed = Vec::new();
    for state in STATES {
        for event in EVENTS {
            let machine = build();
            resume(&machine, state);
            let can_fire = machine.can_fire(event);
            let destination = machine
                .fire(event)
                .ok()
                .map(|t| t.destination().name().to_string());
            observed.push((state.to_string(), event.to_string(), can_fire, destination));
        }
    }
    observed
}

/// Drive a freshly built ticket machine into `state` by firing events.
fn drive_to(machine: &Machine, state: &str) {
    match state {
        "Pending" => {}
        "Active" => {
            machine.fire("activate").unwrap();
        }
        "Closed" => {
            machine.fire("activate").unwrap();
            machine.fire("close").unwrap();
        }
        other => panic!("unexpected state {other}"),
    }
}

#[test]
fn json_restored_machine_is_observationally_identical() {
    let original = behaviour(|| ticket().build().unwrap(), drive_to);

    let restored = behaviour(
        || {
            let json = ticket().build().unwrap().snapshot().to_json().unwrap();
            Machine::from_snapshot(&MachineSnapshot::from_json(&json).unwrap()).unwrap()
        },
        drive_to,
    );

    assert_eq!(original, restored);
}

#[test]
fn binary_restored_machine_is_observationally_identical() {
    let original = behaviour(|| ticket().build().unwrap(), drive_to);

    let restored = behaviour(
        || {
            let bytes = ticket().build().unwrap().snapshot().to_bytes().unwrap();
            Machine::from_snapshot(&MachineSnapshot::from_bytes(&bytes).unwrap()).unwrap()
        },
        drive_to,
    );

    assert_eq!(original, restored);
}

#[test]
fn restored_events_point_at_restored_states() {
    let snapshot = ticket().build().unwrap().snapshot();
    let restored: Machine = Machine::from_snapshot(&snapshot).unwrap();

    for event in restored.events() {
        for (source, destination) in event.transitions() {
            assert!(Arc::ptr_eq(source, restored.state(source.name()).unwrap()));
            assert!(Arc::ptr_eq(
                destination,
                restored.state(destination.name()).unwrap()
            ));
        }
    }
}

#[test]
fn restore_resumes_configured_machine_with_hooks() {
    let source = ticket().build().unwrap();
    source.fire("activate").unwrap();
    let json = source.snapshot().to_json_pretty().unwrap();

    let closed = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&closed);
    let mut target: Machine = MachineBuilder::new()
        .initial("Pending")
        .states([
            State::new("Pending"),
            State::new("Active"),
            State::new("Closed").on_entry(move |_, _| {
                *counter.lock().unwrap() += 1;
                Ok(())
            }),
        ])
        .event(
            EventDef::new("close")
                .transition(["Pending"], "Active")
                .transition(["Active"], "Closed"),
        )
        .event(EventDef::new("activate").transition(["Pending"], "Active"))
        .build()
        .unwrap();

    target
        .restore(&MachineSnapshot::from_json(&json).unwrap())
        .unwrap();

    assert!(target.is_in_state("Active"));
    assert_eq!(target.history(), source.history());
    assert_eq!(*closed.lock().unwrap(), 0);

    target.fire("close").unwrap();
    assert_eq!(*closed.lock().unwrap(), 1);
    assert_eq!(target.history().path(), vec!["Pending", "Active", "Closed"]);
}

#[test]
fn restore_into_different_graph_fails() {
    let snapshot = ticket().build().unwrap().snapshot();
    let mut other: Machine = MachineBuilder::new()
        .initial("Pending")
        .states(STATES.map(State::new))
        .event(EventDef::new("activate").transition(["Pending"], "Active"))
        .build()
        .unwrap();

    assert!(matches!(
        other.restore(&snapshot),
        Err(CheckpointError::GraphMismatch(_))
    ));
}
