//! Snapshot and restore functionality for machines.
//!
//! A [`MachineSnapshot`] captures the declared graph (state names and each
//! event's source → destination pairs), the initial and current state and
//! the firing history as a single serializable value. Hooks are code, not
//! data, and are never part of a snapshot.
//!
//! There are two ways back from a snapshot:
//! - [`Machine::from_snapshot`] rebuilds a hook-less machine from the graph.
//!   Every event of the new machine refers to the state objects owned by the
//!   new machine's registry.
//! - [`Machine::restore`] resumes an already configured machine (hooks
//!   attached) at the snapshot's current state, after checking the graphs
//!   match.

use crate::builder::{EventDef, MachineBuilder};
use crate::core::{State, TransitionHistory};
use crate::machine::Machine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// One source → destination edge of an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: String,
    pub destination: String,
}

/// An event and its edges, in registration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub name: String,
    pub edges: Vec<EdgeSnapshot>,
}

/// Serializable snapshot of a machine.
/// Does NOT include hooks or guards (not serializable).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Registered state names, in registration order
    pub states: Vec<String>,

    /// Registered events, in registration order
    pub events: Vec<EventSnapshot>,

    /// Initial state of the machine
    pub initial_state: String,

    /// Current state of the machine
    pub current_state: String,

    /// Complete firing history
    pub history: TransitionHistory,
}

type Graph<'a> = (BTreeSet<&'a str>, BTreeMap<&'a str, BTreeMap<&'a str, &'a str>>);

impl MachineSnapshot {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Compact binary encoding (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> Result<(), CheckpointError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }

    /// Check the snapshot is internally consistent: state and event names
    /// are unique, and every kept history record is an edge of its event,
    /// chains onto the previous record and ends in the current state.
    fn validate(&self) -> Result<(), CheckpointError> {
        let mut states = BTreeSet::new();
        if let Some(name) = self.states.iter().find(|name| !states.insert(name.as_str())) {
            return Err(CheckpointError::InvalidSnapshot(format!(
                "state '{name}' is listed more than once"
            )));
        }
        let mut events = BTreeSet::new();
        if let Some(event) = self.events.iter().find(|event| !events.insert(event.name.as_str())) {
            return Err(CheckpointError::InvalidSnapshot(format!(
                "event '{}' is listed more than once",
                event.name
            )));
        }

        let (_, graph) = self.graph();
        let mut previous: Option<&str> = None;
        for record in self.history.records() {
            let is_edge = graph
                .get(record.event.as_str())
                .and_then(|edges| edges.get(record.from.as_str()))
                .is_some_and(|to| *to == record.to);
            if !is_edge {
                return Err(CheckpointError::InvalidSnapshot(format!(
                    "history record '{}' ({} -> {}) is not an edge of the graph",
                    record.event, record.from, record.to
                )));
            }
            if previous.is_some_and(|to| to != record.from) {
                return Err(CheckpointError::InvalidSnapshot(format!(
                    "history record '{}' does not start where the previous one ended",
                    record.event
                )));
            }
            previous = Some(record.to.as_str());
        }
        if previous.is_some_and(|to| to != self.current_state) {
            return Err(CheckpointError::InvalidSnapshot(format!(
                "history ends in '{}' but the current state is '{}'",
                previous.unwrap_or_default(),
                self.current_state
            )));
        }
        Ok(())
    }

    /// The graph with registration order erased, for comparisons.
    fn graph(&self) -> Graph<'_> {
        let states = self.states.iter().map(String::as_str).collect();
        let events = self
            .events
            .iter()
            .map(|event| {
                let edges = event
                    .edges
                    .iter()
                    .map(|edge| (edge.source.as_str(), edge.destination.as_str()))
                    .collect();
                (event.name.as_str(), edges)
            })
            .collect();
        (states, events)
    }
}

impl<P> Machine<P> {
    /// Capture the graph, current state and history.
    pub fn snapshot(&self) -> MachineSnapshot {
        let events = self
            .events()
            .iter()
            .map(|event| EventSnapshot {
                name: event.name().to_string(),
                edges: event
                    .transitions()
                    .map(|(source, destination)| EdgeSnapshot {
                        source: source.name().to_string(),
                        destination: destination.name().to_string(),
                    })
                    .collect(),
            })
            .collect();

        let snapshot = MachineSnapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            states: self.states().iter().map(|s| s.name().to_string()).collect(),
            events,
            initial_state: self.initial_state().name().to_string(),
            current_state: self.current_state().name().to_string(),
            history: self.history(),
        };
        trace!(id = %snapshot.id, current = %snapshot.current_state, "took snapshot");
        snapshot
    }

    /// Rebuild a machine from a snapshot. The result has no hooks or guards.
    pub fn from_snapshot(snapshot: &MachineSnapshot) -> Result<Self, CheckpointError> {
        snapshot.check_version()?;
        snapshot.validate()?;

        let mut builder = MachineBuilder::new()
            .initial(snapshot.initial_state.clone())
            .states(snapshot.states.iter().map(|name| State::new(name.clone())));
        for event in &snapshot.events {
            let def = event.edges.iter().fold(EventDef::new(event.name.clone()), |def, edge| {
                def.transition([edge.source.clone()], edge.destination.clone())
            });
            builder = builder.event(def);
        }

        let mut machine = builder
            .build()
            .map_err(|e| CheckpointError::InvalidSnapshot(e.to_string()))?;
        let current = machine
            .state(&snapshot.current_state)
            .cloned()
            .ok_or_else(|| {
                CheckpointError::InvalidSnapshot(format!(
                    "current state '{}' is not a registered state",
                    snapshot.current_state
                ))
            })?;
        machine.resume_at(current, snapshot.history.clone());
        trace!(id = %snapshot.id, "rebuilt machine from snapshot");
        Ok(machine)
    }

    /// Resume this machine at the snapshot's current state and history.
    ///
    /// The snapshot must describe the same graph as this machine (same state
    /// names and the same edges per event, in any order). No hook runs.
    /// The machine keeps its own history limit. On error the machine is
    /// left untouched.
    pub fn restore(&mut self, snapshot: &MachineSnapshot) -> Result<(), CheckpointError> {
        snapshot.check_version()?;
        snapshot.validate()?;

        let own = self.snapshot();
        let (own_states, own_events) = own.graph();
        let (states, events) = snapshot.graph();
        if own_states != states {
            return Err(CheckpointError::GraphMismatch(
                "registered states differ".to_string(),
            ));
        }
        if own_events != events {
            return Err(CheckpointError::GraphMismatch(
                "event edges differ".to_string(),
            ));
        }

        let current = self
            .state(&snapshot.current_state)
            .cloned()
            .ok_or_else(|| {
                CheckpointError::InvalidSnapshot(format!(
                    "current state '{}' is not a registered state",
                    snapshot.current_state
                ))
            })?;
        let mut history = snapshot.history.clone();
        history.set_limit(self.history_limit());
        self.resume_at(current, history);
        trace!(id = %snapshot.id, current = %snapshot.current_state, "restored snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn door() -> Machine {
        MachineBuilder::new()
            .initial("Closed")
            .states([State::new("Closed"), State::new("Open"), State::new("Locked")])
            .event(
                EventDef::new("toggle")
                    .transition(["Closed"], "Open")
                    .transition(["Open"], "Closed"),
            )
            .event(EventDef::new("lock").transition(["Closed"], "Locked"))
            .build()
            .unwrap()
    }

    #[test]
    fn snapshot_captures_graph_and_position() {
        let machine = door();
        machine.fire("toggle").unwrap();

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.states, vec!["Closed", "Open", "Locked"]);
        assert_eq!(snapshot.events.len(), 2);
        assert_eq!(snapshot.events[0].edges.len(), 2);
        assert_eq!(snapshot.initial_state, "Closed");
        assert_eq!(snapshot.current_state, "Open");
        assert_eq!(snapshot.history.len(), 1);
    }

    #[test]
    fn snapshot_ids_are_unique() {
        let machine = door();
        assert_ne!(machine.snapshot().id, machine.snapshot().id);
    }

    #[test]
    fn json_roundtrip_preserves_snapshot() {
        let snapshot = door().snapshot();
        let json = snapshot.to_json().unwrap();
        assert_eq!(MachineSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn binary_roundtrip_preserves_snapshot() {
        let snapshot = door().snapshot();
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(MachineSnapshot::from_bytes(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let mut snapshot = door().snapshot();
        snapshot.version = 99;
        let json = snapshot.to_json().unwrap();

        assert!(matches!(
            MachineSnapshot::from_json(&json),
            Err(CheckpointError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn garbage_input_is_a_deserialization_error() {
        assert!(matches!(
            MachineSnapshot::from_json("{not json"),
            Err(CheckpointError::DeserializationFailed(_))
        ));
        assert!(matches!(
            MachineSnapshot::from_bytes(&[1, 2, 3]),
            Err(CheckpointError::DeserializationFailed(_))
        ));
    }

    #[test]
    fn from_snapshot_resumes_current_state() {
        let machine = door();
        machine.fire("toggle").unwrap();

        let restored: Machine = Machine::from_snapshot(&machine.snapshot()).unwrap();
        assert!(restored.is_in_state("Open"));
        assert_eq!(restored.history(), machine.history());
        assert!(restored.can_fire("toggle"));
        assert!(!restored.can_fire("lock"));
    }

    #[test]
    fn from_snapshot_rejects_unknown_current_state() {
        let mut snapshot = door().snapshot();
        snapshot.current_state = "Ajar".to_string();

        assert!(matches!(
            Machine::<()>::from_snapshot(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn restore_rejects_mismatched_graph() {
        let mut machine = door();
        let mut snapshot = machine.snapshot();
        snapshot.events[1].edges[0].destination = "Open".to_string();
        snapshot.current_state = "Open".to_string();

        assert!(matches!(
            machine.restore(&snapshot),
            Err(CheckpointError::GraphMismatch(_))
        ));
        assert!(machine.is_in_state("Closed"));
    }

    #[test]
    fn restore_ignores_registration_order() {
        let mut machine = door();
        let mut snapshot = machine.snapshot();
        snapshot.states.reverse();
        snapshot.events.reverse();
        snapshot.current_state = "Locked".to_string();

        machine.restore(&snapshot).unwrap();
        assert!(machine.is_in_state("Locked"));
    }

    fn fired_door() -> (Machine, MachineSnapshot) {
        let machine = door();
        machine.fire("toggle").unwrap();
        machine.fire("toggle").unwrap();
        let snapshot = machine.snapshot();
        (machine, snapshot)
    }

    #[test]
    fn history_must_end_in_current_state() {
        let (mut machine, mut snapshot) = fired_door();
        snapshot.current_state = "Locked".to_string();

        assert!(matches!(
            machine.restore(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
        assert!(matches!(
            Machine::<()>::from_snapshot(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
        assert!(machine.is_in_state("Closed"));
        assert_eq!(machine.history_len(), 2);
    }

    #[test]
    fn history_records_must_be_graph_edges() {
        let (mut machine, mut snapshot) = fired_door();
        let mut history = TransitionHistory::new();
        for mut record in snapshot.history.records().cloned() {
            record.event = "lock".to_string();
            history.record(record);
        }
        snapshot.history = history;

        assert!(matches!(
            machine.restore(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
        assert!(matches!(
            Machine::<()>::from_snapshot(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn history_records_must_chain() {
        let (mut machine, mut snapshot) = fired_door();
        let first = snapshot.history.first().cloned().unwrap();
        let mut history = TransitionHistory::new();
        history.record(first.clone());
        history.record(first);
        snapshot.history = history;
        snapshot.current_state = "Open".to_string();

        assert!(matches!(
            machine.restore(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn duplicate_event_names_are_rejected() {
        let (mut machine, mut snapshot) = fired_door();
        let duplicate = snapshot.events[0].clone();
        snapshot.events.push(duplicate);

        assert!(matches!(
            machine.restore(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
        assert!(matches!(
            Machine::<()>::from_snapshot(&snapshot),
            Err(CheckpointError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn restore_keeps_own_history_limit() {
        let (_, snapshot) = fired_door();
        let mut bounded = door();
        bounded.set_history_limit(Some(1));

        bounded.restore(&snapshot).unwrap();

        assert_eq!(bounded.history_limit(), Some(1));
        assert_eq!(bounded.history_len(), 1);
        assert!(bounded.is_in_state("Closed"));
    }
}
