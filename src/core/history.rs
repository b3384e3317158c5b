//! Log of committed firings.
//!
//! The machine appends one record each time it commits a state change.
//! Records hold names rather than state objects so the log can be
//! serialized into a snapshot and replayed against another machine.
//!
//! A history may be bounded with [`TransitionHistory::with_limit`]; once
//! full, every new record evicts the oldest one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed firing.
///
/// # Example
///
/// ```rust
/// use turnstile::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     event: "unlock".to_string(),
///     from: "Locked".to_string(),
///     to: "Unlocked".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "Unlocked");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the event that fired
    pub event: String,
    /// The state being transitioned from
    pub from: String,
    /// The state being transitioned to
    pub to: String,
    /// When the new state was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed firings.
///
/// # Example
///
/// ```rust
/// use turnstile::core::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::new();
/// history.record(TransitionRecord {
///     event: "start".to_string(),
///     from: "Idle".to_string(),
///     to: "Running".to_string(),
///     timestamp: Utc::now(),
/// });
/// history.record(TransitionRecord {
///     event: "finish".to_string(),
///     from: "Running".to_string(),
///     to: "Done".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.path(), vec!["Idle", "Running", "Done"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    #[serde(default)]
    limit: Option<usize>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
            limit: None,
        }
    }

    /// Create a history that keeps at most `limit` records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit: Some(limit),
        }
    }

    /// Maximum number of records kept, `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Change the bound, evicting the oldest records that no longer fit.
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
        self.evict();
    }

    /// Append a committed firing.
    pub fn record(&mut self, record: TransitionRecord) {
        self.records.push_back(record);
        self.evict();
    }

    fn evict(&mut self) {
        if let Some(limit) = self.limit {
            while self.records.len() > limit {
                self.records.pop_front();
            }
        }
    }

    /// Drop every record. The bound is kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records from oldest to newest.
    pub fn records(
        &self,
    ) -> impl DoubleEndedIterator<Item = &TransitionRecord> + ExactSizeIterator {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&TransitionRecord> {
        self.records.front()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the path of states traversed.
    ///
    /// Returns the oldest kept record's source, then the destination of
    /// each record in order. Empty when nothing has fired.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|record| record.to.as_str()));
        path
    }

    /// Time elapsed between the first and the last committed firing.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}
