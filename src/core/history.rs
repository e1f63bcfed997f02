//! Per-instance record of node switches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// A single node switch performed by a transition.
///
/// # Example
///
/// ```rust
/// use transit_fsm::core::TransitionRecord;
/// use chrono::Utc;
///
/// let record = TransitionRecord {
///     transition: "successor".to_string(),
///     from: "Verus".to_string(),
///     to: "Commodus".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to, "Commodus");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Name of the transition that fired
    pub transition: String,
    /// Node the machine left
    pub from: String,
    /// Node the machine switched to
    pub to: String,
    /// When the switch happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered, optionally bounded history of node switches.
///
/// A record is written at the moment the machine switches nodes, before the
/// target's enter hook runs. A transition whose enter hook fails is therefore
/// still recorded, matching the machine's position.
///
/// ```rust
/// use transit_fsm::core::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::new();
/// for (transition, from, to) in [("t1", "A", "B"), ("t2", "B", "A")] {
///     history.push(TransitionRecord {
///         transition: transition.to_string(),
///         from: from.to_string(),
///         to: to.to_string(),
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(history.path(), vec!["A", "B", "A"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    limit: Option<usize>,
}

impl TransitionHistory {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `limit` records, dropping the
    /// oldest first. `None` keeps everything.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Append a record, evicting old ones past the limit.
    pub fn push(&mut self, record: TransitionRecord) {
        self.records.push_back(record);
        if let Some(limit) = self.limit {
            while self.records.len() > limit {
                self.records.pop_front();
            }
        }
    }

    /// Nodes visited: the first record's `from`, then every `to`.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|record| record.to.as_str()));
        path
    }

    /// Time between the first and last retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
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
}
