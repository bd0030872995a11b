//! Negotiated node-state snapshots.
//!
//! During negotiation each node periodically publishes a small set of
//! generic metrics to its neighbors. A [`NodeState`] is the last such
//! snapshot received for one neighbor — a plain key/value map, never a
//! live view. Snapshots may lag reality or be missing entirely; consumers
//! must tolerate both.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Keys of the generic metrics a node publishes during negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StateKey {
    /// Total CPU utilization of the node, in `[0, 1]`.
    CpuUtilization,
    /// Aggregate incoming request rate across the node's services,
    /// in requests per second.
    RequestRate,
}

/// The last negotiated state snapshot for one neighbor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    values: HashMap<StateKey, f64>,
}

impl NodeState {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metric value, replacing any previous value for the key.
    pub fn set(&mut self, key: StateKey, value: f64) {
        self.values.insert(key, value);
    }

    /// Look up a metric value. `None` means the neighbor never published
    /// this key, not that the value is zero.
    pub fn get(&self, key: StateKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    /// Number of published metrics.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot carries no metrics at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build a snapshot from key/value pairs.
impl FromIterator<(StateKey, f64)> for NodeState {
    fn from_iter<I: IntoIterator<Item = (StateKey, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
