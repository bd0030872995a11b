//! Removal policy configuration.
//!
//! All thresholds are injected at generator construction and immutable
//! thereafter — there is no process-wide configuration singleton. Each
//! test (and each node profile) builds its own.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Durations governing when self-removal may be proposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// How far into a billing cycle removal still wastes committed
    /// capacity. Also the plain startup grace period when billing is
    /// degenerate (see [`RemoveSelfGenerator`](crate::RemoveSelfGenerator)).
    pub min_grace_after_creation: Duration,

    /// Minimum time between two removal proposals from the same node.
    pub cooldown_between_removals: Duration,

    /// Length of the recurring billing cycle. A cycle no longer than the
    /// cooldown is treated as "billing irrelevant".
    pub bill_cycle: Duration,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            min_grace_after_creation: Duration::from_secs(5 * 60),
            cooldown_between_removals: Duration::from_secs(10 * 60),
            bill_cycle: Duration::from_secs(60 * 60),
        }
    }
}
