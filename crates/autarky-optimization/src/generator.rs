//! The generic action-generator contract.

use crate::action::OptimizationAction;
use crate::error::GenerationError;

/// A producer of candidate optimization actions.
///
/// The host scheduler calls [`generate_actions`](Self::generate_actions)
/// once per control cycle on every registered generator, serialized per
/// node, then pools the results for selection. Implementations:
///
/// - return an empty vec for the expected "no action needed" outcome —
///   that is never an error;
/// - return `Err` only for genuine faults (a collaborator read failed
///   mid-evaluation), leaving their own state untouched so the next cycle
///   retries cleanly;
/// - must not block: evaluation is a fast computation over
///   already-negotiated in-memory state;
/// - may keep private mutable bookkeeping (hence `&mut self`), but never
///   mutate collaborator state.
///
/// Generators do not see each other's output; composition happens in the
/// selector via each action's weight.
pub trait ActionGenerator {
    /// Evaluate this generator's policy for the current cycle.
    fn generate_actions(&mut self) -> Result<Vec<OptimizationAction>, GenerationError>;
}
