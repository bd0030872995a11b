//! Candidate optimization actions.
//!
//! An action is an opaque, immutable proposal to change the structure of
//! the mesh, created by a generator during one control cycle and consumed
//! exactly once by the selector. Actions have no persistent identity;
//! whatever the selector does not pick is simply dropped.
//!
//! The selector never needs to know *what* an action does — only how
//! desirable it is. That single operation is the [`Weighted`] trait, so the
//! selector stays closed while the action set stays open: new action kinds
//! (scale-up, service migration, ...) are new [`OptimizationAction`]
//! variants, or entirely foreign `Weighted` types, and the selector code
//! never changes.

/// Anything carrying a desirability weight.
///
/// Weights are unnormalized probability masses: finite, non-negative,
/// higher = more strongly favored. Relative magnitude is all that matters.
pub trait Weighted {
    /// The desirability weight of this item.
    fn weight(&self) -> f64;
}

/// A proposed structural change to the mesh.
///
/// Execution is the host actuator's job; this crate only creates and
/// arbitrates proposals.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum OptimizationAction {
    /// Withdraw this node from the mesh, releasing its capacity.
    ///
    /// The weight is how far the node sits below its lower utilization
    /// bound — the idler the node, the stronger the pull to remove it.
    RemoveSelf {
        /// Desirability of the removal.
        weight: f64,
    },
}

impl Weighted for OptimizationAction {
    fn weight(&self) -> f64 {
        match self {
            Self::RemoveSelf { weight } => *weight,
        }
    }
}
