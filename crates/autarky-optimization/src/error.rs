//! Error types for the optimization core.
//!
//! Two failure families exist, and they deliberately stay apart:
//!
//! - [`SelectionError`] — the selector could not produce a result. Either
//!   the caller handed it nothing (a caller bug), or sampling failed on a
//!   degenerate weight vector (an internal invariant violation). Both end
//!   the *call*, never the process; the scheduler treats the cycle as
//!   "no action".
//! - [`GenerationError`] — a generator could not finish evaluating its
//!   guards because a collaborator read failed. The proposal for this
//!   cycle is aborted with the generator's cooldown state untouched, so
//!   the next cycle retries cleanly. A read fault must never silently
//!   decay into "guard passed" — that would trade safety for liveness.
//!
//! "No neighbor offers this service" is *not* an error anywhere in this
//! crate: it is the `Ok(None)` branch of
//! [`NeighborStateView::neighbor_offering`](autarky_node::NeighborStateView::neighbor_offering).

use autarky_node::ReadError;
use thiserror::Error;

/// Errors from weighted action selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The selector was invoked with an empty candidate set. Pooling a
    /// non-empty set is the caller's responsibility; no sampling is
    /// attempted.
    #[error("no candidate actions to select from")]
    EmptyCandidates,

    /// Weighted sampling failed despite a non-empty candidate set, e.g.
    /// a negative or non-finite weight reached the selector.
    #[error("weighted sampling failed: {0}")]
    SamplingFailed(#[from] rand::distributions::WeightedError),
}

/// Errors from action generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A collaborator read failed mid-evaluation; no action was emitted
    /// and generator state is unchanged.
    #[error(transparent)]
    Collaborator(#[from] ReadError),
}
