//! Collaborator read faults.

use thiserror::Error;

/// A collaborator failed to answer a read.
///
/// Raised by any [`PerformanceMonitor`](crate::PerformanceMonitor),
/// [`NeighborStateView`](crate::NeighborStateView), or
/// [`ServiceKnowledge`](crate::ServiceKnowledge) method when the backing
/// subsystem cannot currently produce a value. This is a genuine fault,
/// distinct from expected "nothing there" answers — those are modeled as
/// `Ok(None)` on the relevant methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("collaborator read failed: {0}")]
pub struct ReadError(String);

impl ReadError {
    /// Create a read fault with a human-readable cause.
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}
