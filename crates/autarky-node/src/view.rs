//! Read-only collaborator views.
//!
//! The optimization core observes the node exclusively through these three
//! traits. All methods are reads; none may mutate collaborator state. Any
//! method may fail with [`ReadError`] when the backing subsystem is
//! unavailable — callers must treat such faults as "no decision this
//! cycle", never as any particular answer.

use crate::{Neighbor, NodeState, ReadError, Service};

/// View onto the local performance-monitoring subsystem.
pub trait PerformanceMonitor {
    /// Current total CPU utilization of this node, in `[0, 1]`.
    fn current_total_cpu_utilization(&self) -> Result<f64, ReadError>;

    /// Configured lower utilization bound. Below this the node is
    /// considered underused.
    fn cpu_utilization_lower_bound(&self) -> Result<f64, ReadError>;

    /// Configured upper utilization bound. At or above this the node is
    /// considered strained.
    fn cpu_utilization_upper_bound(&self) -> Result<f64, ReadError>;

    /// Current incoming request rate for one of this node's services,
    /// in requests per second (never negative).
    fn service_request_rate(&self, service: &str) -> Result<f64, ReadError>;
}

/// View onto the negotiation subsystem's knowledge of neighbors.
pub trait NeighborStateView {
    /// The peers this node directly knows, as of the latest negotiation
    /// round. May be empty.
    fn known_neighbors(&self) -> Result<Vec<Neighbor>, ReadError>;

    /// The last negotiated state snapshot for a neighbor.
    ///
    /// `Ok(None)` means negotiation with that neighbor is pending or has
    /// failed — the neighbor exists but its state is unknown.
    fn state_of(&self, neighbor: &Neighbor) -> Result<Option<NodeState>, ReadError>;

    /// A known neighbor offering the named service, if any.
    ///
    /// `Ok(None)` is the expected "no neighbor offers this" answer, not a
    /// fault. Which neighbor is returned when several qualify is
    /// unspecified.
    fn neighbor_offering(&self, service: &str) -> Result<Option<Neighbor>, ReadError>;
}

/// View onto the local service registry.
pub trait ServiceKnowledge {
    /// The services this node currently offers. May be empty.
    fn offered_services(&self) -> Result<Vec<Service>, ReadError>;
}
