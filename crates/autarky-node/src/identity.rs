//! Identity types for nodes, neighbors, and services.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique node identifier.
///
/// Assigned by the host when the node joins the mesh. Only its identity
/// matters to the optimization core; the transport address behind it is a
/// negotiation concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{:016x}", self.0)
    }
}

/// A directly known peer node.
///
/// The set of neighbors is supplied fresh each control cycle by the
/// negotiation subsystem; this crate never owns or mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbor {
    /// The peer's identity.
    pub id: NodeId,
}

impl Neighbor {
    /// Create a neighbor handle for the given node.
    pub const fn new(id: NodeId) -> Self {
        Self { id }
    }
}

impl fmt::Display for Neighbor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A service offered by the local node, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Service {
    /// Registry name of the service.
    pub name: String,
}

impl Service {
    /// Create a service handle by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
