//! Autarky Node Collaborator Surface
//!
//! Every node in the Autarky mesh manages itself: it monitors its own load,
//! negotiates state with the peers it directly knows ("neighbors"), and once
//! per control cycle decides whether to propose a structural change. This
//! crate defines the **read-only surface** through which that decision logic
//! observes the rest of the node.
//!
//! # What lives here
//!
//! - Identity types: [`NodeId`], [`Neighbor`], [`Service`]
//! - Negotiated state snapshots: [`StateKey`], [`NodeState`]
//! - The three collaborator views: [`PerformanceMonitor`],
//!   [`NeighborStateView`], [`ServiceKnowledge`]
//!
//! # What deliberately does NOT live here
//!
//! The negotiation protocol and transport that keep neighbor state fresh,
//! the measurement machinery behind the performance monitor, and the
//! service registry itself. Those are host subsystems; this crate only
//! fixes the contract they expose to the optimization core.
//!
//! # Staleness model
//!
//! Neighbor state arrives via negotiation and may lag reality or be missing
//! entirely for a given neighbor ([`NeighborStateView::state_of`] returns
//! `Ok(None)` in that case). Consumers must treat absence as "unknown", not
//! as any particular load level — cross-node consistency in the mesh is
//! eventual and approximate by design.

mod error;
mod identity;
mod state;
mod view;

pub use error::ReadError;
pub use identity::{Neighbor, NodeId, Service};
pub use state::{NodeState, StateKey};
pub use view::{NeighborStateView, PerformanceMonitor, ServiceKnowledge};
