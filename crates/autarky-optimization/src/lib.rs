//! Autarky Self-Optimization Core
//!
//! The decentralized control loop that lets a mesh node decide, on its own,
//! which structural change to enact — including whether to propose removing
//! itself from the mesh.
//!
//! # How a cycle works
//!
//! Once per control cycle the host scheduler runs every registered
//! [`ActionGenerator`]. Each generator inspects local and negotiated state
//! and emits zero or more candidate [`OptimizationAction`]s, each carrying a
//! non-negative desirability weight. The pooled candidates then go through
//! [`selector::select`], which picks **exactly one** by weighted random
//! sampling:
//!
//! ```text
//! generators ──► pooled candidates ──► selector ──► one action ──► executor
//! ```
//!
//! Selection is probabilistic on purpose. Every node runs the same policy
//! over similar inputs; a deterministic argmax would make whole regions of
//! the mesh enact the same change in the same cycle. Weighted sampling
//! keeps decisions locally greedy *in expectation* while desynchronizing
//! the herd.
//!
//! # Removal policy
//!
//! [`RemoveSelfGenerator`] is the one concrete policy defined here: a node
//! proposes its own removal only when six independent safety guards all
//! pass (billing grace, own load, mesh population, proposal cooldown,
//! service coverage, neighbor load). See the module docs in [`removal`].
//!
//! # What this crate does not do
//!
//! It never talks to the network, never executes actions, and never blocks:
//! every evaluation is a fast computation over already-negotiated in-memory
//! state, reached through the read-only views in `autarky-node`. Stale
//! neighbor state degrades decision *accuracy*, never *safety* — unknown
//! state is excluded from averages rather than assumed.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod removal;
pub mod selector;

pub use action::{OptimizationAction, Weighted};
pub use clock::{Clock, SystemClock};
pub use config::OptimizationConfig;
pub use engine::{CycleOutcome, OptimizationEngine};
pub use error::{GenerationError, SelectionError};
pub use generator::ActionGenerator;
pub use removal::RemoveSelfGenerator;
