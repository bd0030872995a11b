//! The self-removal policy.
//!
//! Decides, once per control cycle, whether proposing to remove this node
//! from the mesh is currently safe and desirable. The decision is a single
//! gate with six independent guard predicates; removal is proposed only
//! when **every** guard passes:
//!
//! 1. **Billing grace** — removal inside the paid-for sub-interval of the
//!    billing cycle wastes committed capacity.
//! 2. **Self load** — a node at or above its lower utilization bound still
//!    earns its keep.
//! 3. **Mesh population** — the only node must not remove itself.
//! 4. **Proposal cooldown** — rapid repeated proposals would thrash.
//! 5. **Service coverage** — the sole provider of any service must stay.
//! 6. **Neighbor load** — neighbors already near their upper bound cannot
//!    absorb shed load.
//!
//! All guards are pure reads over collaborator state; evaluation order
//! carries no meaning. A collaborator read fault aborts the whole cycle's
//! proposal ([`GenerationError`]) instead of letting the guard silently
//! pass — safety over liveness. When the gate opens, the emitted action's
//! weight is `lower_bound - current_utilization`: the idler the node, the
//! stronger the pull to remove it (guard 2 guarantees positivity).

use std::fmt;
use std::time::Instant;

use autarky_node::{
    Neighbor, NeighborStateView, PerformanceMonitor, ServiceKnowledge, StateKey,
};
use tracing::debug;

use crate::action::OptimizationAction;
use crate::clock::{Clock, SystemClock};
use crate::config::OptimizationConfig;
use crate::error::GenerationError;
use crate::generator::ActionGenerator;

/// Which guard vetoed a removal proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Veto {
    InPayedTime,
    SelfLoaded,
    OnlyNodeInMesh,
    ProposedTooRecently,
    SoleProvider,
    NeighborsLoaded,
}

impl fmt::Display for Veto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InPayedTime => "in payed time",
            Self::SelfLoaded => "self loaded",
            Self::OnlyNodeInMesh => "only node in mesh",
            Self::ProposedTooRecently => "removal proposed too recently",
            Self::SoleProvider => "sole provider of a service",
            Self::NeighborsLoaded => "neighbors loaded",
        };
        f.write_str(name)
    }
}

/// Generator proposing removal of the current node.
///
/// Owns the only mutable state in the optimization core: the startup
/// instant (fixed at construction) and the instant of the last emitted
/// removal proposal. The latter moves only when a proposal is actually
/// emitted — merely evaluating the guards never touches it. The host
/// scheduler serializes evaluations of one generator instance, so no
/// internal synchronization is needed.
pub struct RemoveSelfGenerator<M, N, S, C = SystemClock> {
    monitor: M,
    neighbors: N,
    knowledge: S,
    clock: C,
    config: OptimizationConfig,
    startup_time: Instant,
    last_removal_proposal: Instant,
}

impl<M, N, S> RemoveSelfGenerator<M, N, S, SystemClock>
where
    M: PerformanceMonitor,
    N: NeighborStateView,
    S: ServiceKnowledge,
{
    /// Create a generator on the system clock.
    pub fn new(monitor: M, neighbors: N, knowledge: S, config: OptimizationConfig) -> Self {
        Self::with_clock(monitor, neighbors, knowledge, config, SystemClock)
    }
}

impl<M, N, S, C> RemoveSelfGenerator<M, N, S, C>
where
    M: PerformanceMonitor,
    N: NeighborStateView,
    S: ServiceKnowledge,
    C: Clock,
{
    /// Create a generator on an explicit clock.
    ///
    /// Startup time and the initial cooldown reference are both taken
    /// from the clock now, so the first proposal is spaced away from
    /// startup by at least the configured cooldown.
    pub fn with_clock(monitor: M, neighbors: N, knowledge: S, config: OptimizationConfig, clock: C) -> Self {
        let now = clock.now();
        Self {
            monitor,
            neighbors,
            knowledge,
            clock,
            config,
            startup_time: now,
            last_removal_proposal: now,
        }
    }

    /// Evaluate the six guards; `Some` names the first one that vetoed.
    fn vetoing_guard(&self, now: Instant) -> Result<Option<Veto>, GenerationError> {
        if self.in_payed_time(now) {
            return Ok(Some(Veto::InPayedTime));
        }
        if self.self_loaded()? {
            return Ok(Some(Veto::SelfLoaded));
        }
        if self.only_node_in_mesh()? {
            return Ok(Some(Veto::OnlyNodeInMesh));
        }
        if self.proposed_too_recently(now) {
            return Ok(Some(Veto::ProposedTooRecently));
        }
        if self.sole_provider()? {
            return Ok(Some(Veto::SoleProvider));
        }
        if self.neighbors_loaded()? {
            return Ok(Some(Veto::NeighborsLoaded));
        }
        Ok(None)
    }

    /// Guard 1: the node sits inside the paid-for grace window.
    ///
    /// With a billing cycle longer than the proposal cooldown, the window
    /// recurs: the first `min_grace_after_creation` of every cycle is
    /// protected. A billing cycle no longer than the cooldown makes the
    /// recurrence meaningless, and the guard degrades to a plain
    /// "recently started" check.
    fn in_payed_time(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.startup_time);
        if self.config.bill_cycle > self.config.cooldown_between_removals {
            let position = elapsed.as_millis() % self.config.bill_cycle.as_millis();
            position < self.config.min_grace_after_creation.as_millis()
        } else {
            elapsed < self.config.min_grace_after_creation
        }
    }

    /// Guard 2: the node itself is at or above its lower utilization
    /// bound — removing capacity here would worsen service.
    fn self_loaded(&self) -> Result<bool, GenerationError> {
        let current = self.monitor.current_total_cpu_utilization()?;
        let lower = self.monitor.cpu_utilization_lower_bound()?;
        Ok(current >= lower)
    }

    /// Guard 3: no known neighbors. Removing the only node would remove
    /// the service entirely.
    fn only_node_in_mesh(&self) -> Result<bool, GenerationError> {
        Ok(self.neighbors.known_neighbors()?.is_empty())
    }

    /// Guard 4: a removal proposal was emitted less than the cooldown ago.
    fn proposed_too_recently(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_removal_proposal)
            < self.config.cooldown_between_removals
    }

    /// Guard 5: some offered service has no neighbor offering it.
    ///
    /// One uncovered service is enough — removing this node would take
    /// that service out of the mesh with it. Read faults abort the cycle;
    /// only an actual "no neighbor offers this" answer counts.
    fn sole_provider(&self) -> Result<bool, GenerationError> {
        for service in self.knowledge.offered_services()? {
            if self.neighbors.neighbor_offering(&service.name)?.is_none() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Guard 6: neighbors are collectively strained.
    ///
    /// The mean runs over neighbors whose state has actually been
    /// negotiated; unknown neighbors are excluded rather than assumed
    /// loaded or idle. With no known state at all the mean is 0 and the
    /// guard passes.
    fn neighbors_loaded(&self) -> Result<bool, GenerationError> {
        let neighbors = self.neighbors.known_neighbors()?;
        if neighbors.is_empty() {
            return Ok(false);
        }
        let upper = self.monitor.cpu_utilization_upper_bound()?;
        Ok(self.neighbor_utilization_average(&neighbors)? >= upper)
    }

    fn neighbor_utilization_average(&self, neighbors: &[Neighbor]) -> Result<f64, GenerationError> {
        let mut sum = 0.0;
        let mut known = 0u32;
        for neighbor in neighbors {
            let Some(state) = self.neighbors.state_of(neighbor)? else {
                continue;
            };
            // A snapshot that never published CPU utilization is as
            // unknown as no snapshot at all.
            let Some(utilization) = state.get(StateKey::CpuUtilization) else {
                continue;
            };
            sum += utilization;
            known += 1;
        }
        if known == 0 {
            Ok(0.0)
        } else {
            Ok(sum / f64::from(known))
        }
    }

    /// Desirability of removal: distance below the lower utilization
    /// bound. Guard 2 has already excluded `current >= lower`, so the
    /// value is positive whenever it is computed.
    fn removal_weight(&self) -> Result<f64, GenerationError> {
        let lower = self.monitor.cpu_utilization_lower_bound()?;
        let current = self.monitor.current_total_cpu_utilization()?;
        Ok(lower - current)
    }
}

impl<M, N, S, C> ActionGenerator for RemoveSelfGenerator<M, N, S, C>
where
    M: PerformanceMonitor,
    N: NeighborStateView,
    S: ServiceKnowledge,
    C: Clock,
{
    fn generate_actions(&mut self) -> Result<Vec<OptimizationAction>, GenerationError> {
        let now = self.clock.now();

        if let Some(veto) = self.vetoing_guard(now)? {
            debug!(guard = %veto, "self-removal vetoed");
            return Ok(Vec::new());
        }

        // Compute the weight before touching the cooldown timestamp: a
        // read fault here must leave the generator as if the cycle never
        // happened.
        let weight = self.removal_weight()?;
        self.last_removal_proposal = now;
        debug!(weight, "proposing self-removal");
        Ok(vec![OptimizationAction::RemoveSelf { weight }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::time::Duration;

    use autarky_node::{NodeId, NodeState, ReadError, Service};

    use crate::action::Weighted;

    /// Test clock driven by hand.
    #[derive(Clone)]
    struct ManualClock(Rc<Cell<Instant>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Rc::new(Cell::new(Instant::now())))
        }

        fn advance(&self, by: Duration) {
            self.0.set(self.0.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }

    /// Scripted collaborator trio backing all three views.
    #[derive(Clone, Default)]
    struct StubNode(Rc<StubNodeInner>);

    #[derive(Default)]
    struct StubNodeInner {
        utilization: Cell<f64>,
        lower_bound: Cell<f64>,
        upper_bound: Cell<f64>,
        monitor_down: Cell<bool>,
        neighbors: RefCell<Vec<Neighbor>>,
        states: RefCell<HashMap<NodeId, NodeState>>,
        coverage: RefCell<HashMap<String, Neighbor>>,
        services: RefCell<Vec<Service>>,
    }

    impl StubNode {
        fn add_neighbor(&self, id: u64) -> Neighbor {
            let neighbor = Neighbor::new(NodeId(id));
            self.0.neighbors.borrow_mut().push(neighbor);
            neighbor
        }

        fn set_neighbor_utilization(&self, neighbor: Neighbor, utilization: f64) {
            let state: NodeState = [(StateKey::CpuUtilization, utilization)].into_iter().collect();
            self.0.states.borrow_mut().insert(neighbor.id, state);
        }

        fn offer_service(&self, name: &str, covered_by: Option<Neighbor>) {
            self.0.services.borrow_mut().push(Service::new(name));
            if let Some(neighbor) = covered_by {
                self.0.coverage.borrow_mut().insert(name.to_string(), neighbor);
            }
        }
    }

    impl PerformanceMonitor for StubNode {
        fn current_total_cpu_utilization(&self) -> Result<f64, ReadError> {
            if self.0.monitor_down.get() {
                return Err(ReadError::new("monitor down"));
            }
            Ok(self.0.utilization.get())
        }

        fn cpu_utilization_lower_bound(&self) -> Result<f64, ReadError> {
            Ok(self.0.lower_bound.get())
        }

        fn cpu_utilization_upper_bound(&self) -> Result<f64, ReadError> {
            Ok(self.0.upper_bound.get())
        }

        fn service_request_rate(&self, _service: &str) -> Result<f64, ReadError> {
            Ok(0.0)
        }
    }

    impl NeighborStateView for StubNode {
        fn known_neighbors(&self) -> Result<Vec<Neighbor>, ReadError> {
            Ok(self.0.neighbors.borrow().clone())
        }

        fn state_of(&self, neighbor: &Neighbor) -> Result<Option<NodeState>, ReadError> {
            Ok(self.0.states.borrow().get(&neighbor.id).cloned())
        }

        fn neighbor_offering(&self, service: &str) -> Result<Option<Neighbor>, ReadError> {
            Ok(self.0.coverage.borrow().get(service).copied())
        }
    }

    impl ServiceKnowledge for StubNode {
        fn offered_services(&self) -> Result<Vec<Service>, ReadError> {
            Ok(self.0.services.borrow().clone())
        }
    }

    /// A node for which every guard passes once enough time has elapsed:
    /// idle self (0.1 vs lower bound 0.3), one moderately loaded neighbor
    /// covering the one offered service, relaxed upper bound.
    fn favorable_node() -> StubNode {
        let node = StubNode::default();
        node.0.utilization.set(0.1);
        node.0.lower_bound.set(0.3);
        node.0.upper_bound.set(0.9);
        let n1 = node.add_neighbor(1);
        node.set_neighbor_utilization(n1, 0.5);
        node.offer_service("storage", Some(n1));
        node
    }

    fn config(grace: Duration, cooldown: Duration, bill: Duration) -> OptimizationConfig {
        OptimizationConfig {
            min_grace_after_creation: grace,
            cooldown_between_removals: cooldown,
            bill_cycle: bill,
        }
    }

    const MINUTE: Duration = Duration::from_secs(60);

    fn generator(
        node: &StubNode,
        clock: &ManualClock,
        config: OptimizationConfig,
    ) -> RemoveSelfGenerator<StubNode, StubNode, StubNode, ManualClock> {
        RemoveSelfGenerator::with_clock(
            node.clone(),
            node.clone(),
            node.clone(),
            config,
            clock.clone(),
        )
    }

    #[test]
    fn proposes_removal_when_all_guards_pass() {
        let node = favorable_node();
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        let actions = gen.generate_actions().unwrap();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], OptimizationAction::RemoveSelf { .. }));
    }

    #[test]
    fn weight_is_distance_below_lower_bound() {
        let node = favorable_node();
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        let actions = gen.generate_actions().unwrap();
        assert_eq!(actions.len(), 1);
        let weight = actions[0].weight();
        assert_eq!(weight, 0.3 - 0.1);
        assert!(weight > 0.0);
    }

    #[test]
    fn billing_grace_recurs_every_cycle() {
        let node = favorable_node();
        let clock = ManualClock::new();
        // 10-minute billing cycle, 2-minute grace, 3-minute cooldown.
        let mut gen = generator(&node, &clock, config(2 * MINUTE, 3 * MINUTE, 10 * MINUTE));

        // 1 minute into the first cycle: protected.
        clock.advance(MINUTE);
        assert!(gen.generate_actions().unwrap().is_empty());

        // 61 minutes = 1 minute into the seventh cycle: still protected,
        // long after startup.
        clock.advance(60 * MINUTE);
        assert!(gen.generate_actions().unwrap().is_empty());

        // 65 minutes = 5 minutes into the cycle: past the grace window.
        clock.advance(4 * MINUTE);
        assert_eq!(gen.generate_actions().unwrap().len(), 1);
    }

    #[test]
    fn short_billing_cycle_degrades_to_startup_grace() {
        let node = favorable_node();
        let clock = ManualClock::new();
        // bill cycle (1 min) <= cooldown (2 min): billing is irrelevant.
        // Under the recurring window every instant would satisfy
        // `elapsed mod 1min < 5min` and removal would be vetoed forever.
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 2 * MINUTE, MINUTE));

        clock.advance(3 * MINUTE);
        assert!(gen.generate_actions().unwrap().is_empty(), "inside startup grace");

        clock.advance(3 * MINUTE);
        assert_eq!(gen.generate_actions().unwrap().len(), 1, "past startup grace");
    }

    #[test]
    fn cooldown_spaces_consecutive_proposals() {
        let node = favorable_node();
        let clock = ManualClock::new();
        let mut gen = generator(
            &node,
            &clock,
            config(Duration::from_secs(10), Duration::from_secs(60), 10 * MINUTE),
        );

        clock.advance(2 * MINUTE);
        assert_eq!(gen.generate_actions().unwrap().len(), 1, "first proposal");

        clock.advance(Duration::from_secs(30));
        assert!(
            gen.generate_actions().unwrap().is_empty(),
            "30s after a proposal is inside the 60s cooldown"
        );

        clock.advance(Duration::from_secs(31));
        assert_eq!(
            gen.generate_actions().unwrap().len(),
            1,
            "61s after a proposal the cooldown has expired"
        );
    }

    #[test]
    fn vetoed_cycles_do_not_reset_the_cooldown() {
        let node = favorable_node();
        let clock = ManualClock::new();
        let mut gen = generator(
            &node,
            &clock,
            config(Duration::from_secs(10), Duration::from_secs(60), 10 * MINUTE),
        );

        clock.advance(2 * MINUTE);
        assert_eq!(gen.generate_actions().unwrap().len(), 1);

        // Evaluate twice inside the cooldown; neither evaluation may push
        // the window further out.
        clock.advance(Duration::from_secs(20));
        assert!(gen.generate_actions().unwrap().is_empty());
        clock.advance(Duration::from_secs(20));
        assert!(gen.generate_actions().unwrap().is_empty());

        clock.advance(Duration::from_secs(21));
        assert_eq!(gen.generate_actions().unwrap().len(), 1);
    }

    #[test]
    fn sole_provider_of_any_service_vetoes() {
        let node = favorable_node();
        // A second service nobody else offers. Coverage of "storage"
        // does not help: one uncovered service is enough.
        node.offer_service("index", None);
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        assert!(gen.generate_actions().unwrap().is_empty());
    }

    #[test]
    fn last_node_in_mesh_never_proposes_removal() {
        let node = StubNode::default();
        node.0.utilization.set(0.0);
        node.0.lower_bound.set(0.3);
        node.0.upper_bound.set(0.9);
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        assert!(
            gen.generate_actions().unwrap().is_empty(),
            "an idle node with no neighbors must still stay"
        );
    }

    #[test]
    fn loaded_self_vetoes_even_at_the_boundary() {
        let node = favorable_node();
        node.0.utilization.set(0.3); // exactly the lower bound
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        assert!(gen.generate_actions().unwrap().is_empty());
    }

    #[test]
    fn neighbor_average_ignores_unknown_state() {
        let node = favorable_node();
        // n1 (0.5) from the fixture, plus one known-idle, one unknown,
        // and one known-loaded neighbor. Mean over known = (0.5 + 0.2 +
        // 0.8) / 3 = 0.5, below the 0.9 upper bound.
        let n2 = node.add_neighbor(2);
        node.set_neighbor_utilization(n2, 0.2);
        node.add_neighbor(3); // never negotiated
        let n4 = node.add_neighbor(4);
        node.set_neighbor_utilization(n4, 0.8);
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        assert_eq!(gen.generate_actions().unwrap().len(), 1);
    }

    #[test]
    fn loaded_neighbors_veto() {
        let node = favorable_node();
        node.0.upper_bound.set(0.5); // fixture neighbor sits at exactly 0.5
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        assert!(gen.generate_actions().unwrap().is_empty());
    }

    #[test]
    fn fully_unknown_neighborhood_counts_as_unloaded() {
        let node = favorable_node();
        node.0.states.borrow_mut().clear(); // no negotiated state at all
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        assert_eq!(
            gen.generate_actions().unwrap().len(),
            1,
            "absent state is excluded from the average, not assumed loaded"
        );
    }

    #[test]
    fn snapshot_without_cpu_key_is_treated_as_unknown() {
        let node = favorable_node();
        node.0.upper_bound.set(0.5);
        // Replace n1's snapshot with one that never published CPU
        // utilization, and add a neighbor known to sit at 0.5. If the
        // keyless snapshot were counted as zero the mean would drop to
        // 0.25 and the guard would pass.
        node.0.states.borrow_mut().insert(
            NodeId(1),
            [(StateKey::RequestRate, 42.0)].into_iter().collect(),
        );
        let n2 = node.add_neighbor(2);
        node.set_neighbor_utilization(n2, 0.5);
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        assert!(gen.generate_actions().unwrap().is_empty());
    }

    #[test]
    fn collaborator_fault_surfaces_as_generation_error() {
        let node = favorable_node();
        node.0.monitor_down.set(true);
        let clock = ManualClock::new();
        let mut gen = generator(&node, &clock, config(5 * MINUTE, 10 * MINUTE, 60 * MINUTE));

        clock.advance(12 * MINUTE);
        let err = gen.generate_actions().unwrap_err();
        assert!(matches!(err, GenerationError::Collaborator(_)));
    }

    #[test]
    fn faulted_cycle_leaves_cooldown_untouched() {
        let node = favorable_node();
        let clock = ManualClock::new();
        let mut gen = generator(
            &node,
            &clock,
            config(Duration::from_secs(10), Duration::from_secs(60), 10 * MINUTE),
        );

        clock.advance(2 * MINUTE);
        assert_eq!(gen.generate_actions().unwrap().len(), 1);

        // Cooldown expires, but the monitor is down for one cycle.
        clock.advance(Duration::from_secs(61));
        node.0.monitor_down.set(true);
        assert!(gen.generate_actions().is_err());

        // Monitor recovers; the proposal from before the fault is still
        // the cooldown reference, so removal is proposed immediately.
        node.0.monitor_down.set(false);
        assert_eq!(gen.generate_actions().unwrap().len(), 1);
    }
}
