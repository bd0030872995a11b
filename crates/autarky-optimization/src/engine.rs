//! Per-cycle orchestration: run every generator, pool, select one.
//!
//! The engine is the glue between the host scheduler and the core: one
//! [`run_cycle`](OptimizationEngine::run_cycle) call per control cycle.
//! Generators are independent, so one generator's read fault must not
//! starve the others — failed generators are skipped for the cycle and
//! their errors handed back in the [`CycleOutcome`] for the host to
//! observe, alongside a `tracing` warning.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::action::OptimizationAction;
use crate::error::{GenerationError, SelectionError};
use crate::generator::ActionGenerator;
use crate::selector;

/// The result of one control cycle.
#[derive(Debug)]
pub struct CycleOutcome {
    /// The action chosen for execution, if any generator proposed one.
    pub chosen: Option<OptimizationAction>,
    /// Faults from generators that could not evaluate this cycle. The
    /// cycle itself still completed over the remaining generators.
    pub failures: Vec<GenerationError>,
}

impl CycleOutcome {
    fn quiet() -> Self {
        Self {
            chosen: None,
            failures: Vec::new(),
        }
    }
}

/// Owns the registered generators and the arbitration RNG.
///
/// One engine per node; the host scheduler serializes `run_cycle` calls,
/// matching the single-writer discipline the generators rely on for their
/// cooldown bookkeeping.
pub struct OptimizationEngine {
    generators: Vec<Box<dyn ActionGenerator>>,
    rng: StdRng,
}

impl OptimizationEngine {
    /// Create an engine drawing randomness from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an engine with an explicit RNG (seeded in tests).
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            generators: Vec::new(),
            rng,
        }
    }

    /// Register a generator. Registration order carries no meaning.
    pub fn register(&mut self, generator: Box<dyn ActionGenerator>) {
        self.generators.push(generator);
    }

    /// Number of registered generators.
    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    /// Run one control cycle: generate, pool, select.
    ///
    /// Returns `Ok` with `chosen: None` when no generator proposed
    /// anything. `Err` means the selector itself failed on a non-empty
    /// pool; the host should treat the cycle as "no action this cycle"
    /// and keep the loop alive.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, SelectionError> {
        let mut outcome = CycleOutcome::quiet();
        let mut pool: Vec<OptimizationAction> = Vec::new();

        for generator in &mut self.generators {
            match generator.generate_actions() {
                Ok(actions) => pool.extend(actions),
                Err(err) => {
                    warn!(error = %err, "action generator failed; skipping it this cycle");
                    outcome.failures.push(err);
                }
            }
        }

        if pool.is_empty() {
            debug!("no candidate actions this cycle");
            return Ok(outcome);
        }

        debug!(candidates = pool.len(), "selecting among pooled actions");
        let chosen = selector::select_owned(pool, &mut self.rng)?;
        outcome.chosen = Some(chosen);
        Ok(outcome)
    }
}

impl Default for OptimizationEngine {
    fn default() -> Self {
        Self::new()
    }
}
