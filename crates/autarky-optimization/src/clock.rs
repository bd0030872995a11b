//! Time source for the policy guards.
//!
//! Three of the removal guards are time-dependent (billing grace, startup
//! grace, proposal cooldown). Generators read time through the [`Clock`]
//! trait instead of calling [`Instant::now`] directly, so tests can drive
//! those guards deterministically without sleeping.

use std::time::Instant;

/// A monotonic time source.
pub trait Clock {
    /// The current instant. Must be monotonically non-decreasing across
    /// calls on the same clock.
    fn now(&self) -> Instant;
}

/// The real monotonic clock. The default for production generators.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
