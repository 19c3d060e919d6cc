//! Simulation observer trait for progress reporting and data collection.

use meio_core::Period;

use crate::state::NodeState;

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at key
/// points in the period loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  `on_period_end` exposes the full node
/// trajectories read-only — this is the seam where external reporting or
/// persistence consumers attach without the engine knowing about any
/// specific output format.
///
/// # Example — period cost printer
///
/// ```rust,ignore
/// struct CostPrinter;
///
/// impl SimObserver for CostPrinter {
///     fn on_period_end(&mut self, period: Period, states: &[NodeState]) {
///         let cost: f64 = states
///             .iter()
///             .map(|s| s.period(period.index()).total_cost_incurred)
///             .sum();
///         println!("{period}: cost {cost:.2}");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each period, before any processing.
    fn on_period_start(&mut self, _period: Period) {}

    /// Called after a period completes (all four phases done).
    fn on_period_end(&mut self, _period: Period, _states: &[NodeState]) {}

    /// Called once after the final period, with the network-wide total cost.
    fn on_run_end(&mut self, _total_cost: f64) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
