//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Period` counter.  One period is one
//! review cycle: demand is realized, orders are placed, shipments are
//! released and received, costs are accrued, and the books roll forward.
//! Using an integer period as the canonical time unit keeps all pipeline
//! arithmetic exact and comparisons O(1).

use std::fmt;

// ── Period ────────────────────────────────────────────────────────────────────

/// An absolute simulation period counter.
///
/// Stored as `u32`: horizons of interest run to tens of thousands of periods,
/// far below the representable range.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Period(pub u32);

impl Period {
    pub const ZERO: Period = Period(0);

    /// Return the period `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u32) -> Period {
        Period(self.0 + n)
    }

    /// Cast to `usize` for direct use as a state-array index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::ops::Add<u32> for Period {
    type Output = Period;
    #[inline]
    fn add(self, rhs: u32) -> Period {
        Period(self.0 + rhs)
    }
}

impl std::ops::Sub for Period {
    type Output = u32;
    #[inline]
    fn sub(self, rhs: Period) -> u32 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically built in code by the caller (or loaded from a TOML/JSON file by
/// an application crate with the `serde` feature) and passed to the
/// simulation runner.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Periods to simulate.  State arrays are allocated for
    /// `num_periods + extra_periods` so pipeline look-ahead never runs out
    /// of range (the extra span is derived from the network's lead times).
    pub num_periods: u32,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
}

impl SimConfig {
    pub fn new(num_periods: u32, seed: u64) -> Self {
        Self { num_periods, seed }
    }

    /// The period at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_period(&self) -> Period {
        Period(self.num_periods)
    }
}
