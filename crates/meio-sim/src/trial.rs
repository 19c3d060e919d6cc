//! Multi-trial evaluation.
//!
//! Trials are embarrassingly parallel: each one is an independent
//! [`Simulation`] with its own deterministically derived RNG stream and its
//! own copy of all node state, sharing only the immutable network.  With the
//! `parallel` Cargo feature the batch fans out on Rayon's thread pool;
//! otherwise it runs sequentially.  Either way, trial `i` produces the same
//! cost for the same `(network, config)` — results do not depend on the
//! execution schedule.

use meio_core::{SimConfig, SimRng, TrialId};
use meio_network::SupplyNetwork;

use crate::observer::NoopObserver;
use crate::{SimResult, Simulation};

// ── TrialStats ────────────────────────────────────────────────────────────────

/// Per-trial total costs plus the usual summary statistics.
#[derive(Clone, Debug)]
pub struct TrialStats {
    /// Total cost of each trial, indexed by `TrialId`.
    pub costs: Vec<f64>,
}

impl TrialStats {
    pub fn num_trials(&self) -> usize {
        self.costs.len()
    }

    pub fn mean(&self) -> f64 {
        if self.costs.is_empty() {
            return 0.0;
        }
        self.costs.iter().sum::<f64>() / self.costs.len() as f64
    }

    /// Sample standard deviation (n − 1 denominator); 0 for fewer than two
    /// trials.
    pub fn std_dev(&self) -> f64 {
        let n = self.costs.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let ss: f64 = self.costs.iter().map(|c| (c - mean) * (c - mean)).sum();
        (ss / (n - 1) as f64).sqrt()
    }

    /// Standard error of the mean.
    pub fn std_err(&self) -> f64 {
        let n = self.costs.len();
        if n < 2 {
            return 0.0;
        }
        self.std_dev() / (n as f64).sqrt()
    }
}

// ── Evaluation ────────────────────────────────────────────────────────────────

/// Run `num_trials` independent simulations of `config` against `network`.
///
/// Trial `i`'s stream is `SimRng::for_trial(config.seed, TrialId(i))`, so
/// growing the batch never perturbs earlier trials.
pub fn evaluate_trials(
    network:    &SupplyNetwork,
    config:     SimConfig,
    num_trials: u32,
) -> SimResult<TrialStats> {
    #[cfg(not(feature = "parallel"))]
    let costs = (0..num_trials)
        .map(|i| run_trial(network, config, TrialId(i)))
        .collect::<SimResult<Vec<f64>>>()?;

    #[cfg(feature = "parallel")]
    let costs = {
        use rayon::prelude::*;
        (0..num_trials)
            .into_par_iter()
            .map(|i| run_trial(network, config, TrialId(i)))
            .collect::<SimResult<Vec<f64>>>()?
    };

    Ok(TrialStats { costs })
}

fn run_trial(network: &SupplyNetwork, config: SimConfig, trial: TrialId) -> SimResult<f64> {
    let rng = SimRng::for_trial(config.seed, trial);
    let mut sim = Simulation::with_rng(network, config, rng)?;
    sim.run(&mut NoopObserver)
}
