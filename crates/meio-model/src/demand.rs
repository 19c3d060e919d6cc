//! Parametric demand sources.
//!
//! A `DemandSource` produces one realized demand value per period.  The
//! parameter set is described by the closed [`DemandKind`] enum; construction
//! validates parameters once and pre-builds the `rand_distr` sampler, so the
//! per-period draw path is match-and-sample with no fallible work.
//!
//! Negative draws from the normal family are truncated at zero — demand
//! cannot be negative.

use rand_distr::{Normal, Poisson, Uniform};

use meio_core::{Period, SimRng};

use crate::{ModelError, ModelResult};

// ── DemandKind ────────────────────────────────────────────────────────────────

/// Parameter description of a demand source.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DemandKind {
    /// The same value every period.
    Constant { value: f64 },
    /// Integer demand uniform on `lo..=hi`.
    UniformDiscrete { lo: u64, hi: u64 },
    /// Continuous demand uniform on `[lo, hi]`.
    UniformContinuous { lo: f64, hi: f64 },
    /// Normal demand, truncated at zero.
    Normal { mean: f64, std_dev: f64 },
    /// Poisson demand with the given rate.
    Poisson { lambda: f64 },
    /// An explicit per-period sequence, cycled over the horizon.
    Deterministic { values: Vec<f64> },
}

// ── DemandSource ──────────────────────────────────────────────────────────────

/// Pre-built sampler for the distribution families, so `generate` never has
/// to revalidate parameters.
#[derive(Clone, Debug)]
enum Sampler {
    Fixed,
    UniformContinuous(Uniform<f64>),
    Normal(Normal<f64>),
    Poisson(Poisson<f64>),
}

/// A validated, samplable demand source.
///
/// Construct via [`DemandSource::new`] or the per-family shorthands; both
/// reject invalid parameters eagerly with a [`ModelError`].
#[derive(Clone, Debug)]
pub struct DemandSource {
    kind:    DemandKind,
    sampler: Sampler,
}

impl DemandSource {
    /// Validate `kind` and build a source from it.
    pub fn new(kind: DemandKind) -> ModelResult<Self> {
        let sampler = match &kind {
            DemandKind::Constant { value } => {
                ensure_finite_nonneg("constant demand", *value)?;
                Sampler::Fixed
            }
            DemandKind::UniformDiscrete { lo, hi } => {
                if lo > hi {
                    return Err(ModelError::InvalidParameter {
                        what:   "uniform demand",
                        detail: format!("lo {lo} exceeds hi {hi}"),
                    });
                }
                Sampler::Fixed
            }
            DemandKind::UniformContinuous { lo, hi } => {
                ensure_finite_nonneg("uniform demand lo", *lo)?;
                ensure_finite_nonneg("uniform demand hi", *hi)?;
                if lo > hi {
                    return Err(ModelError::InvalidParameter {
                        what:   "uniform demand",
                        detail: format!("lo {lo} exceeds hi {hi}"),
                    });
                }
                Sampler::UniformContinuous(Uniform::new_inclusive(*lo, *hi))
            }
            DemandKind::Normal { mean, std_dev } => {
                ensure_finite_nonneg("normal demand mean", *mean)?;
                ensure_finite_nonneg("normal demand std_dev", *std_dev)?;
                let dist = Normal::new(*mean, *std_dev).map_err(|e| {
                    ModelError::InvalidParameter {
                        what:   "normal demand",
                        detail: e.to_string(),
                    }
                })?;
                Sampler::Normal(dist)
            }
            DemandKind::Poisson { lambda } => {
                let dist = Poisson::new(*lambda).map_err(|e| ModelError::InvalidParameter {
                    what:   "poisson demand",
                    detail: e.to_string(),
                })?;
                Sampler::Poisson(dist)
            }
            DemandKind::Deterministic { values } => {
                if values.is_empty() {
                    return Err(ModelError::EmptySequence("deterministic demand"));
                }
                for &v in values {
                    ensure_finite_nonneg("deterministic demand", v)?;
                }
                Sampler::Fixed
            }
        };
        Ok(Self { kind, sampler })
    }

    // ── Per-family shorthands ─────────────────────────────────────────────

    pub fn constant(value: f64) -> ModelResult<Self> {
        Self::new(DemandKind::Constant { value })
    }

    pub fn uniform_discrete(lo: u64, hi: u64) -> ModelResult<Self> {
        Self::new(DemandKind::UniformDiscrete { lo, hi })
    }

    pub fn uniform_continuous(lo: f64, hi: f64) -> ModelResult<Self> {
        Self::new(DemandKind::UniformContinuous { lo, hi })
    }

    pub fn normal(mean: f64, std_dev: f64) -> ModelResult<Self> {
        Self::new(DemandKind::Normal { mean, std_dev })
    }

    pub fn poisson(lambda: f64) -> ModelResult<Self> {
        Self::new(DemandKind::Poisson { lambda })
    }

    pub fn deterministic(values: Vec<f64>) -> ModelResult<Self> {
        Self::new(DemandKind::Deterministic { values })
    }

    // ── Sampling ──────────────────────────────────────────────────────────

    /// Realize this period's demand.
    ///
    /// Deterministic sequences cycle (`period mod len`); the stochastic
    /// families consume exactly one draw from `rng` per call.
    pub fn generate(&self, period: Period, rng: &mut SimRng) -> Option<f64> {
        let value = match &self.sampler {
            Sampler::UniformContinuous(dist) => rng.sample(dist),
            Sampler::Normal(dist) => rng.sample::<f64, _>(dist).max(0.0),
            Sampler::Poisson(dist) => rng.sample(dist),
            Sampler::Fixed => match &self.kind {
                DemandKind::Constant { value } => *value,
                DemandKind::UniformDiscrete { lo, hi } => rng.gen_range(*lo..=*hi) as f64,
                DemandKind::Deterministic { values } => values[period.index() % values.len()],
                // The remaining kinds always carry a pre-built sampler.
                _ => return None,
            },
        };
        Some(value)
    }

    /// The parameter description this source was built from.
    pub fn kind(&self) -> &DemandKind {
        &self.kind
    }

    /// Mean demand per period, where the family has a closed form.
    pub fn mean(&self) -> f64 {
        match &self.kind {
            DemandKind::Constant { value } => *value,
            DemandKind::UniformDiscrete { lo, hi } => (*lo + *hi) as f64 / 2.0,
            DemandKind::UniformContinuous { lo, hi } => (lo + hi) / 2.0,
            DemandKind::Normal { mean, .. } => *mean,
            DemandKind::Poisson { lambda } => *lambda,
            DemandKind::Deterministic { values } => {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
    }
}

fn ensure_finite_nonneg(what: &'static str, v: f64) -> ModelResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(ModelError::InvalidParameter {
            what,
            detail: format!("{v} is not finite and non-negative"),
        });
    }
    Ok(())
}
