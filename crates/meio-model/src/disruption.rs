//! Per-node supply disruption processes.
//!
//! A disruption process is a two-state {Up, Down} machine stepped once per
//! period, plus a [`DisruptionKind`] naming which flow step is suppressed
//! while Down.  Two transition models exist: Markovian (disrupt with
//! probability `alpha`, recover with probability `beta`) and an explicit
//! boolean sequence for scripted scenarios.
//!
//! The Markov chain's steady-state availability is `beta / (alpha + beta)`,
//! which long-horizon tests use to sanity-check simulated disruption
//! frequency.

use meio_core::SimRng;

use crate::{ModelError, ModelResult};

// ── DisruptionKind ────────────────────────────────────────────────────────────

/// Which flow step a Down disruption suppresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisruptionKind {
    /// The node places no orders while Down.
    OrderPausing,
    /// The node releases no outbound shipments while Down.
    ShipmentPausing,
    /// Shipments bound for the node are held one extra period in transit.
    TransitPausing,
    /// Arriving shipments park at the node's door instead of being received.
    ReceiptPausing,
}

// ── DisruptionState ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisruptionState {
    #[default]
    Up,
    Down,
}

// ── DisruptionProcess ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum TransitionModel {
    Markov {
        /// P(Up → Down) per period.
        disrupt_prob: f64,
        /// P(Down → Up) per period.
        recover_prob: f64,
    },
    Explicit {
        /// `true` = Down.  Cycled over the horizon.
        pattern: Vec<bool>,
        cursor:  usize,
    },
}

/// A stateful per-node disruption machine.
///
/// Stored on the network as a template and cloned into each simulation run,
/// so trials never share mutable state.
#[derive(Clone, Debug)]
pub struct DisruptionProcess {
    kind:  DisruptionKind,
    model: TransitionModel,
    state: DisruptionState,
}

impl DisruptionProcess {
    /// Markov disruptions: Up→Down w.p. `disrupt_prob`, Down→Up w.p.
    /// `recover_prob`.  Both probabilities must lie in [0, 1].
    pub fn markov(kind: DisruptionKind, disrupt_prob: f64, recover_prob: f64) -> ModelResult<Self> {
        ensure_probability("disrupt_prob", disrupt_prob)?;
        ensure_probability("recover_prob", recover_prob)?;
        Ok(Self {
            kind,
            model: TransitionModel::Markov { disrupt_prob, recover_prob },
            state: DisruptionState::Up,
        })
    }

    /// Scripted disruptions: state read from `pattern` (`true` = Down),
    /// cycled when the horizon outruns the sequence.
    pub fn explicit(kind: DisruptionKind, pattern: Vec<bool>) -> ModelResult<Self> {
        if pattern.is_empty() {
            return Err(ModelError::EmptySequence("disruption pattern"));
        }
        Ok(Self {
            kind,
            model: TransitionModel::Explicit { pattern, cursor: 0 },
            state: DisruptionState::Up,
        })
    }

    /// Override the initial state (processes start Up unless pre-set).
    pub fn starting_from(mut self, state: DisruptionState) -> Self {
        self.state = state;
        self
    }

    // ── Per-period stepping ───────────────────────────────────────────────

    /// Advance one period.  The Markov model consumes exactly one draw from
    /// `rng` per call regardless of the outcome, keeping stream consumption
    /// independent of the realized state sequence.
    pub fn step(&mut self, rng: &mut SimRng) {
        match &mut self.model {
            TransitionModel::Markov { disrupt_prob, recover_prob } => {
                let transition = match self.state {
                    DisruptionState::Up => rng.gen_bool(*disrupt_prob),
                    DisruptionState::Down => rng.gen_bool(*recover_prob),
                };
                if transition {
                    self.state = match self.state {
                        DisruptionState::Up => DisruptionState::Down,
                        DisruptionState::Down => DisruptionState::Up,
                    };
                }
            }
            TransitionModel::Explicit { pattern, cursor } => {
                let down = pattern[*cursor % pattern.len()];
                *cursor += 1;
                self.state = if down { DisruptionState::Down } else { DisruptionState::Up };
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn is_disrupted(&self) -> bool {
        self.state == DisruptionState::Down
    }

    #[inline]
    pub fn kind(&self) -> DisruptionKind {
        self.kind
    }

    /// Steady-state fraction of periods Up (`beta / (alpha + beta)`).
    ///
    /// `None` for explicit patterns, and for the degenerate Markov chain
    /// with `alpha == beta == 0` (whose state never changes).
    pub fn availability(&self) -> Option<f64> {
        match &self.model {
            TransitionModel::Markov { disrupt_prob, recover_prob } => {
                let denom = disrupt_prob + recover_prob;
                (denom > 0.0).then(|| recover_prob / denom)
            }
            TransitionModel::Explicit { .. } => None,
        }
    }
}

fn ensure_probability(what: &'static str, p: f64) -> ModelResult<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(ModelError::InvalidParameter {
            what,
            detail: format!("{p} is not a probability in [0, 1]"),
        });
    }
    Ok(())
}
