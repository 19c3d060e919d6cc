//! `meio-model` — the leaf collaborators consumed by the simulation engine.
//!
//! # Crate layout
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`demand`]     | `DemandKind`, `DemandSource` — per-period realizations |
//! | [`disruption`] | `DisruptionProcess` — per-node Up/Down state machine   |
//! | [`policy`]     | `PolicyKind`, `InventoryPolicy` — order-up-to rules    |
//! | [`error`]      | `ModelError`, `ModelResult`                            |
//!
//! All three collaborators are **closed tagged variants** with exhaustive
//! matching, so covering a new variant is a compile-time decision rather
//! than a stringly-typed dispatch.  All stochastic draws take the run's
//! [`SimRng`](meio_core::SimRng) as an explicit parameter.

pub mod demand;
pub mod disruption;
pub mod error;
pub mod policy;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use demand::{DemandKind, DemandSource};
pub use disruption::{DisruptionKind, DisruptionProcess, DisruptionState};
pub use error::{ModelError, ModelResult};
pub use policy::{InventoryPolicy, PolicyKind};
