//! `meio-core` — foundational types for the `meio` multi-echelon inventory
//! simulation framework.
//!
//! This crate is a dependency of every other `meio-*` crate.  It intentionally
//! has no `meio-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                      |
//! |-------------|-----------------------------------------------|
//! | [`ids`]     | `NodeId`, `TrialId`                           |
//! | [`period`]  | `Period`, `SimConfig`                         |
//! | [`rng`]     | `SimRng` (per-run / per-trial seeded stream)  |
//! | [`error`]   | `CoreError`, `CoreResult`                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod period;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{NodeId, TrialId};
pub use period::{Period, SimConfig};
pub use rng::SimRng;
