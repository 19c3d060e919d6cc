//! `meio-network` — supply-chain topology for the meio framework.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`node`]      | `SupplyNode` static data, `HoldingCost`                   |
//! | [`network`]   | `SupplyNetwork`, `NetworkBuilder`, `Partner` slot API     |
//! | [`traversal`] | `TraversalPlan` — the per-period DFS visit sequences      |
//! | [`error`]     | `NetworkError`, `NetworkResult`                           |
//!
//! A network is built once, validated (acyclicity, cost signs, usage rates),
//! and then shared immutably across simulation runs.  All per-period lookup
//! structures — adjacency, partner slot maps, descendant sets, traversal
//! plans — are precomputed at build time.

pub mod error;
pub mod network;
pub mod node;
pub mod traversal;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{NetworkError, NetworkResult};
pub use network::{NetworkBuilder, Partner, SupplyNetwork};
pub use node::{HoldingCost, SupplyNode};
pub use traversal::TraversalPlan;
