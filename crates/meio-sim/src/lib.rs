//! `meio-sim` — the discrete-time network simulation engine.
//!
//! # Four-phase period loop
//!
//! ```text
//! for t in 0..config.num_periods:
//!   ⓪ Disruptions — step each node's Up/Down process (ascending index).
//!   ① Orders      — demand draws (DFS pre-order), then each node receives
//!                   inbound orders and orders from its predecessors
//!                   (DFS post-order: after all of its successors).
//!   ② Shipments   — each node receives arrivals, assembles raw material
//!                   into finished goods, allocates stock to successors,
//!                   and releases shipments (after all of its predecessors).
//!   ③ Roll        — pipelines advance one slot; closing stocks and
//!                   cumulative counters become period t+1's opening values.
//!   ④ Costs       — holding / stockout / in-transit / revenue accrual and
//!                   the per-node reconciliation check (fatal on drift).
//! ```
//!
//! A run is fully determined by `(network, seed)`: one seeded stream,
//! consumed in a fixed traversal order.  Multi-trial evaluation fans
//! independent runs out across threads (`parallel` feature) with no shared
//! mutable state.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                             |
//! |------------|----------------------------------------------------|
//! | `parallel` | Runs multi-trial batches on Rayon's thread pool.   |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use meio_core::SimConfig;
//! use meio_sim::{simulate, Simulation, NoopObserver};
//!
//! // One-shot evaluation:
//! let total = simulate(&network, 100, 42)?;
//!
//! // Trajectory inspection:
//! let mut sim = Simulation::new(&network, SimConfig::new(100, 42))?;
//! sim.run(&mut NoopObserver)?;
//! let sink = sim.node_state(sink_id);
//! println!("{:?}", sink.inventory_levels(100));
//! ```

pub mod engine;
pub mod error;
pub mod observer;
pub mod state;
pub mod trial;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use engine::{Simulation, simulate};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use state::{NodeState, PeriodState};
pub use trial::{TrialStats, evaluate_trials};
