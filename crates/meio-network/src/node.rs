//! Static per-node data.

use std::fmt;
use std::sync::Arc;

use meio_core::NodeId;
use meio_model::{DemandSource, DisruptionProcess, InventoryPolicy};

use crate::{NetworkError, NetworkResult};

// ── HoldingCost ───────────────────────────────────────────────────────────────

/// Per-period holding cost of finished goods at a node.
///
/// `Linear(rate)` charges `rate × max(0, inventory_level)`; `Function`
/// replaces that formula with an arbitrary function of the same clamped
/// level (e.g. piecewise or convex storage pricing).
#[derive(Clone)]
pub enum HoldingCost {
    Linear(f64),
    Function(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl HoldingCost {
    /// Holding cost for a signed ending inventory level.
    #[inline]
    pub fn evaluate(&self, inventory_level: f64) -> f64 {
        let on_hand = inventory_level.max(0.0);
        match self {
            HoldingCost::Linear(rate) => rate * on_hand,
            HoldingCost::Function(f) => f(on_hand),
        }
    }

    /// The linear rate, where one exists.  Used as the default in-transit
    /// rate and to price raw-material stock held downstream; a custom
    /// function has no meaningful per-unit rate and yields 0.
    #[inline]
    pub fn linear_rate(&self) -> f64 {
        match self {
            HoldingCost::Linear(rate) => *rate,
            HoldingCost::Function(_) => 0.0,
        }
    }
}

impl Default for HoldingCost {
    fn default() -> Self {
        HoldingCost::Linear(0.0)
    }
}

impl fmt::Debug for HoldingCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldingCost::Linear(rate) => f.debug_tuple("Linear").field(rate).finish(),
            HoldingCost::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<f64> for HoldingCost {
    fn from(rate: f64) -> Self {
        HoldingCost::Linear(rate)
    }
}

// ── SupplyNode ────────────────────────────────────────────────────────────────

/// Static configuration of one node in the supply network.
///
/// All fields are `pub`; construct with a struct literal over
/// `..Default::default()`.  BOM usage rates live on the network's edges, not
/// here.  The `demand` and `disruption` fields are templates: the simulation
/// clones them per run so the network itself stays immutable and shareable
/// across parallel trials.
#[derive(Clone, Debug, Default)]
pub struct SupplyNode {
    /// Holding cost of finished goods per unit per period.
    pub local_holding_cost: HoldingCost,

    /// Stockout (backorder) penalty per unit per period.
    pub stockout_cost: f64,

    /// Holding rate applied to units in transit to successors.  Defaults to
    /// the local linear rate.
    pub in_transit_holding_cost: Option<f64>,

    /// Revenue per unit shipped to external demand.
    pub revenue: Option<f64>,

    /// Periods between placing an order and the supplier seeing it.
    pub order_lead_time: u32,

    /// Periods a shipment spends in transit to this node.
    pub shipment_lead_time: u32,

    /// Ordering rule.  Required: every node orders from its predecessors
    /// (or external supply) every period.
    pub policy: Option<InventoryPolicy>,

    /// External demand faced by this node, if any.
    pub demand: Option<DemandSource>,

    /// Supply disruption process template, if any.
    pub disruption: Option<DisruptionProcess>,

    /// Cap on any single order quantity.
    pub order_capacity: Option<f64>,

    /// Opening on-hand inventory (period 0).  Must be non-negative.
    pub initial_inventory: f64,

    /// Quantity seeded into each upstream order pipeline at offsets
    /// `1..=order_lead_time`, modelling orders already in flight at start.
    pub initial_orders: f64,

    /// Quantity seeded into each inbound shipment pipeline at offsets
    /// `1..=shipment_lead_time`, modelling shipments already in transit.
    pub initial_shipments: f64,
}

impl SupplyNode {
    /// Reject negative costs, capacities, and seed values.
    pub(crate) fn validate(&self, id: NodeId) -> NetworkResult<()> {
        let checks = [
            ("holding cost rate", self.local_holding_cost.linear_rate()),
            ("stockout cost", self.stockout_cost),
            ("in-transit holding cost", self.in_transit_holding_cost.unwrap_or(0.0)),
            ("revenue", self.revenue.unwrap_or(0.0)),
            ("order capacity", self.order_capacity.unwrap_or(0.0)),
            ("initial inventory", self.initial_inventory),
            ("initial orders", self.initial_orders),
            ("initial shipments", self.initial_shipments),
        ];
        for (what, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(NetworkError::NegativeValue { node: id, what, value });
            }
        }
        Ok(())
    }

    /// Rate applied to quantities in transit to successors.
    #[inline]
    pub fn effective_in_transit_rate(&self) -> f64 {
        self.in_transit_holding_cost
            .unwrap_or_else(|| self.local_holding_cost.linear_rate())
    }
}
