//! Per-node, per-period state records.
//!
//! # Layout
//!
//! One [`PeriodState`] per node per period, pre-allocated at simulation start
//! for the whole horizon `[0, num_periods + extra_periods)`.  All per-partner
//! quantities are slot-indexed `Vec`s sized from the static topology (see
//! `meio_network`'s slot API), and every pipeline is a fixed-length array
//! indexed by periods-until-arrival — no per-period map allocation anywhere.
//!
//! Roll-forward *copies* period t's closing values into period t+1's record
//! rather than mutating in place, so the full trajectory of any period
//! remains inspectable after the run.
//!
//! # Reconciliation invariant
//!
//! `inventory_level == on_hand − Σ backorders_by_successor`, re-checked by
//! the engine every period.  In undisrupted operation allocation clears
//! backorders before stock is held back, so `on_hand == max(0, IL)` follows;
//! a shipment-pausing disruption legitimately holds stock alongside
//! backorders, which is why the reconciliation form is the enforced one.

use meio_core::NodeId;

// ── PeriodState ───────────────────────────────────────────────────────────────

/// Complete state of one node in one period.
///
/// "pred slot" and "succ slot" index the node's partner slots (internal
/// partners ascending, trailing virtual external endpoint); "offset" indexes
/// periods-until-arrival, with offset 0 arriving this period.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodState {
    // ── Pipelines ─────────────────────────────────────────────────────────
    /// Orders en route *to this node* from each successor (and external
    /// demand), by periods-until-arrival.
    pub inbound_order_pipeline: Vec<Vec<f64>>,
    /// Shipments en route to this node from each predecessor (and external
    /// supply), by periods-until-arrival.
    pub inbound_shipment_pipeline: Vec<Vec<f64>>,

    // ── This period's flows ───────────────────────────────────────────────
    /// Orders received this period, per successor slot.
    pub inbound_order: Vec<f64>,
    /// Orders placed this period, per predecessor slot.
    pub order_quantity: Vec<f64>,
    /// Shipments received this period, per predecessor slot.
    pub inbound_shipment: Vec<f64>,
    /// Shipments released this period, per successor slot.
    pub outbound_shipment: Vec<f64>,
    /// Finished goods assembled from raw material this period.
    pub finished_production: f64,

    // ── Carried stocks ────────────────────────────────────────────────────
    /// Outstanding orders not yet received, per predecessor slot.
    pub on_order_by_predecessor: Vec<f64>,
    /// On-hand raw material, per predecessor slot (predecessor units).
    pub raw_material_inventory: Vec<f64>,
    /// Shipments that arrived while receiving was paused, parked at the
    /// door per predecessor slot.
    pub inbound_disrupted_items: Vec<f64>,
    /// Physical finished-goods stock (never negative).
    pub on_hand: f64,
    /// Unmet demand owed to each successor slot.
    pub backorders_by_successor: Vec<f64>,
    /// Signed net position: `on_hand − Σ backorders`.
    pub inventory_level: f64,
    /// Whether this node's disruption process was Down this period.
    pub disrupted: bool,

    // ── Cumulative service measures ───────────────────────────────────────
    pub demand_cumul: f64,
    pub demand_met_from_stock: f64,
    pub demand_met_from_stock_cumul: f64,
    /// `demand_met_from_stock_cumul / demand_cumul`; 1.0 while no demand
    /// has been observed.
    pub fill_rate: f64,

    // ── This period's costs ───────────────────────────────────────────────
    pub holding_cost_incurred: f64,
    pub stockout_cost_incurred: f64,
    pub in_transit_holding_cost_incurred: f64,
    pub revenue_earned: f64,
    pub total_cost_incurred: f64,
}

impl PeriodState {
    pub(crate) fn new(pred_slots: usize, succ_slots: usize, pipeline_len: usize) -> Self {
        Self {
            inbound_order_pipeline:    vec![vec![0.0; pipeline_len]; succ_slots],
            inbound_shipment_pipeline: vec![vec![0.0; pipeline_len]; pred_slots],
            inbound_order:             vec![0.0; succ_slots],
            order_quantity:            vec![0.0; pred_slots],
            inbound_shipment:          vec![0.0; pred_slots],
            outbound_shipment:         vec![0.0; succ_slots],
            finished_production:       0.0,
            on_order_by_predecessor:   vec![0.0; pred_slots],
            raw_material_inventory:    vec![0.0; pred_slots],
            inbound_disrupted_items:   vec![0.0; pred_slots],
            on_hand:                   0.0,
            backorders_by_successor:   vec![0.0; succ_slots],
            inventory_level:           0.0,
            disrupted:                 false,
            demand_cumul:              0.0,
            demand_met_from_stock:     0.0,
            demand_met_from_stock_cumul: 0.0,
            fill_rate:                 1.0,
            holding_cost_incurred:     0.0,
            stockout_cost_incurred:    0.0,
            in_transit_holding_cost_incurred: 0.0,
            revenue_earned:            0.0,
            total_cost_incurred:       0.0,
        }
    }

    // ── Aggregate accessors ───────────────────────────────────────────────

    /// Total outstanding on-order quantity across all predecessors.
    pub fn on_order(&self) -> f64 {
        self.on_order_by_predecessor.iter().sum()
    }

    /// Total backorders across all successors.
    pub fn backorders(&self) -> f64 {
        self.backorders_by_successor.iter().sum()
    }

    /// Orders received this period, all successors.
    pub fn inbound_orders(&self) -> f64 {
        self.inbound_order.iter().sum()
    }

    /// Quantity currently in transit to this node, all predecessors.
    pub fn inbound_in_transit(&self) -> f64 {
        self.inbound_shipment_pipeline
            .iter()
            .map(|pipe| pipe.iter().sum::<f64>())
            .sum()
    }

    /// Total on-hand raw material across predecessor slots.
    pub fn raw_material(&self) -> f64 {
        self.raw_material_inventory.iter().sum()
    }

    /// Total parked receipt-disrupted quantity.
    pub fn disrupted_items(&self) -> f64 {
        self.inbound_disrupted_items.iter().sum()
    }

    /// `on_hand − Σ backorders` recomputed from the primitives; the engine
    /// compares this against the stored `inventory_level` every period.
    pub fn reconciled_inventory_level(&self) -> f64 {
        self.on_hand - self.backorders()
    }

    // ── Roll-forward ──────────────────────────────────────────────────────

    /// Seed `next` (period t+1's record) from this period's closing values:
    /// pipelines advance one slot, carried stocks and cumulative counters
    /// copy across, per-period flows and costs stay at their zero defaults.
    pub(crate) fn roll_into(&self, next: &mut PeriodState) {
        for (src, dst) in self
            .inbound_order_pipeline
            .iter()
            .zip(next.inbound_order_pipeline.iter_mut())
        {
            advance_pipeline(src, dst);
        }
        for (src, dst) in self
            .inbound_shipment_pipeline
            .iter()
            .zip(next.inbound_shipment_pipeline.iter_mut())
        {
            advance_pipeline(src, dst);
        }

        next.on_order_by_predecessor.copy_from_slice(&self.on_order_by_predecessor);
        next.raw_material_inventory.copy_from_slice(&self.raw_material_inventory);
        next.inbound_disrupted_items.copy_from_slice(&self.inbound_disrupted_items);
        next.backorders_by_successor.copy_from_slice(&self.backorders_by_successor);
        next.on_hand = self.on_hand;
        next.inventory_level = self.inventory_level;

        next.demand_cumul = self.demand_cumul;
        next.demand_met_from_stock_cumul = self.demand_met_from_stock_cumul;
        next.fill_rate = self.fill_rate;
    }
}

/// Drop offset 0, shift everything one slot closer, append a zero tail.
#[inline]
fn advance_pipeline(src: &[f64], dst: &mut [f64]) {
    let len = src.len();
    dst[..len - 1].copy_from_slice(&src[1..]);
    dst[len - 1] = 0.0;
}

// ── NodeState ─────────────────────────────────────────────────────────────────

/// The full trajectory of one node: one record per period, pre-allocated for
/// the whole horizon.
#[derive(Clone, Debug)]
pub struct NodeState {
    pub node:    NodeId,
    pub periods: Vec<PeriodState>,
}

impl NodeState {
    pub(crate) fn new(
        node:         NodeId,
        pred_slots:   usize,
        succ_slots:   usize,
        horizon:      usize,
        pipeline_len: usize,
    ) -> Self {
        let periods = (0..horizon)
            .map(|_| PeriodState::new(pred_slots, succ_slots, pipeline_len))
            .collect();
        Self { node, periods }
    }

    /// The record for period `t`.
    #[inline]
    pub fn period(&self, t: usize) -> &PeriodState {
        &self.periods[t]
    }

    /// Ending inventory levels over `0..n` periods — convenient for
    /// trajectory assertions.
    pub fn inventory_levels(&self, n: usize) -> Vec<f64> {
        self.periods[..n].iter().map(|p| p.inventory_level).collect()
    }
}
