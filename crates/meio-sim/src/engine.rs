//! The `Simulation` struct and its period loop.

use meio_core::{NodeId, Period, SimConfig, SimRng};
use meio_model::{DisruptionKind, DisruptionProcess, InventoryPolicy};
use meio_network::{Partner, SupplyNetwork};

use crate::observer::{NoopObserver, SimObserver};
use crate::state::NodeState;
use crate::{SimError, SimResult};

/// Absolute slack allowed by the per-period reconciliation check, scaled by
/// the magnitude of the stock involved.
const RECONCILIATION_TOLERANCE: f64 = 1e-6;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Evaluate one policy configuration: run `num_periods` periods against
/// `network` with the given seed and return the network-wide total cost.
///
/// For trajectory inspection, build a [`Simulation`] directly and keep it
/// after [`run`](Simulation::run).
pub fn simulate(network: &SupplyNetwork, num_periods: u32, seed: u64) -> SimResult<f64> {
    let mut sim = Simulation::new(network, SimConfig::new(num_periods, seed))?;
    sim.run(&mut NoopObserver)
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// One simulation run: the mutable counterpart of an immutable
/// [`SupplyNetwork`].
///
/// Owns every piece of run state — the per-node period records, the cloned
/// disruption processes, and the seeded RNG — so a network can be shared by
/// reference across many concurrent runs.
///
/// # Period loop
///
/// ```text
/// for t in 0..num_periods:
///   ⓪ Disruptions — step every node's Up/Down process (ascending index).
///   ① Orders      — demand draws in DFS pre-order, then receive-and-order
///                   in DFS post-order (each node after all successors).
///   ② Shipments   — receive, assemble, allocate, release in a
///                   predecessor-gated DFS order (each node after all
///                   predecessors, so zero-lead shipments land same-period).
///   ③ Roll        — copy closing values into period t+1's opening record.
///   ④ Costs       — accrue holding / stockout / in-transit / revenue and
///                   re-check the reconciliation invariant (fatal on drift).
/// ```
#[derive(Debug)]
pub struct Simulation<'net> {
    network: &'net SupplyNetwork,
    config:  SimConfig,
    rng:     SimRng,

    states:      Vec<NodeState>,
    disruptions: Vec<Option<DisruptionProcess>>,

    current_period: usize,
    total_cost:     f64,
}

impl<'net> Simulation<'net> {
    /// Validate the run configuration and pre-allocate the full horizon of
    /// state records (period 0 seeded from each node's initial conditions).
    pub fn new(network: &'net SupplyNetwork, config: SimConfig) -> SimResult<Self> {
        let rng = SimRng::new(config.seed);
        Self::with_rng(network, config, rng)
    }

    /// Like [`new`](Self::new) but with an externally seeded stream — used
    /// by multi-trial evaluation to give each trial its own generator.
    pub fn with_rng(
        network: &'net SupplyNetwork,
        config:  SimConfig,
        rng:     SimRng,
    ) -> SimResult<Self> {
        // Every node places orders every period, so a missing policy is a
        // configuration error detectable before period 0.
        for n in network.node_ids() {
            if network.node(n).policy.is_none() {
                return Err(SimError::MissingPolicy { node: n });
            }
        }

        let extra = network.extra_periods();
        let horizon = config.num_periods as usize + extra;
        // One global pipeline length covers every deposit offset in use:
        // order_lead, shipment_lead, order_lead + shipment_lead (external
        // orders), and shipment_lead + 1 (transit pause).
        let pipeline_len = extra;

        let mut states: Vec<NodeState> = network
            .node_ids()
            .map(|n| {
                NodeState::new(
                    n,
                    network.pred_slot_count(n),
                    network.succ_slot_count(n),
                    horizon,
                    pipeline_len,
                )
            })
            .collect();
        seed_initial_conditions(network, &mut states);

        let disruptions = network
            .node_ids()
            .map(|n| network.node(n).disruption.clone())
            .collect();

        Ok(Self {
            network,
            config,
            rng,
            states,
            disruptions,
            current_period: 0,
            total_cost: 0.0,
        })
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current period to `config.num_periods`, invoking
    /// observer hooks at every period boundary.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<f64> {
        let end = self.config.num_periods as usize;
        while self.current_period < end {
            let t = self.current_period;
            observer.on_period_start(Period(t as u32));
            self.step(t)?;
            observer.on_period_end(Period(t as u32), &self.states);
            self.current_period += 1;
        }
        observer.on_run_end(self.total_cost);
        Ok(self.total_cost)
    }

    /// All node trajectories, indexed by `NodeId`.
    pub fn states(&self) -> &[NodeState] {
        &self.states
    }

    /// One node's trajectory.
    pub fn node_state(&self, node: NodeId) -> &NodeState {
        &self.states[node.index()]
    }

    /// Network-wide cost accrued so far.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // ── Period processing ─────────────────────────────────────────────────

    fn step(&mut self, t: usize) -> SimResult<()> {
        self.step_disruptions(t);
        self.order_phase(t)?;
        self.shipment_phase(t);
        self.roll_forward(t);
        self.accrue_costs(t)
    }

    /// Phase ⓪ — advance every disruption process one period, in ascending
    /// node order so RNG consumption is independent of topology traversal.
    fn step_disruptions(&mut self, t: usize) {
        for (i, process) in self.disruptions.iter_mut().enumerate() {
            if let Some(process) = process {
                process.step(&mut self.rng);
                self.states[i].periods[t].disrupted = process.is_disrupted();
            }
        }
    }

    /// Whether node `n` is Down this period with a process of kind `kind`.
    fn down_with_kind(&self, n: NodeId, kind: DisruptionKind) -> bool {
        self.disruptions[n.index()]
            .as_ref()
            .is_some_and(|d| d.kind() == kind && d.is_disrupted())
    }

    // ── Phase ① : orders ──────────────────────────────────────────────────

    fn order_phase(&mut self, t: usize) -> SimResult<()> {
        let network = self.network;

        // Demand realizations, in DFS pre-order.  External demand lands in
        // the node's own order pipeline at offset 0 (no order lead time) and
        // is received in the post-order pass below.
        for &n in &network.plan().order_enter {
            if let Some(source) = &network.node(n).demand {
                if let Some(value) = source.generate(Period(t as u32), &mut self.rng) {
                    // A demand source implies an external-demand slot.
                    let slot = network.succs(n).len();
                    self.states[n.index()].periods[t].inbound_order_pipeline[slot][0] += value;
                }
            }
        }

        // Receive-and-order, in DFS post-order: every successor has already
        // deposited its orders by the time a node computes its own.
        for &n in &network.plan().order_exit {
            self.receive_inbound_orders(n, t);
            self.place_orders(n, t)?;
        }
        Ok(())
    }

    /// Move each successor slot's pipeline offset 0 into `inbound_order`
    /// and fold it into cumulative demand.
    fn receive_inbound_orders(&mut self, n: NodeId, t: usize) {
        let succ_slots = self.network.succ_slot_count(n);
        let rec = &mut self.states[n.index()].periods[t];
        let mut received = 0.0;
        for slot in 0..succ_slots {
            let quantity = rec.inbound_order_pipeline[slot][0];
            rec.inbound_order_pipeline[slot][0] = 0.0;
            rec.inbound_order[slot] = quantity;
            received += quantity;
        }
        rec.demand_cumul += received;
    }

    /// Compute and deposit this node's order to every predecessor.
    fn place_orders(&mut self, n: NodeId, t: usize) -> SimResult<()> {
        let node = self.network.node(n);
        let policy: InventoryPolicy = node
            .policy
            .ok_or(SimError::MissingPolicy { node: n })?;
        let order_paused = self.down_with_kind(n, DisruptionKind::OrderPausing);
        let adjusted = policy
            .needs_adjusted_position()
            .then(|| self.min_downstream_adjusted_position(n, t))
            .flatten();

        let order_lead = node.order_lead_time as usize;
        let external_offset = order_lead + node.shipment_lead_time as usize;
        let pred_slots = self.network.pred_slot_count(n);

        for slot in 0..pred_slots {
            let finished_units = if order_paused {
                // Suppressed entirely; recovery re-observes the depleted
                // position rather than re-issuing this order.
                0.0
            } else {
                let position = if policy.uses_echelon_position() {
                    self.echelon_position(n, t, slot)
                } else {
                    self.local_position(n, t, slot)
                };
                policy.order_quantity(position, adjusted, node.order_capacity)
            };
            // Pipelines and on-order books run in the predecessor's units:
            // one finished unit pulls `usage` units of each raw material.
            let quantity = finished_units * self.network.usage_for_slot(n, slot);

            match self.network.pred_partner(n, slot) {
                Partner::Node(pred) => {
                    let slot_in_pred = self
                        .network
                        .succ_slot(pred, n)
                        .expect("adjacency and slot maps are built together");
                    self.states[pred.index()].periods[t].inbound_order_pipeline
                        [slot_in_pred][order_lead] += quantity;
                }
                Partner::External => {
                    // External supply ships unconditionally: the order turns
                    // into a shipment arriving after both lead times.
                    self.states[n.index()].periods[t].inbound_shipment_pipeline
                        [slot][external_offset] += quantity;
                }
            }

            let rec = &mut self.states[n.index()].periods[t];
            rec.order_quantity[slot] = quantity;
            rec.on_order_by_predecessor[slot] += quantity;
        }
        Ok(())
    }

    // ── Position observations ─────────────────────────────────────────────

    /// Local inventory position seen from predecessor slot `slot`, net of
    /// the orders received this period: IL + (on-order + raw material +
    /// parked items)/usage − inbound orders.
    fn local_position(&self, n: NodeId, t: usize, slot: usize) -> f64 {
        let rec = &self.states[n.index()].periods[t];
        let usage = self.network.usage_for_slot(n, slot);
        let inbound = (rec.on_order_by_predecessor[slot]
            + rec.raw_material_inventory[slot]
            + rec.inbound_disrupted_items[slot])
            / usage;
        rec.inventory_level + inbound - rec.inbound_orders()
    }

    /// A node's net local position across *all* predecessor slots — the
    /// summand of the echelon position.
    fn net_local_position(&self, n: NodeId, t: usize) -> f64 {
        let rec = &self.states[n.index()].periods[t];
        let mut position = rec.inventory_level;
        for slot in 0..self.network.pred_slot_count(n) {
            position += (rec.on_order_by_predecessor[slot]
                + rec.raw_material_inventory[slot]
                + rec.inbound_disrupted_items[slot])
                / self.network.usage_for_slot(n, slot);
        }
        position - rec.inbound_orders()
    }

    /// Echelon inventory position seen from predecessor slot `slot`: this
    /// node's local position plus the net local positions of every strict
    /// descendant.
    ///
    /// Summing *positions* (rather than physical stock alone) counts demand
    /// information already in flight inside the echelon, which is what makes
    /// local and echelon base-stock policies trajectory-identical on serial
    /// systems.
    fn echelon_position(&self, n: NodeId, t: usize, slot: usize) -> f64 {
        let downstream: f64 = self
            .network
            .descendants(n)
            .iter()
            .map(|&d| self.net_local_position(d, t))
            .sum();
        self.local_position(n, t, slot) + downstream
    }

    /// Echelon position of `n` excluding inbound shipments parked beyond its
    /// own shipment lead time — units ordered too recently to arrive within
    /// one cycle.
    fn echelon_position_adjusted(&self, n: NodeId, t: usize) -> f64 {
        let rec = &self.states[n.index()].periods[t];
        let cutoff = self.network.node(n).shipment_lead_time as usize;
        let late: f64 = rec
            .inbound_shipment_pipeline
            .iter()
            .map(|pipe| pipe.iter().skip(cutoff + 1).sum::<f64>())
            .sum();
        let downstream: f64 = self
            .network
            .descendants(n)
            .iter()
            .map(|&d| self.net_local_position(d, t))
            .sum();
        self.net_local_position(n, t) + downstream - late
    }

    /// The balancing signal for a balanced-echelon policy: the tightest
    /// adjusted position among immediate internal successors.
    fn min_downstream_adjusted_position(&self, n: NodeId, t: usize) -> Option<f64> {
        self.network
            .succs(n)
            .iter()
            .map(|&s| self.echelon_position_adjusted(s, t))
            .reduce(f64::min)
    }

    // ── Phase ② : shipments ───────────────────────────────────────────────

    fn shipment_phase(&mut self, t: usize) {
        let network = self.network;
        for &n in &network.plan().shipment_visit {
            self.receive_inbound_shipments(n, t);
            self.assemble_and_allocate(n, t);
            self.release_shipments(n, t);
        }
    }

    /// (a) — receive each predecessor slot's pipeline offset 0.  While
    /// receipt-paused, arrivals park in `inbound_disrupted_items` (off the
    /// on-order books, preserved across roll-forward); the parked bucket
    /// drains the first non-paused period.
    fn receive_inbound_shipments(&mut self, n: NodeId, t: usize) {
        let receipt_paused = self.down_with_kind(n, DisruptionKind::ReceiptPausing);
        let pred_slots = self.network.pred_slot_count(n);
        let rec = &mut self.states[n.index()].periods[t];

        for slot in 0..pred_slots {
            let arriving = rec.inbound_shipment_pipeline[slot][0];
            rec.inbound_shipment_pipeline[slot][0] = 0.0;
            if receipt_paused {
                rec.inbound_disrupted_items[slot] += arriving;
                rec.on_order_by_predecessor[slot] -= arriving;
                rec.inbound_shipment[slot] = 0.0;
            } else {
                let parked = rec.inbound_disrupted_items[slot];
                rec.inbound_disrupted_items[slot] = 0.0;
                rec.inbound_shipment[slot] = arriving + parked;
                rec.raw_material_inventory[slot] += arriving + parked;
                rec.on_order_by_predecessor[slot] -= arriving;
            }
        }
    }

    /// (b)–(d) — convert raw material to finished goods under BOM scarcity,
    /// then allocate on-hand stock to successors in ascending slot order
    /// (external demand last), clearing backorders before new demand.
    fn assemble_and_allocate(&mut self, n: NodeId, t: usize) {
        let pred_slots = self.network.pred_slot_count(n);
        let succ_slots = self.network.succ_slot_count(n);
        let usages: Vec<f64> = (0..pred_slots)
            .map(|slot| self.network.usage_for_slot(n, slot))
            .collect();
        let shipment_paused = self.down_with_kind(n, DisruptionKind::ShipmentPausing);
        let rec = &mut self.states[n.index()].periods[t];

        // New units are bounded by the scarcest usage-adjusted component.
        if pred_slots > 0 {
            let mut feasible = f64::INFINITY;
            for slot in 0..pred_slots {
                feasible = feasible.min(rec.raw_material_inventory[slot] / usages[slot]);
            }
            let feasible = feasible.max(0.0);
            if feasible > 0.0 {
                for slot in 0..pred_slots {
                    rec.raw_material_inventory[slot] -= feasible * usages[slot];
                }
                rec.on_hand += feasible;
                rec.inventory_level += feasible;
            }
            rec.finished_production = feasible;
        }

        // Allocation.  A shipment-pausing disruption suppresses the whole
        // step: stock stays put while obligations accumulate as backorders.
        let mut available = if shipment_paused { 0.0 } else { rec.on_hand };
        let mut met_from_stock = 0.0;
        for slot in 0..succ_slots {
            let backorder = rec.backorders_by_successor[slot];
            let owed = backorder + rec.inbound_order[slot];
            let shipped = owed.min(available);
            available -= shipped;
            rec.outbound_shipment[slot] = shipped;
            rec.backorders_by_successor[slot] = owed - shipped;
            met_from_stock += (shipped - backorder).max(0.0);
        }
        if !shipment_paused {
            rec.on_hand = available;
        }
        rec.inventory_level = rec.on_hand - rec.backorders_by_successor.iter().sum::<f64>();

        rec.demand_met_from_stock = met_from_stock;
        rec.demand_met_from_stock_cumul += met_from_stock;
        rec.fill_rate = if rec.demand_cumul > 0.0 {
            rec.demand_met_from_stock_cumul / rec.demand_cumul
        } else {
            // No demand observed yet: perfect service by convention.
            1.0
        };
    }

    /// (e) — push each internal shipment into the successor's inbound
    /// pipeline at its shipment lead time, one period later while the
    /// successor is transit-paused.
    fn release_shipments(&mut self, n: NodeId, t: usize) {
        let network = self.network;
        for (slot, &s) in network.succs(n).iter().enumerate() {
            let shipped = self.states[n.index()].periods[t].outbound_shipment[slot];
            if shipped <= 0.0 {
                continue;
            }
            let mut offset = network.node(s).shipment_lead_time as usize;
            if self.down_with_kind(s, DisruptionKind::TransitPausing) {
                offset += 1;
            }
            let slot_in_succ = network
                .pred_slot(s, n)
                .expect("adjacency and slot maps are built together");
            self.states[s.index()].periods[t].inbound_shipment_pipeline[slot_in_succ]
                [offset] += shipped;
        }
    }

    // ── Phase ③ : roll-forward ────────────────────────────────────────────

    fn roll_forward(&mut self, t: usize) {
        for state in &mut self.states {
            let (current, next) = state.periods.split_at_mut(t + 1);
            current[t].roll_into(&mut next[0]);
        }
    }

    // ── Phase ④ : cost accrual & reconciliation ───────────────────────────

    fn accrue_costs(&mut self, t: usize) -> SimResult<()> {
        for n in self.network.node_ids() {
            // Quantity in transit to successors: their inbound pipelines,
            // this node's slot.  Read before borrowing n's record mutably.
            let mut in_transit = 0.0;
            for &s in self.network.succs(n) {
                let slot = self
                    .network
                    .pred_slot(s, n)
                    .expect("adjacency and slot maps are built together");
                in_transit += self.states[s.index()].periods[t].inbound_shipment_pipeline
                    [slot]
                    .iter()
                    .sum::<f64>();
            }
            // Raw material held here is priced at the supplying node's rate;
            // externally sourced material carries no holding charge.
            let mut raw_material_holding = 0.0;
            for (slot, &p) in self.network.preds(n).iter().enumerate() {
                raw_material_holding += self.network.node(p).local_holding_cost.linear_rate()
                    * self.states[n.index()].periods[t].raw_material_inventory[slot];
            }

            let node = self.network.node(n);
            let external_slot = self.network.external_demand_slot(n);
            let rec = &mut self.states[n.index()].periods[t];

            let level = rec.inventory_level;
            let holding = node.local_holding_cost.evaluate(level) + raw_material_holding;
            let stockout = node.stockout_cost * (-level).max(0.0);
            let transit = node.effective_in_transit_rate() * in_transit;
            let revenue = match external_slot {
                Some(slot) => node.revenue.unwrap_or(0.0) * rec.outbound_shipment[slot],
                None => 0.0,
            };

            rec.holding_cost_incurred = holding;
            rec.stockout_cost_incurred = stockout;
            rec.in_transit_holding_cost_incurred = transit;
            rec.revenue_earned = revenue;
            rec.total_cost_incurred = holding + stockout + transit - revenue;
            self.total_cost += rec.total_cost_incurred;

            let drift = (rec.reconciled_inventory_level() - rec.inventory_level).abs();
            if drift > RECONCILIATION_TOLERANCE * (1.0 + rec.on_hand.abs()) {
                return Err(SimError::ConsistencyViolation { node: n, period: t, drift });
            }
        }
        Ok(())
    }
}

// ── Initial conditions ────────────────────────────────────────────────────────

/// Seed period 0: opening inventory, plus orders and shipments already in
/// flight at simulation start, with on-order books kept consistent.
fn seed_initial_conditions(network: &SupplyNetwork, states: &mut [NodeState]) {
    for n in network.node_ids() {
        let node = network.node(n);
        let opening = &mut states[n.index()].periods[0];
        opening.on_hand = node.initial_inventory;
        opening.inventory_level = node.initial_inventory;

        // Shipments in transit to this node, one per pipeline slot per
        // period of the shipment lead time (arriving periods 1..=Ls).
        if node.initial_shipments > 0.0 {
            let lead = node.shipment_lead_time as usize;
            for slot in 0..network.pred_slot_count(n) {
                for offset in 1..=lead {
                    opening.inbound_shipment_pipeline[slot][offset] = node.initial_shipments;
                }
                opening.on_order_by_predecessor[slot] +=
                    lead as f64 * node.initial_shipments;
            }
        }
    }

    // Orders this node already placed upstream, sitting in each internal
    // predecessor's order pipeline (arriving periods 1..=Lo).
    for n in network.node_ids() {
        let node = network.node(n);
        if node.initial_orders <= 0.0 {
            continue;
        }
        let lead = node.order_lead_time as usize;
        for (pred_slot, &p) in network.preds(n).iter().enumerate() {
            let slot_in_pred = network
                .succ_slot(p, n)
                .expect("adjacency and slot maps are built together");
            for offset in 1..=lead {
                states[p.index()].periods[0].inbound_order_pipeline[slot_in_pred][offset] =
                    node.initial_orders;
            }
            states[n.index()].periods[0].on_order_by_predecessor[pred_slot] +=
                lead as f64 * node.initial_orders;
        }
    }
}
