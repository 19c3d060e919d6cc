//! Supply network representation and builder.
//!
//! # Data layout
//!
//! Everything the engine touches per period is **built once** from static
//! topology at `build()` time: sorted predecessor/successor adjacency,
//! partner→slot index maps, strict-descendant sets, and the two traversal
//! plans.  Per-period engine code then works exclusively with small integer
//! slot indices into pre-sized `Vec`s — no hash-map churn inside the
//! simulation loop.
//!
//! # Partner slots
//!
//! A node's pipelines and per-partner quantities are indexed by *slot*:
//! internal partners occupy slots `0..k` in ascending `NodeId` order, and a
//! virtual external endpoint (supply on the predecessor side of source
//! nodes, demand on the successor side of nodes with a demand source)
//! occupies one trailing slot.  [`Partner`] names what a slot refers to.

use rustc_hash::FxHashMap;

use meio_core::NodeId;

use crate::{NetworkError, NetworkResult, SupplyNode, TraversalPlan};

// ── Partner ───────────────────────────────────────────────────────────────────

/// What a predecessor- or successor-slot refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Partner {
    /// Another node in the network.
    Node(NodeId),
    /// The virtual external endpoint (supply or demand).
    External,
}

// ── SupplyNetwork ─────────────────────────────────────────────────────────────

/// A validated, immutable supply-chain DAG.
///
/// Construct via [`NetworkBuilder`]; `build()` guarantees acyclicity, so a
/// directed cycle is unrepresentable by the time a simulation starts.  The
/// network is shared immutably (`&SupplyNetwork`) across parallel trials —
/// all mutable run state lives in the simulation.
#[derive(Debug)]
pub struct SupplyNetwork {
    nodes: Vec<SupplyNode>,

    // ── Build-once adjacency (ascending NodeId order) ─────────────────────
    preds: Vec<Vec<NodeId>>,
    succs: Vec<Vec<NodeId>>,
    /// BOM usage rate per predecessor, parallel to `preds`.
    usage: Vec<Vec<f64>>,

    // ── Build-once derived indexes ────────────────────────────────────────
    pred_slot_of: Vec<FxHashMap<NodeId, usize>>,
    succ_slot_of: Vec<FxHashMap<NodeId, usize>>,
    /// Strict descendants (everything reachable downstream), ascending.
    descendants: Vec<Vec<NodeId>>,
    plan: TraversalPlan,

    max_order_lead: u32,
    max_shipment_lead: u32,
}

impl SupplyNetwork {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &SupplyNode {
        &self.nodes[id.index()]
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    /// Internal predecessors, ascending.  Pass through
    /// [`pred_partners`](Self::pred_partners) to include external supply.
    #[inline]
    pub fn preds(&self, id: NodeId) -> &[NodeId] {
        &self.preds[id.index()]
    }

    /// Internal successors, ascending.
    #[inline]
    pub fn succs(&self, id: NodeId) -> &[NodeId] {
        &self.succs[id.index()]
    }

    /// BOM usage rates, parallel to [`preds`](Self::preds).
    #[inline]
    pub fn usage_rates(&self, id: NodeId) -> &[f64] {
        &self.usage[id.index()]
    }

    /// Source nodes (no internal predecessors), ascending.
    pub fn source_nodes(&self) -> Vec<NodeId> {
        self.node_ids().filter(|n| self.preds(*n).is_empty()).collect()
    }

    /// Sink nodes (no internal successors), ascending.
    pub fn sink_nodes(&self) -> Vec<NodeId> {
        self.node_ids().filter(|n| self.succs(*n).is_empty()).collect()
    }

    /// Strict descendants of `id` — every node reachable downstream.
    #[inline]
    pub fn descendants(&self, id: NodeId) -> &[NodeId] {
        &self.descendants[id.index()]
    }

    // ── External endpoints ────────────────────────────────────────────────

    /// Source nodes draw raw material from the virtual external supplier.
    #[inline]
    pub fn has_external_supply(&self, id: NodeId) -> bool {
        self.preds(id).is_empty()
    }

    /// Nodes with a demand source face the virtual external customer.
    #[inline]
    pub fn has_external_demand(&self, id: NodeId) -> bool {
        self.node(id).demand.is_some()
    }

    // ── Slot API ──────────────────────────────────────────────────────────

    /// Number of predecessor slots (internal + trailing external, if any).
    #[inline]
    pub fn pred_slot_count(&self, id: NodeId) -> usize {
        self.preds(id).len() + self.has_external_supply(id) as usize
    }

    /// Number of successor slots (internal + trailing external, if any).
    #[inline]
    pub fn succ_slot_count(&self, id: NodeId) -> usize {
        self.succs(id).len() + self.has_external_demand(id) as usize
    }

    /// What predecessor slot `slot` of node `id` refers to.
    #[inline]
    pub fn pred_partner(&self, id: NodeId, slot: usize) -> Partner {
        match self.preds(id).get(slot) {
            Some(&p) => Partner::Node(p),
            None => Partner::External,
        }
    }

    /// What successor slot `slot` of node `id` refers to.
    #[inline]
    pub fn succ_partner(&self, id: NodeId, slot: usize) -> Partner {
        match self.succs(id).get(slot) {
            Some(&s) => Partner::Node(s),
            None => Partner::External,
        }
    }

    /// All predecessor partners of `id`, external supply last — the
    /// `predecessors(node, include_external)` contract.
    pub fn pred_partners(&self, id: NodeId) -> impl Iterator<Item = Partner> + '_ {
        (0..self.pred_slot_count(id)).map(move |slot| self.pred_partner(id, slot))
    }

    /// All successor partners of `id`, external demand last.
    pub fn succ_partners(&self, id: NodeId) -> impl Iterator<Item = Partner> + '_ {
        (0..self.succ_slot_count(id)).map(move |slot| self.succ_partner(id, slot))
    }

    /// Slot of internal predecessor `pred` within node `id`.
    #[inline]
    pub fn pred_slot(&self, id: NodeId, pred: NodeId) -> Option<usize> {
        self.pred_slot_of[id.index()].get(&pred).copied()
    }

    /// Slot of internal successor `succ` within node `id`.
    #[inline]
    pub fn succ_slot(&self, id: NodeId, succ: NodeId) -> Option<usize> {
        self.succ_slot_of[id.index()].get(&succ).copied()
    }

    /// The external-supply slot of a source node.
    #[inline]
    pub fn external_supply_slot(&self, id: NodeId) -> Option<usize> {
        self.has_external_supply(id).then(|| self.preds(id).len())
    }

    /// The external-demand slot of a node facing external customers.
    #[inline]
    pub fn external_demand_slot(&self, id: NodeId) -> Option<usize> {
        self.has_external_demand(id).then(|| self.succs(id).len())
    }

    /// BOM usage rate for predecessor slot `slot` (1.0 for external supply).
    #[inline]
    pub fn usage_for_slot(&self, id: NodeId, slot: usize) -> f64 {
        self.usage[id.index()].get(slot).copied().unwrap_or(1.0)
    }

    // ── Traversal & horizon ───────────────────────────────────────────────

    /// The fixed per-period visit sequences.
    #[inline]
    pub fn plan(&self) -> &TraversalPlan {
        &self.plan
    }

    pub fn max_order_lead_time(&self) -> u32 {
        self.max_order_lead
    }

    pub fn max_shipment_lead_time(&self) -> u32 {
        self.max_shipment_lead
    }

    /// Slack periods the engine allocates beyond the requested horizon so
    /// pipeline look-ahead (including the external order offset
    /// `order_lead + shipment_lead` and the transit-pause +1) stays in range.
    pub fn extra_periods(&self) -> usize {
        self.max_order_lead as usize + self.max_shipment_lead as usize + 2
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

struct RawEdge {
    from:       NodeId,
    to:         NodeId,
    usage_rate: f64,
}

/// Construct a [`SupplyNetwork`] incrementally, then call
/// [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// validates node data and edges, rejects cycles (Kahn's algorithm), sorts
/// adjacency, and precomputes the slot maps, descendant sets, and traversal
/// plans.
///
/// # Example
///
/// ```
/// use meio_model::{DemandSource, InventoryPolicy};
/// use meio_network::{NetworkBuilder, SupplyNode};
///
/// let mut b = NetworkBuilder::new();
/// let upstream = b.add_node(SupplyNode {
///     policy: Some(InventoryPolicy::local_base_stock(10.0)),
///     ..Default::default()
/// });
/// let retail = b.add_node(SupplyNode {
///     policy: Some(InventoryPolicy::local_base_stock(6.0)),
///     demand: Some(DemandSource::constant(4.0).unwrap()),
///     ..Default::default()
/// });
/// b.add_edge(upstream, retail);
/// let net = b.build().unwrap();
/// assert_eq!(net.source_nodes(), vec![upstream]);
/// assert_eq!(net.sink_nodes(), vec![retail]);
/// ```
pub struct NetworkBuilder {
    nodes:     Vec<SupplyNode>,
    raw_edges: Vec<RawEdge>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, node: SupplyNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add a directed supply edge `from → to` with unit BOM usage.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.add_edge_with_usage(from, to, 1.0);
    }

    /// Add a directed supply edge where one unit produced at `to` consumes
    /// `usage_rate` units of `from`'s product.
    pub fn add_edge_with_usage(&mut self, from: NodeId, to: NodeId, usage_rate: f64) {
        self.raw_edges.push(RawEdge { from, to, usage_rate });
    }

    /// Convenience: chain `nodes` into a serial system, most upstream first.
    /// Returns the builder plus the assigned IDs in the same order.
    pub fn serial(nodes: Vec<SupplyNode>) -> (Self, Vec<NodeId>) {
        let mut b = Self::with_capacity(nodes.len(), nodes.len().saturating_sub(1));
        let ids: Vec<NodeId> = nodes.into_iter().map(|n| b.add_node(n)).collect();
        for pair in ids.windows(2) {
            b.add_edge(pair[0], pair[1]);
        }
        (b, ids)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Consume the builder and produce a validated [`SupplyNetwork`].
    pub fn build(self) -> NetworkResult<SupplyNetwork> {
        let node_count = self.nodes.len();
        if node_count == 0 {
            return Err(NetworkError::Empty);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            node.validate(NodeId(i as u32))?;
        }

        // ── Adjacency (ascending by construction after sort) ──────────────
        let mut edges = self.raw_edges;
        edges.sort_by_key(|e| (e.from, e.to));
        let mut preds: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
        let mut succs: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
        let mut usage_by_pair: FxHashMap<(NodeId, NodeId), f64> = FxHashMap::default();
        for e in &edges {
            for endpoint in [e.from, e.to] {
                if endpoint.index() >= node_count {
                    return Err(NetworkError::UnknownNode(endpoint));
                }
            }
            if e.from == e.to {
                return Err(NetworkError::SelfLoop(e.from));
            }
            if !e.usage_rate.is_finite() || e.usage_rate <= 0.0 {
                return Err(NetworkError::InvalidUsageRate {
                    from:  e.from,
                    to:    e.to,
                    value: e.usage_rate,
                });
            }
            if usage_by_pair.insert((e.from, e.to), e.usage_rate).is_some() {
                return Err(NetworkError::DuplicateEdge { from: e.from, to: e.to });
            }
            succs[e.from.index()].push(e.to);
            preds[e.to.index()].push(e.from);
        }
        for list in preds.iter_mut().chain(succs.iter_mut()) {
            list.sort_unstable();
        }

        // ── Acyclicity (Kahn) + topological order ─────────────────────────
        let topo = kahn_topological_order(&preds, &succs)?;

        // ── Usage aligned to sorted predecessor order ─────────────────────
        let usage: Vec<Vec<f64>> = preds
            .iter()
            .enumerate()
            .map(|(i, ps)| {
                ps.iter()
                    .map(|&p| usage_by_pair[&(p, NodeId(i as u32))])
                    .collect()
            })
            .collect();

        // ── Slot maps ─────────────────────────────────────────────────────
        let pred_slot_of: Vec<FxHashMap<NodeId, usize>> = preds
            .iter()
            .map(|ps| ps.iter().enumerate().map(|(slot, &p)| (p, slot)).collect())
            .collect();
        let succ_slot_of: Vec<FxHashMap<NodeId, usize>> = succs
            .iter()
            .map(|ss| ss.iter().enumerate().map(|(slot, &s)| (s, slot)).collect())
            .collect();

        // ── Strict descendants, accumulated in reverse topological order ──
        let mut descendants: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];
        let mut mask = vec![false; node_count];
        for &n in topo.iter().rev() {
            for &s in &succs[n.index()] {
                mask[s.index()] = true;
                for &d in &descendants[s.index()] {
                    mask[d.index()] = true;
                }
            }
            let mut set: Vec<NodeId> = mask
                .iter()
                .enumerate()
                .filter_map(|(i, &m)| m.then_some(NodeId(i as u32)))
                .collect();
            set.sort_unstable();
            for &d in &set {
                mask[d.index()] = false;
            }
            descendants[n.index()] = set;
        }

        // ── Traversal plans ───────────────────────────────────────────────
        let sources: Vec<NodeId> = (0..node_count as u32)
            .map(NodeId)
            .filter(|n| preds[n.index()].is_empty())
            .collect();
        let plan = TraversalPlan::build(&preds, &succs, &sources);

        let max_order_lead = self.nodes.iter().map(|n| n.order_lead_time).max().unwrap_or(0);
        let max_shipment_lead = self.nodes.iter().map(|n| n.shipment_lead_time).max().unwrap_or(0);

        Ok(SupplyNetwork {
            nodes: self.nodes,
            preds,
            succs,
            usage,
            pred_slot_of,
            succ_slot_of,
            descendants,
            plan,
            max_order_lead,
            max_shipment_lead,
        })
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Kahn's algorithm: returns a topological order or the nodes stuck on a
/// directed cycle.
fn kahn_topological_order(
    preds: &[Vec<NodeId>],
    succs: &[Vec<NodeId>],
) -> NetworkResult<Vec<NodeId>> {
    let node_count = preds.len();
    let mut in_degree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut ready: std::collections::BTreeSet<NodeId> = (0..node_count as u32)
        .map(NodeId)
        .filter(|n| in_degree[n.index()] == 0)
        .collect();
    let mut order = Vec::with_capacity(node_count);

    while let Some(&n) = ready.iter().next() {
        ready.remove(&n);
        order.push(n);
        for &s in &succs[n.index()] {
            in_degree[s.index()] -= 1;
            if in_degree[s.index()] == 0 {
                ready.insert(s);
            }
        }
    }

    if order.len() < node_count {
        let stuck: Vec<NodeId> = (0..node_count as u32)
            .map(NodeId)
            .filter(|n| in_degree[n.index()] > 0)
            .collect();
        return Err(NetworkError::Cycle(stuck));
    }
    Ok(order)
}
