//! Per-period traversal plans, computed once from static topology.
//!
//! # Contract
//!
//! Both phases of a simulation period walk the DAG depth-first from every
//! source node toward the sinks, with an explicit work-stack and a
//! visited-set keyed by node index — never recursion, so arbitrarily deep
//! networks cannot overflow the call stack.  **Siblings are visited in
//! ascending node index order**, and source roots are taken in ascending
//! order; both orderings are part of the engine's determinism contract and
//! are pinned by tests.
//!
//! - The **order phase** needs a node processed only after *all* of its
//!   successors (their orders must already be deposited).  DFS post-order
//!   delivers this: in an acyclic graph, any already-visited successor is
//!   necessarily fully finished.  The pre-order (Enter) sequence doubles as
//!   the demand-draw order.
//! - The **shipment phase** needs a node processed only after *all* of its
//!   predecessors (a zero-lead-time shipment released upstream this period
//!   must be visible downstream this period).  Plain pre-order DFS is not
//!   enough on a DAG — a merge node can be reached before its other parents
//!   — so a successor is pushed only once its last predecessor has been
//!   processed.
//!
//! Since the topology is static, the walks run once at network build time
//! and the engine replays the resulting sequences every period.

use meio_core::NodeId;

/// The fixed per-period visit sequences for one network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraversalPlan {
    /// Order phase, pre-order (Enter): demand-draw sequence.
    pub order_enter: Vec<NodeId>,
    /// Order phase, post-order (Exit): receive-and-order sequence.  Every
    /// node appears after all of its successors.
    pub order_exit: Vec<NodeId>,
    /// Shipment phase visit sequence.  Every node appears after all of its
    /// predecessors.
    pub shipment_visit: Vec<NodeId>,
}

impl TraversalPlan {
    pub(crate) fn build(
        preds:   &[Vec<NodeId>],
        succs:   &[Vec<NodeId>],
        sources: &[NodeId],
    ) -> TraversalPlan {
        let (order_enter, order_exit) = order_phase_walk(succs, sources);
        let shipment_visit = shipment_phase_walk(preds, succs, sources);
        TraversalPlan { order_enter, order_exit, shipment_visit }
    }
}

/// One work-stack frame of the order-phase DFS.
enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

/// DFS from each source toward the sinks, returning (pre-order, post-order).
fn order_phase_walk(succs: &[Vec<NodeId>], sources: &[NodeId]) -> (Vec<NodeId>, Vec<NodeId>) {
    let node_count = succs.len();
    let mut visited = vec![false; node_count];
    let mut enter = Vec::with_capacity(node_count);
    let mut exit = Vec::with_capacity(node_count);
    let mut stack: Vec<Visit> = Vec::new();

    for &root in sources {
        stack.push(Visit::Enter(root));
        while let Some(frame) = stack.pop() {
            match frame {
                Visit::Enter(n) => {
                    if visited[n.index()] {
                        continue;
                    }
                    visited[n.index()] = true;
                    enter.push(n);
                    stack.push(Visit::Exit(n));
                    // Reverse push so the smallest sibling pops first.
                    for &s in succs[n.index()].iter().rev() {
                        if !visited[s.index()] {
                            stack.push(Visit::Enter(s));
                        }
                    }
                }
                Visit::Exit(n) => exit.push(n),
            }
        }
    }
    (enter, exit)
}

/// DFS from each source toward the sinks, processing a node at first visit
/// but deferring any successor until all of its predecessors are done.
fn shipment_phase_walk(
    preds:   &[Vec<NodeId>],
    succs:   &[Vec<NodeId>],
    sources: &[NodeId],
) -> Vec<NodeId> {
    let node_count = succs.len();
    let mut visited = vec![false; node_count];
    let mut order = Vec::with_capacity(node_count);
    let mut stack: Vec<NodeId> = Vec::new();

    for &root in sources {
        stack.push(root);
        while let Some(n) = stack.pop() {
            if visited[n.index()] {
                continue;
            }
            visited[n.index()] = true;
            order.push(n);
            // A merge node is pushed exactly once: by its last-finishing
            // predecessor.
            for &s in succs[n.index()].iter().rev() {
                let ready = !visited[s.index()]
                    && preds[s.index()].iter().all(|p| visited[p.index()]);
                if ready {
                    stack.push(s);
                }
            }
        }
    }
    order
}
