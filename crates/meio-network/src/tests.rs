//! Unit tests for topology construction and traversal plans.

use meio_core::NodeId;
use meio_model::{DemandSource, InventoryPolicy};

use crate::{NetworkBuilder, NetworkError, Partner, SupplyNode};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn plain_node() -> SupplyNode {
    SupplyNode {
        policy: Some(InventoryPolicy::local_base_stock(10.0)),
        ..Default::default()
    }
}

fn demand_node() -> SupplyNode {
    SupplyNode {
        policy: Some(InventoryPolicy::local_base_stock(10.0)),
        demand: Some(DemandSource::constant(4.0).unwrap()),
        ..Default::default()
    }
}

/// 0 → 1 → 2 serial chain, demand at node 2.
fn serial_3() -> crate::SupplyNetwork {
    let (b, _ids) = NetworkBuilder::serial(vec![plain_node(), plain_node(), demand_node()]);
    b.build().unwrap()
}

/// Assembly: components 0 and 1 both feed assembler 2; distribution below:
/// 2 → 3 and 2 → 4, demand at 3 and 4.
fn diamond() -> crate::SupplyNetwork {
    let mut b = NetworkBuilder::new();
    let c0 = b.add_node(plain_node());
    let c1 = b.add_node(plain_node());
    let asm = b.add_node(plain_node());
    let r0 = b.add_node(demand_node());
    let r1 = b.add_node(demand_node());
    b.add_edge_with_usage(c0, asm, 2.0);
    b.add_edge(c1, asm);
    b.add_edge(asm, r0);
    b.add_edge(asm, r1);
    b.build().unwrap()
}

// ── Builder validation ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn empty_network_rejected() {
        assert!(matches!(NetworkBuilder::new().build(), Err(NetworkError::Empty)));
    }

    #[test]
    fn cycle_rejected() {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_node(plain_node());
        let n1 = b.add_node(plain_node());
        let n2 = b.add_node(plain_node());
        b.add_edge(n0, n1);
        b.add_edge(n1, n2);
        b.add_edge(n2, n0);
        match b.build() {
            Err(NetworkError::Cycle(stuck)) => {
                assert_eq!(stuck, vec![n0, n1, n2]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn self_loop_rejected() {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_node(plain_node());
        b.add_edge(n0, n0);
        assert!(matches!(b.build(), Err(NetworkError::SelfLoop(_))));
    }

    #[test]
    fn duplicate_edge_rejected() {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_node(plain_node());
        let n1 = b.add_node(plain_node());
        b.add_edge(n0, n1);
        b.add_edge(n0, n1);
        assert!(matches!(b.build(), Err(NetworkError::DuplicateEdge { .. })));
    }

    #[test]
    fn unknown_endpoint_rejected() {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_node(plain_node());
        b.add_edge(n0, NodeId(9));
        assert!(matches!(b.build(), Err(NetworkError::UnknownNode(_))));
    }

    #[test]
    fn negative_cost_rejected() {
        let mut b = NetworkBuilder::new();
        b.add_node(SupplyNode {
            stockout_cost: -1.0,
            ..plain_node()
        });
        assert!(matches!(b.build(), Err(NetworkError::NegativeValue { .. })));
    }

    #[test]
    fn non_positive_usage_rejected() {
        let mut b = NetworkBuilder::new();
        let n0 = b.add_node(plain_node());
        let n1 = b.add_node(plain_node());
        b.add_edge_with_usage(n0, n1, 0.0);
        assert!(matches!(b.build(), Err(NetworkError::InvalidUsageRate { .. })));
    }
}

// ── Topology queries ──────────────────────────────────────────────────────────

#[cfg(test)]
mod topology {
    use super::*;

    #[test]
    fn serial_endpoints() {
        let net = serial_3();
        assert_eq!(net.source_nodes(), vec![NodeId(0)]);
        assert_eq!(net.sink_nodes(), vec![NodeId(2)]);
        assert!(net.has_external_supply(NodeId(0)));
        assert!(!net.has_external_supply(NodeId(1)));
        assert!(net.has_external_demand(NodeId(2)));
        assert!(!net.has_external_demand(NodeId(1)));
    }

    #[test]
    fn slot_layout_internal_then_external() {
        let net = serial_3();
        // Node 0: no internal preds, external supply in slot 0.
        assert_eq!(net.pred_slot_count(NodeId(0)), 1);
        assert_eq!(net.pred_partner(NodeId(0), 0), Partner::External);
        assert_eq!(net.external_supply_slot(NodeId(0)), Some(0));
        // Node 1: one internal pred, no external supply.
        assert_eq!(net.pred_slot_count(NodeId(1)), 1);
        assert_eq!(net.pred_partner(NodeId(1), 0), Partner::Node(NodeId(0)));
        assert_eq!(net.external_supply_slot(NodeId(1)), None);
        // Node 2: internal succ slots empty, external demand slot trailing.
        assert_eq!(net.succ_slot_count(NodeId(2)), 1);
        assert_eq!(net.succ_partner(NodeId(2), 0), Partner::External);
        assert_eq!(net.external_demand_slot(NodeId(2)), Some(0));
        // Node 1's successor slot 0 is node 2.
        assert_eq!(net.succ_slot(NodeId(1), NodeId(2)), Some(0));
        assert_eq!(net.pred_slot(NodeId(1), NodeId(0)), Some(0));
    }

    #[test]
    fn usage_rates_follow_sorted_pred_order() {
        let net = diamond();
        let asm = NodeId(2);
        assert_eq!(net.preds(asm), &[NodeId(0), NodeId(1)]);
        assert_eq!(net.usage_rates(asm), &[2.0, 1.0]);
        assert_eq!(net.usage_for_slot(asm, 0), 2.0);
        assert_eq!(net.usage_for_slot(asm, 1), 1.0);
    }

    #[test]
    fn descendants_are_strict_and_sorted() {
        let net = diamond();
        assert_eq!(
            net.descendants(NodeId(0)),
            &[NodeId(2), NodeId(3), NodeId(4)]
        );
        assert_eq!(net.descendants(NodeId(2)), &[NodeId(3), NodeId(4)]);
        assert!(net.descendants(NodeId(3)).is_empty());
    }

    #[test]
    fn extra_periods_covers_lead_times() {
        let (b, _ids) = NetworkBuilder::serial(vec![
            SupplyNode { order_lead_time: 3, shipment_lead_time: 1, ..plain_node() },
            SupplyNode { order_lead_time: 0, shipment_lead_time: 4, ..demand_node() },
        ]);
        let net = b.build().unwrap();
        assert_eq!(net.max_order_lead_time(), 3);
        assert_eq!(net.max_shipment_lead_time(), 4);
        assert_eq!(net.extra_periods(), 9);
    }
}

// ── Traversal plans ───────────────────────────────────────────────────────────

#[cfg(test)]
mod traversal {
    use super::*;

    #[test]
    fn serial_orders() {
        let net = serial_3();
        let plan = net.plan();
        assert_eq!(plan.order_enter, vec![NodeId(0), NodeId(1), NodeId(2)]);
        // Post-order: sink first, source last.
        assert_eq!(plan.order_exit, vec![NodeId(2), NodeId(1), NodeId(0)]);
        assert_eq!(plan.shipment_visit, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn every_node_appears_exactly_once() {
        let net = diamond();
        let plan = net.plan();
        for seq in [&plan.order_enter, &plan.order_exit, &plan.shipment_visit] {
            let mut sorted: Vec<_> = seq.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, net.node_ids().collect::<Vec<_>>());
        }
    }

    #[test]
    fn order_exit_places_node_after_all_successors() {
        let net = diamond();
        let pos = |seq: &[NodeId], n: NodeId| seq.iter().position(|&x| x == n).unwrap();
        let exit = &net.plan().order_exit;
        for n in net.node_ids() {
            for &s in net.succs(n) {
                assert!(
                    pos(exit, s) < pos(exit, n),
                    "{n} must exit after successor {s}"
                );
            }
        }
    }

    #[test]
    fn shipment_visit_places_node_after_all_predecessors() {
        let net = diamond();
        let pos = |seq: &[NodeId], n: NodeId| seq.iter().position(|&x| x == n).unwrap();
        let visit = &net.plan().shipment_visit;
        for n in net.node_ids() {
            for &p in net.preds(n) {
                assert!(
                    pos(visit, p) < pos(visit, n),
                    "{n} must ship after predecessor {p}"
                );
            }
        }
        // The merge node waits for BOTH components even though a pure DFS
        // from source 0 would reach it first.
        assert_eq!(visit[..2], [NodeId(0), NodeId(1)]);
    }

    #[test]
    fn siblings_visited_in_ascending_index_order() {
        // One source fanning out to three retailers added "out of order".
        let mut b = NetworkBuilder::new();
        let src = b.add_node(plain_node());
        let r2 = b.add_node(demand_node());
        let r1 = b.add_node(demand_node());
        let r0 = b.add_node(demand_node());
        // Edge insertion order deliberately scrambled.
        b.add_edge(src, r0);
        b.add_edge(src, r2);
        b.add_edge(src, r1);
        let net = b.build().unwrap();
        assert_eq!(
            net.plan().order_enter,
            vec![src, r2, r1, r0],
            "siblings must be entered in ascending NodeId order"
        );
    }
}
