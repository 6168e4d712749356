//! Degree bookkeeping must agree across the sparse, dense and petgraph forms.

use netomata_core::{AdjacencyMatrix, Edge, NodeId, Topology};
use proptest::prelude::*;

fn edge_lists(max_nodes: usize) -> impl Strategy<Value = Vec<Vec<Edge>>> {
    (1..max_nodes).prop_flat_map(|n| {
        prop::collection::vec(
            prop::collection::vec((0..n, -2.0f64..2.0).prop_map(|(s, w)| Edge::new(s, w)), 0..6),
            n,
        )
    })
}

proptest! {
    #[test]
    fn in_and_out_degrees_sum_to_edge_count(inbound in edge_lists(12)) {
        let topology = Topology::from_inbound(inbound).unwrap();
        let edges = topology.edge_count();
        prop_assert_eq!(topology.in_degrees().iter().sum::<usize>(), edges);
        prop_assert_eq!(topology.out_degrees().iter().sum::<usize>(), edges);
        for node in topology.nodes() {
            prop_assert_eq!(topology.out_degrees()[node.index()], topology.out_degree(node));
        }
    }

    #[test]
    fn petgraph_view_counts_every_parallel_edge(inbound in edge_lists(10)) {
        let topology = Topology::from_inbound(inbound).unwrap();
        let graph = topology.to_graph();
        prop_assert_eq!(graph.node_count(), topology.node_count());
        prop_assert_eq!(graph.edge_count(), topology.edge_count());
    }

    #[test]
    fn dense_round_trip_is_lossless(rows in (1usize..8).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(prop_oneof![Just(0.0), -3.0f64..3.0], n), n)
    })) {
        let matrix = AdjacencyMatrix::from_rows(rows).unwrap();
        let topology = Topology::from(&matrix);
        prop_assert_eq!(topology.edge_count(), matrix.edge_count());
        prop_assert_eq!(topology.to_matrix().unwrap(), matrix);
    }
}

#[test]
fn snapshot_serializes_as_inbound_lists() {
    let mut topology = Topology::new(2);
    topology.add_edge(NodeId(1), NodeId(0), 0.5).unwrap();
    let json = serde_json::to_value(&topology).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "inbound": [[{ "source": 1, "weight": 0.5 }], []] })
    );
}
