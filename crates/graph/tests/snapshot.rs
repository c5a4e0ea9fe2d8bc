use graphwerk_graph::{DataGraph, Graph, GraphSnapshot, ItemData, ItemType, Scalar};
use test_log::test;

fn path(len: usize) -> DataGraph {
    let mut graph = DataGraph::new();
    for i in 0..len {
        graph.add_node(format!("n{i}"), ItemData::new()).unwrap();
    }
    for i in 1..len {
        let (source, target) = (format!("n{}", i - 1), format!("n{i}"));
        graph
            .add_edge(format!("e{i}"), &source, &target, ItemData::new())
            .unwrap();
    }
    graph
}

#[test]
fn snapshot_does_not_observe_later_mutations() {
    let mut live = path(4);
    let snapshot = live.snapshot();

    live.remove_node("n0").unwrap();
    live.set_attribute(ItemType::Nodes, "n1", "color", "red")
        .unwrap();

    assert_eq!(snapshot.order(), 4);
    assert_eq!(snapshot.size(), 3);
    assert!(snapshot.has_node("n0"));
    assert_eq!(snapshot.attribute(ItemType::Nodes, "n1", "color"), None);
    assert_eq!(live.order(), 3);
}

#[test]
fn capture_copies_any_graph_implementation() {
    let mut live = path(3);
    live.set_attribute(ItemType::Edges, "e2", "weight", 4.0)
        .unwrap();

    let captured = GraphSnapshot::capture(&live);
    assert_eq!(
        captured.node_ids().collect::<Vec<_>>(),
        live.node_ids().collect::<Vec<_>>()
    );
    assert_eq!(captured.extremities("e2"), Some(("n1", "n2")));
    assert_eq!(
        captured.attribute(ItemType::Edges, "e2", "weight"),
        Some(&Scalar::Number(4.0))
    );

    let shared = captured.clone();
    assert_eq!(shared.order(), captured.order());
}
