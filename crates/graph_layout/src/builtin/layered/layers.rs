use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashMap;

/// Assign every node of a DAG to a layer
///
/// Nodes first go one layer after their deepest predecessor, then sources
/// are pulled forward next to their closest successor to shorten edges.
///
/// Fails with the node where a cycle was detected.
pub(super) fn assign_layers(dag: &DiGraphMap<usize, ()>) -> Result<Vec<Vec<usize>>, usize> {
    let order = toposort(dag, None).map_err(|cycle| cycle.node_id())?;
    let mut layer_of: HashMap<usize, usize> = HashMap::with_capacity(order.len());

    for &node in &order {
        let layer = dag
            .neighbors_directed(node, Direction::Incoming)
            .filter_map(|pred| layer_of.get(&pred))
            .map(|layer| layer + 1)
            .max()
            .unwrap_or(0);
        layer_of.insert(node, layer);
    }

    for &node in order.iter().rev() {
        let Some(&layer) = layer_of.get(&node) else {
            continue;
        };
        let closest = dag
            .neighbors_directed(node, Direction::Outgoing)
            .filter_map(|succ| layer_of.get(&succ).copied())
            .min();
        if let Some(closest) = closest.filter(|&closest| closest > layer + 1) {
            layer_of.insert(node, closest - 1);
        }
    }

    let depth = layer_of.values().max().map_or(0, |max| max + 1);
    let mut layers = vec![Vec::new(); depth];
    // Toposort order keeps the in-layer order deterministic
    for node in order {
        if let Some(&layer) = layer_of.get(&node) {
            layers[layer].push(node);
        }
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn chain_gets_one_layer_per_node() {
        let dag = DiGraphMap::from_edges([(0, 1), (1, 2)]);
        assert_eq!(assign_layers(&dag).unwrap(), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn sources_move_next_to_their_successor() {
        // 0 -> 1 -> 2 and 3 -> 2: node 3 belongs right before 2
        let dag = DiGraphMap::from_edges([(0, 1), (1, 2), (3, 2)]);
        let layers = assign_layers(&dag).unwrap();
        assert_eq!(layers.len(), 3);
        assert!(layers[1].contains(&3));
    }

    #[test]
    fn cycles_are_reported() {
        let dag = DiGraphMap::<usize, ()>::from_edges([(0, 1), (1, 0)]);
        assert!(assign_layers(&dag).is_err());
    }
}
