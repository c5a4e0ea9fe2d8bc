use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashMap;

/// Reduce edge crossings by swapping neighbours within layers
///
/// Greedy local search: a swap is kept when it doesn't add crossings, ties
/// are broken on node index so the result is deterministic.
pub(super) fn minimize_crossings(
    dag: &DiGraphMap<usize, ()>,
    mut layers: Vec<Vec<usize>>,
    max_iterations: usize,
) -> Vec<Vec<usize>> {
    for _ in 0..max_iterations {
        let mut improved = false;
        for layer in 0..layers.len() {
            for i in 0..layers[layer].len().saturating_sub(1) {
                let before = count_crossings(dag, &layers);
                layers[layer].swap(i, i + 1);
                let after = count_crossings(dag, &layers);

                let worse = after > before
                    || (after == before && layers[layer][i] > layers[layer][i + 1]);
                if worse {
                    layers[layer].swap(i, i + 1);
                } else {
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    layers
}

/// Number of pairs of edges crossing between adjacent layers
pub(super) fn count_crossings(dag: &DiGraphMap<usize, ()>, layers: &[Vec<usize>]) -> usize {
    layers
        .windows(2)
        .map(|pair| {
            let lower: HashMap<usize, usize> = pair[1]
                .iter()
                .enumerate()
                .map(|(position, &node)| (node, position))
                .collect();
            // (upper position, lower position) of every edge between the two layers
            let edges: Vec<(usize, usize)> = pair[0]
                .iter()
                .enumerate()
                .flat_map(|(upper, &node)| {
                    dag.neighbors_directed(node, Direction::Outgoing)
                        .filter_map(|succ| lower.get(&succ).map(|&position| (upper, position)))
                        .collect::<Vec<_>>()
                })
                .collect();

            let mut crossings = 0;
            for (i, &(u1, l1)) in edges.iter().enumerate() {
                for &(u2, l2) in &edges[i + 1..] {
                    if u1 != u2 && l1 != l2 && (u1 < u2) != (l1 < l2) {
                        crossings += 1;
                    }
                }
            }
            crossings
        })
        .sum()
}
