use crate::{Point, Vec2};
use petgraph::graphmap::DiGraphMap;
use std::cmp::Ordering;

/// Minimum vertical move considered a change during barycenter passes
const SETTLED: f64 = 0.1;

/// Place layers left to right and spread each layer vertically
///
/// Nodes are squares of side `node_size`. Positions are indexed by node.
pub(super) fn assign_coordinates(
    layers: &[Vec<usize>],
    dag: &DiGraphMap<usize, ()>,
    order: usize,
    node_size: f64,
    margin: Vec2,
    max_iterations: usize,
) -> Vec<Point> {
    let mut positions = vec![Point::default(); order];

    let step = Vec2::new(node_size + margin.x, node_size + margin.y);
    for (depth, layer) in layers.iter().enumerate() {
        for (rank, &node) in layer.iter().enumerate() {
            positions[node] = Point::new(depth as f64 * step.x, rank as f64 * step.y);
        }
    }

    for _ in 0..max_iterations {
        let mut changed = false;
        // Right to left, align nodes with the barycenter of their successors
        for depth in (0..layers.len().saturating_sub(1)).rev() {
            let layer = &layers[depth];
            for &node in layer {
                let Some(y) = barycenter(node, dag, &positions) else {
                    continue;
                };
                if (y - positions[node].y).abs() > SETTLED {
                    positions[node].y = y;
                    changed = true;
                }
            }
            changed |= separate(layer, &mut positions, step.y);
        }
        if !changed {
            break;
        }
    }

    let top = positions
        .iter()
        .map(|position| position.y)
        .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .unwrap_or(0.0);
    for position in &mut positions {
        position.y -= top;
    }
    positions
}

/// Mean vertical position of a node's successors
fn barycenter(node: usize, dag: &DiGraphMap<usize, ()>, positions: &[Point]) -> Option<f64> {
    let (sum, count) = dag
        .neighbors(node)
        .fold((0.0, 0usize), |(sum, count), succ| (sum + positions[succ].y, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Push overlapping nodes of a layer apart, returns whether anything moved
fn separate(layer: &[usize], positions: &mut [Point], spacing: f64) -> bool {
    let mut sorted = layer.to_vec();
    sorted.sort_by(|&a, &b| {
        positions[a]
            .y
            .partial_cmp(&positions[b].y)
            .unwrap_or(Ordering::Equal)
    });

    let mut moved = false;
    for pair in sorted.windows(2) {
        let lowest = positions[pair[0]].y + spacing;
        if positions[pair[1]].y < lowest {
            positions[pair[1]].y = lowest;
            moved = true;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn layers_advance_horizontally() {
        let dag = DiGraphMap::from_edges([(0, 1), (1, 2)]);
        let layers = vec![vec![0], vec![1], vec![2]];
        let positions = assign_coordinates(&layers, &dag, 3, 10.0, Vec2::new(20.0, 20.0), 50);
        assert_eq!(positions[0].x, 0.0);
        assert_eq!(positions[1].x, 30.0);
        assert_eq!(positions[2].x, 60.0);
        assert!(positions.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn nodes_of_a_layer_keep_their_distance() {
        let dag = DiGraphMap::from_edges([(0, 2), (1, 2)]);
        let layers = vec![vec![0, 1], vec![2]];
        let positions = assign_coordinates(&layers, &dag, 3, 10.0, Vec2::new(5.0, 5.0), 50);
        assert!((positions[0].y - positions[1].y).abs() >= 15.0);
        assert!(positions.iter().map(|p| p.y).all(|y| y >= 0.0));
    }
}
