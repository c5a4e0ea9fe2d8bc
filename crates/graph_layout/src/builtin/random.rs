use crate::params::NumberParameter;
use crate::{LayoutEngine, LayoutMapping, LayoutParameter, LayoutSettings, Point, SyncLayout};
use anyhow::Result;
use graphwerk_graph::Graph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ID: &str = "random";

/// Uniform positions in a square of side `scale` around `(center, center)`
///
/// The same seed always yields the same layout for the same graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomEngine;

pub fn layout() -> SyncLayout {
    SyncLayout::new(ID, RandomEngine)
        .with_parameter(
            LayoutParameter::number("scale", NumberParameter::new(1.0).min(0.0).step(0.1))
                .described(),
        )
        .with_parameter(LayoutParameter::number(
            "center",
            NumberParameter::new(0.5).step(0.1),
        ))
        .with_parameter(
            LayoutParameter::number("seed", NumberParameter::new(0.0).min(0.0).step(1.0))
                .described(),
        )
}

impl LayoutEngine for RandomEngine {
    fn layout(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping> {
        let scale = settings.number("scale").unwrap_or(1.0);
        let center = settings.number("center").unwrap_or(0.5);
        let seed = settings.number("seed").unwrap_or(0.0) as u64;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut coordinate = || center + (rng.gen::<f64>() - 0.5) * scale;
        Ok(graph
            .node_ids()
            .map(|id| (id.to_string(), Point::new(coordinate(), coordinate())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphwerk_graph::{DataGraph, ItemData};
    use test_log::test;

    fn graph() -> DataGraph {
        let mut graph = DataGraph::new();
        for i in 0..20 {
            graph.add_node(format!("n{i}"), ItemData::new()).unwrap();
        }
        graph
    }

    #[test]
    fn stays_within_the_square() {
        let settings = LayoutSettings::new().with("scale", 2.0).with("center", 1.0);
        let mapping = RandomEngine.layout(&graph(), &settings).unwrap();
        assert_eq!(mapping.len(), 20);
        assert!(mapping
            .values()
            .all(|p| (0.0..=2.0).contains(&p.x) && (0.0..=2.0).contains(&p.y)));
    }

    #[test]
    fn seed_makes_it_reproducible() {
        let graph = graph();
        let seeded = |seed: f64| {
            RandomEngine
                .layout(&graph, &LayoutSettings::new().with("seed", seed))
                .unwrap()
        };
        assert_eq!(seeded(7.0), seeded(7.0));
        assert_ne!(seeded(7.0), seeded(8.0));
    }
}
