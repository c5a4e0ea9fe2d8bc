use crate::params::NumberParameter;
use crate::{LayoutEngine, LayoutMapping, LayoutParameter, LayoutSettings, Point, SyncLayout};
use anyhow::Result;
use graphwerk_graph::Graph;
use std::f64::consts::TAU;

pub const ID: &str = "circular";

/// Nodes evenly spaced on a circle, in enumeration order
#[derive(Debug, Clone, Copy, Default)]
pub struct CircularEngine;

pub fn layout() -> SyncLayout {
    SyncLayout::new(ID, CircularEngine)
        .with_parameter(
            LayoutParameter::number("scale", NumberParameter::new(1.0).min(0.0).step(0.1))
                .described(),
        )
        .with_parameter(LayoutParameter::number(
            "center",
            NumberParameter::new(0.5).step(0.1),
        ))
}

impl LayoutEngine for CircularEngine {
    fn layout(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping> {
        let scale = settings.number("scale").unwrap_or(1.0);
        let center = settings.number("center").unwrap_or(0.5);
        let center = Point::new(center, center);

        let order = graph.order().max(1) as f64;
        Ok(graph
            .node_ids()
            .enumerate()
            .map(|(i, id)| {
                let angle = TAU * i as f64 / order;
                (id.to_string(), Point::on_circle(center, scale, angle))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphwerk_graph::{DataGraph, ItemData};
    use test_log::test;

    #[test]
    fn nodes_lie_on_the_circle() {
        let mut graph = DataGraph::new();
        for id in ["a", "b", "c", "d"] {
            graph.add_node(id, ItemData::new()).unwrap();
        }
        let settings = LayoutSettings::new().with("scale", 2.0).with("center", 0.0);
        let mapping = CircularEngine.layout(&graph, &settings).unwrap();

        for point in mapping.values() {
            assert!((point.x.hypot(point.y) - 2.0).abs() < 1e-9);
        }
        assert!((mapping["a"].x - 2.0).abs() < 1e-9);
        assert!((mapping["c"].x + 2.0).abs() < 1e-9);
    }
}
