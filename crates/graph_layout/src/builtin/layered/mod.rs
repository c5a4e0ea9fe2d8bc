//! Sugiyama-style layout for directed acyclic graphs
//!
//! Three phases: layer assignment, crossing reduction and coordinate
//! assignment. Layers run left to right.

mod crossings;
mod layers;
mod positions;

use crate::params::NumberParameter;
use crate::{LayoutEngine, LayoutMapping, LayoutParameter, LayoutSettings, SyncLayout, Vec2};
use anyhow::{anyhow, Result};
use graphwerk_graph::Graph;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;
use tracing::debug;

use crossings::minimize_crossings;
use layers::assign_layers;
use positions::assign_coordinates;

pub const ID: &str = "layered";

#[derive(Debug, Clone)]
pub struct LayeredEngine {
    /// Maximum passes of crossing reduction
    pub max_crossing_iterations: usize,
    /// Maximum passes of vertical barycenter alignment
    pub max_position_iterations: usize,
}

impl Default for LayeredEngine {
    fn default() -> Self {
        Self {
            max_crossing_iterations: 10,
            max_position_iterations: 50,
        }
    }
}

pub fn layout() -> SyncLayout {
    SyncLayout::new(ID, LayeredEngine::default())
        .described()
        .with_parameter(
            LayoutParameter::number("margin", NumberParameter::new(20.0).min(0.0).step(1.0))
                .described(),
        )
        .with_parameter(LayoutParameter::number(
            "nodeSize",
            NumberParameter::new(10.0).min(0.0).step(1.0),
        ))
}

impl LayoutEngine for LayeredEngine {
    fn layout(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping> {
        let margin = settings.number("margin").unwrap_or(20.0);
        let node_size = settings.number("nodeSize").unwrap_or(10.0);

        let ids: Vec<&str> = graph.node_ids().collect();
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let mut dag = DiGraphMap::<usize, ()>::with_capacity(ids.len(), graph.size());
        for node in 0..ids.len() {
            dag.add_node(node);
        }
        for edge in graph.edge_ids() {
            let Some((source, target)) = graph.extremities(edge) else {
                continue;
            };
            if let (Some(&source), Some(&target)) = (index.get(source), index.get(target)) {
                dag.add_edge(source, target, ());
            }
        }

        let layers = assign_layers(&dag)
            .map_err(|node| anyhow!("graph contains a cycle at node {:?}", ids[node]))?;
        let layers = minimize_crossings(&dag, layers, self.max_crossing_iterations);
        debug!("Layered layout: {} layers", layers.len());

        let positions = assign_coordinates(
            &layers,
            &dag,
            ids.len(),
            node_size,
            Vec2::new(margin, margin),
            self.max_position_iterations,
        );
        Ok(ids
            .into_iter()
            .zip(positions)
            .map(|(id, position)| (id.to_string(), position))
            .collect())
    }
}
