//! Spring-electrical force layout run on a background worker
//!
//! Every pair of nodes repels, every edge pulls its extremities together and
//! a weak gravity keeps disconnected components close to the origin.

use crate::params::{AttributeRestriction, NumberParameter};
use crate::{
    IterativeLayout, LayoutButton, LayoutMapping, LayoutParameter, LayoutSettings, Point,
    Progress, Vec2, WorkerLayout,
};
use anyhow::Result;
use graphwerk_graph::{Graph, GraphSnapshot, ItemType};
use std::collections::HashMap;
use std::f64::consts::TAU;

pub const ID: &str = "force";

/// Squared distance under which two nodes are considered overlapping
const MIN_DISTANCE_SQUARED: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct ForceSettings {
    pub attraction: f64,
    pub repulsion: f64,
    pub gravity: f64,
    /// Largest displacement of a node in one step
    pub max_move: f64,
    pub max_iterations: usize,
    /// Mean displacement under which the layout has converged
    pub tolerance: f64,
    pub edge_weight: Option<String>,
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self {
            attraction: 0.01,
            repulsion: 100.0,
            gravity: 0.01,
            max_move: 10.0,
            max_iterations: 500,
            tolerance: 0.01,
            edge_weight: None,
        }
    }
}

impl ForceSettings {
    pub fn from_settings(settings: &LayoutSettings) -> Self {
        let defaults = Self::default();
        Self {
            attraction: settings.number("attraction").unwrap_or(defaults.attraction),
            repulsion: settings.number("repulsion").unwrap_or(defaults.repulsion),
            gravity: settings.number("gravity").unwrap_or(defaults.gravity),
            max_move: settings.number("maxMove").unwrap_or(defaults.max_move),
            max_iterations: settings
                .number("maxIterations")
                .map_or(defaults.max_iterations, |n| n as usize),
            tolerance: settings.number("tolerance").unwrap_or(defaults.tolerance),
            edge_weight: settings.attribute("edgeWeight").map(str::to_string),
        }
    }
}

pub fn layout() -> WorkerLayout {
    let defaults = ForceSettings::default();
    WorkerLayout::iterative(ID, build)
        .described()
        .with_parameter(LayoutParameter::number(
            "attraction",
            NumberParameter::new(defaults.attraction).min(0.0).step(0.001),
        ))
        .with_parameter(LayoutParameter::number(
            "repulsion",
            NumberParameter::new(defaults.repulsion).min(0.0).step(1.0),
        ))
        .with_parameter(LayoutParameter::number(
            "gravity",
            NumberParameter::new(defaults.gravity).min(0.0).step(0.001),
        ))
        .with_parameter(LayoutParameter::number(
            "maxMove",
            NumberParameter::new(defaults.max_move).min(0.0).step(1.0),
        ))
        .with_parameter(
            LayoutParameter::number(
                "maxIterations",
                NumberParameter::new(defaults.max_iterations as f64)
                    .min(1.0)
                    .step(1.0),
            )
            .described(),
        )
        .with_parameter(LayoutParameter::number(
            "tolerance",
            NumberParameter::new(defaults.tolerance).min(0.0).step(0.01),
        ))
        .with_parameter(
            LayoutParameter::attribute(
                "edgeWeight",
                ItemType::Edges,
                Some(AttributeRestriction::Quantitative),
            )
            .described(),
        )
        .with_button(LayoutButton::new("autoSettings", auto_settings).described())
}

/// Settings tuned to the size of the graph
fn auto_settings(current: &LayoutSettings, graph: &dyn Graph) -> LayoutSettings {
    let order = graph.order().max(1) as f64;
    current
        .clone()
        .with("repulsion", 10.0 * order)
        .with("gravity", 0.05 / order.sqrt())
}

fn build(graph: &GraphSnapshot, settings: &LayoutSettings) -> Result<Box<dyn IterativeLayout>> {
    let layout = ForceLayout::new(graph, ForceSettings::from_settings(settings));
    Ok(Box::new(layout))
}

/// Algorithm state of the force layout
#[derive(Debug, Clone)]
pub struct ForceLayout {
    settings: ForceSettings,
    ids: Vec<String>,
    positions: Vec<Vec2>,
    /// Source index, target index, weight
    springs: Vec<(usize, usize, f64)>,
    iteration: usize,
}

impl ForceLayout {
    pub fn new(graph: &dyn Graph, settings: ForceSettings) -> Self {
        let ids: Vec<String> = graph.node_ids().map(str::to_string).collect();
        let index: HashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let springs = graph
            .edge_ids()
            .filter_map(|edge| {
                let (source, target) = graph.extremities(edge)?;
                let weight = match &settings.edge_weight {
                    Some(field) => graph
                        .attribute(ItemType::Edges, edge, field)
                        .and_then(|value| value.as_number())
                        .map_or(1.0, |weight| weight.max(0.0)),
                    None => 1.0,
                };
                Some((*index.get(source)?, *index.get(target)?, weight))
            })
            .filter(|(source, target, _)| source != target)
            .collect();

        // Deterministic start: nodes on a circle growing with the graph
        let radius = 10.0 * (ids.len() as f64).sqrt();
        let count = ids.len().max(1) as f64;
        let positions = (0..ids.len())
            .map(|i| Vec2::from(Point::on_circle(Point::default(), radius, TAU * i as f64 / count)))
            .collect();

        Self {
            settings,
            ids,
            positions,
            springs,
            iteration: 0,
        }
    }

    fn displacements(&self) -> Vec<Vec2> {
        let ForceSettings {
            attraction,
            repulsion,
            gravity,
            ..
        } = self.settings;
        let mut moves = vec![Vec2::zero(); self.positions.len()];

        for i in 0..self.positions.len() {
            for j in i + 1..self.positions.len() {
                let delta = self.positions[i] - self.positions[j];
                let squared = (delta.x * delta.x + delta.y * delta.y).max(MIN_DISTANCE_SQUARED);
                let push = if delta.length() > 0.0 {
                    delta.scale(repulsion / squared)
                } else {
                    // Overlapping nodes: separate along an index-dependent direction
                    let away = Point::on_circle(Point::default(), 1.0, i as f64);
                    Vec2::from(away).scale(repulsion / MIN_DISTANCE_SQUARED)
                };
                moves[i] += push;
                moves[j] = moves[j] - push;
            }
        }

        for &(source, target, weight) in &self.springs {
            let pull = (self.positions[target] - self.positions[source]).scale(attraction * weight);
            moves[source] += pull;
            moves[target] = moves[target] - pull;
        }

        for (shift, position) in moves.iter_mut().zip(&self.positions) {
            *shift = *shift - position.scale(gravity);
        }
        moves
    }
}

impl IterativeLayout for ForceLayout {
    fn step(&mut self, _graph: &GraphSnapshot) -> Result<Progress> {
        let moves = self.displacements();
        let mut travelled = 0.0;
        for (position, shift) in self.positions.iter_mut().zip(moves) {
            let length = shift.length();
            let shift = if length > self.settings.max_move {
                shift.scale(self.settings.max_move / length)
            } else {
                shift
            };
            *position += shift;
            travelled += shift.length();
        }
        self.iteration += 1;

        let mean = travelled / self.positions.len().max(1) as f64;
        if self.iteration >= self.settings.max_iterations || mean < self.settings.tolerance {
            Ok(Progress::Converged)
        } else {
            Ok(Progress::Running)
        }
    }

    fn mapping(&self) -> LayoutMapping {
        self.ids
            .iter()
            .cloned()
            .zip(self.positions.iter().map(|&position| Point::from(position)))
            .collect()
    }
}
