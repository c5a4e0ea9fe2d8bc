use crate::params::{AttributeRestriction, NumberParameter};
use crate::{LayoutEngine, LayoutMapping, LayoutParameter, LayoutSettings, Point, SyncLayout};
use anyhow::Result;
use graphwerk_graph::{Graph, ItemType};
use std::f64::consts::{PI, TAU};

pub const ID: &str = "circlepack";

/// Angle between two consecutive nodes of a packed disc
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Nodes packed into one disc per value of a grouping attribute
///
/// Discs are sized after their number of nodes and placed on a ring around
/// the origin, in order of first appearance. Nodes without a value share a
/// group. Without grouping attribute all nodes form one disc.
#[derive(Debug, Clone, Copy, Default)]
pub struct CirclePackEngine;

pub fn layout() -> SyncLayout {
    SyncLayout::new(ID, CirclePackEngine)
        .described()
        .with_parameter(
            LayoutParameter::attribute(
                "groupingAttribute",
                ItemType::Nodes,
                Some(AttributeRestriction::Qualitative),
            )
            .described(),
        )
        .with_parameter(LayoutParameter::number(
            "scale",
            NumberParameter::new(1.0).min(0.0).step(0.1),
        ))
}

impl LayoutEngine for CirclePackEngine {
    fn layout(&self, graph: &dyn Graph, settings: &LayoutSettings) -> Result<LayoutMapping> {
        let scale = settings.number("scale").unwrap_or(1.0);
        let field = settings.attribute("groupingAttribute");

        let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
        for id in graph.node_ids() {
            let key = field
                .and_then(|field| graph.attribute(ItemType::Nodes, id, field))
                .filter(|value| !value.is_null())
                .map(|value| value.to_string())
                .unwrap_or_default();
            match groups.iter_mut().find(|(group, _)| *group == key) {
                Some((_, members)) => members.push(id),
                None => groups.push((key, vec![id])),
            }
        }

        let radii: Vec<f64> = groups
            .iter()
            .map(|(_, members)| scale * (members.len() as f64).sqrt())
            .collect();
        let total: f64 = radii.iter().sum();
        let ring = if groups.len() > 1 {
            total / PI + radii.iter().copied().fold(0.0, f64::max)
        } else {
            0.0
        };

        let mut mapping = LayoutMapping::new();
        let mut arc = 0.0;
        for ((_, members), radius) in groups.iter().zip(&radii) {
            // Each disc gets a share of the ring proportional to its radius
            let angle = TAU * (arc + radius / 2.0) / total.max(f64::EPSILON);
            arc += radius;
            let center = Point::on_circle(Point::default(), ring, angle);

            let count = members.len() as f64;
            for (k, id) in members.iter().enumerate() {
                let distance = radius * ((k as f64 + 0.5) / count).sqrt();
                let position = Point::on_circle(center, distance, k as f64 * GOLDEN_ANGLE);
                mapping.insert(id.to_string(), position);
            }
        }
        Ok(mapping)
    }
}
