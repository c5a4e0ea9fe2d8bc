use crate::Point;
use derive_more::{Deref, DerefMut, From};
use graphwerk_graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Position of every node of a graph, keyed by node id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Deref, DerefMut, From)]
#[serde(transparent)]
pub struct LayoutMapping(BTreeMap<String, Point>);

/// A mapping whose key set differs from the node set of its graph
#[derive(Debug, Error, PartialEq, Eq)]
#[error("mapping doesn't match the graph: missing {missing:?}, unknown {unknown:?}")]
pub struct MappingMismatch {
    pub missing: Vec<String>,
    pub unknown: Vec<String>,
}

impl LayoutMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that the mapping positions exactly the nodes of `graph`
    pub fn check_covers(&self, graph: &dyn Graph) -> Result<(), MappingMismatch> {
        let nodes: HashSet<&str> = graph.node_ids().collect();
        let missing: Vec<String> = nodes
            .iter()
            .copied()
            .filter(|id| !self.0.contains_key(*id))
            .map(str::to_string)
            .collect();
        let unknown: Vec<String> = self
            .0
            .keys()
            .filter(|id| !nodes.contains(id.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() && unknown.is_empty() {
            Ok(())
        } else {
            Err(MappingMismatch { missing, unknown })
        }
    }
}

impl FromIterator<(String, Point)> for LayoutMapping {
    fn from_iter<I: IntoIterator<Item = (String, Point)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for LayoutMapping {
    type Item = (String, Point);
    type IntoIter = std::collections::btree_map::IntoIter<String, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Intermediate or final result pushed by a background layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    pub mapping: LayoutMapping,
    /// Number of algorithm steps completed when the snapshot was taken
    pub iteration: usize,
    /// Set on the last snapshot of a gracefully ended computation
    pub is_final: bool,
}
