use crate::{DataGraph, Graph, ItemData, ItemType};
use derive_more::Deref;
use std::sync::Arc;
use tracing::warn;

/// Immutable, cheaply clonable copy of a graph
///
/// Background computations receive one of these instead of a reference to
/// the live graph, so later edits to the live graph are never observed.
#[derive(Debug, Clone, Deref)]
pub struct GraphSnapshot(Arc<DataGraph>);

impl GraphSnapshot {
    /// Copy any graph implementation into a snapshot
    pub fn capture(graph: &dyn Graph) -> Self {
        let mut copy = DataGraph::new();
        for id in graph.node_ids() {
            let data = graph
                .item_data(ItemType::Nodes, id)
                .cloned()
                .unwrap_or_default();
            if let Err(e) = copy.add_node(id, data) {
                warn!("Skipping node while capturing snapshot: {e}");
            }
        }
        for id in graph.edge_ids() {
            let Some((source, target)) = graph.extremities(id) else {
                warn!("Skipping edge {id} without extremities");
                continue;
            };
            let data = graph
                .item_data(ItemType::Edges, id)
                .cloned()
                .unwrap_or_default();
            if let Err(e) = copy.add_edge(id, source, target, data) {
                warn!("Skipping edge while capturing snapshot: {e}");
            }
        }
        Self::from(copy)
    }
}

impl From<DataGraph> for GraphSnapshot {
    fn from(graph: DataGraph) -> Self {
        Self(Arc::new(graph))
    }
}

impl Graph for GraphSnapshot {
    fn node_ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        self.0.node_ids()
    }

    fn edge_ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        self.0.edge_ids()
    }

    fn item_data(&self, item_type: ItemType, id: &str) -> Option<&ItemData> {
        self.0.item_data(item_type, id)
    }

    fn extremities(&self, edge: &str) -> Option<(&str, &str)> {
        self.0.extremities(edge)
    }

    fn order(&self) -> usize {
        self.0.order()
    }

    fn size(&self) -> usize {
        self.0.size()
    }
}
