use crate::{Graph, GraphSnapshot, ItemData, ItemType, Scalar};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::Direction;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0:?} already exists")]
    DuplicateNode(String),

    #[error("edge {0:?} already exists")]
    DuplicateEdge(String),

    #[error("{item_type} item {id:?} doesn't exist")]
    NotFound { item_type: ItemType, id: String },
}

/// In-memory attributed directed graph
///
/// Item ids are stored as petgraph weights so that enumeration follows the
/// stable index order, which is the insertion order as long as nothing was
/// removed.
#[derive(Debug, Clone, Default)]
pub struct DataGraph {
    graph: StableDiGraph<String, String>,
    nodes: HashMap<String, (NodeIndex, ItemData)>,
    edges: HashMap<String, (EdgeIndex, ItemData)>,
}

impl DataGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: impl Into<String>, data: ItemData) -> Result<(), GraphError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let index = self.graph.add_node(id.clone());
        self.nodes.insert(id, (index, data));
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        id: impl Into<String>,
        source: &str,
        target: &str,
        data: ItemData,
    ) -> Result<(), GraphError> {
        let id = id.into();
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateEdge(id));
        }
        let source = self.node_index(source)?;
        let target = self.node_index(target)?;
        let index = self.graph.add_edge(source, target, id.clone());
        self.edges.insert(id, (index, data));
        Ok(())
    }

    /// Remove a node along with all its incident edges
    pub fn remove_node(&mut self, id: &str) -> Result<(), GraphError> {
        let index = self.node_index(id)?;
        let incident: Vec<String> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().clone())
            .collect();
        for edge in incident {
            trace!("Dropping edge {edge} incident to {id}");
            self.edges.remove(&edge);
        }
        self.graph.remove_node(index);
        self.nodes.remove(id);
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        item_type: ItemType,
        id: &str,
        field: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> Result<(), GraphError> {
        let data = match item_type {
            ItemType::Nodes => self.nodes.get_mut(id).map(|(_, data)| data),
            ItemType::Edges => self.edges.get_mut(id).map(|(_, data)| data),
        };
        let data = data.ok_or_else(|| GraphError::NotFound {
            item_type,
            id: id.to_string(),
        })?;
        data.insert(field.into(), value.into());
        Ok(())
    }

    /// Freeze a copy of this graph for a background computation
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::from(self.clone())
    }

    fn node_index(&self, id: &str) -> Result<NodeIndex, GraphError> {
        self.nodes
            .get(id)
            .map(|(index, _)| *index)
            .ok_or_else(|| GraphError::NotFound {
                item_type: ItemType::Nodes,
                id: id.to_string(),
            })
    }
}

impl Graph for DataGraph {
    fn node_ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        let graph = &self.graph;
        Box::new(graph.node_indices().map(move |i| graph[i].as_str()))
    }

    fn edge_ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        let graph = &self.graph;
        Box::new(graph.edge_indices().map(move |i| graph[i].as_str()))
    }

    fn item_data(&self, item_type: ItemType, id: &str) -> Option<&ItemData> {
        match item_type {
            ItemType::Nodes => self.nodes.get(id).map(|(_, data)| data),
            ItemType::Edges => self.edges.get(id).map(|(_, data)| data),
        }
    }

    fn extremities(&self, edge: &str) -> Option<(&str, &str)> {
        let (index, _) = self.edges.get(edge)?;
        let (source, target) = self.graph.edge_endpoints(*index)?;
        Some((self.graph[source].as_str(), self.graph[target].as_str()))
    }

    fn order(&self) -> usize {
        self.graph.node_count()
    }

    fn size(&self) -> usize {
        self.graph.edge_count()
    }
}
