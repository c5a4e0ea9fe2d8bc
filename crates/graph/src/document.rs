use crate::{DataGraph, Graph, GraphError, ItemData, ItemType};
use serde::{Deserialize, Serialize};

/// Plain serde view of a graph
///
/// This is an interchange shape for tools and script functions, not a
/// storage format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
    #[serde(default)]
    pub edges: Vec<EdgeDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub id: String,
    #[serde(default)]
    pub attributes: ItemData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    /// Generated from the edge position when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub attributes: ItemData,
}

impl GraphDocument {
    pub fn from_graph(graph: &dyn Graph) -> Self {
        let nodes = graph
            .node_ids()
            .map(|id| NodeDocument {
                id: id.to_string(),
                attributes: graph
                    .item_data(ItemType::Nodes, id)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();
        let edges = graph
            .edge_ids()
            .filter_map(|id| {
                let (source, target) = graph.extremities(id)?;
                Some(EdgeDocument {
                    id: Some(id.to_string()),
                    source: source.to_string(),
                    target: target.to_string(),
                    attributes: graph
                        .item_data(ItemType::Edges, id)
                        .cloned()
                        .unwrap_or_default(),
                })
            })
            .collect();
        Self { nodes, edges }
    }
}

impl TryFrom<GraphDocument> for DataGraph {
    type Error = GraphError;

    fn try_from(document: GraphDocument) -> Result<Self, Self::Error> {
        let mut graph = DataGraph::new();
        for node in document.nodes {
            graph.add_node(node.id, node.attributes)?;
        }
        for (position, edge) in document.edges.into_iter().enumerate() {
            let id = edge.id.unwrap_or_else(|| format!("e{position}"));
            graph.add_edge(id, &edge.source, &edge.target, edge.attributes)?;
        }
        Ok(graph)
    }
}
