//! Graph capability consumed by the layout framework
//!
//! Layout algorithms never see a concrete graph type. They work against the
//! [`Graph`] trait, which only exposes what positioning needs: node and edge
//! enumeration, per-item attribute lookup and edge extremities.
//!
//! [`DataGraph`] is an insertion-ordered in-memory implementation backed by
//! petgraph, and [`GraphSnapshot`] is the immutable shared copy handed to
//! background workers.

mod data_graph;
mod document;
mod fields;
mod scalar;
mod snapshot;

pub use data_graph::{DataGraph, GraphError};
pub use document::{EdgeDocument, GraphDocument, NodeDocument};
pub use fields::FieldStats;
pub use scalar::{ItemData, ItemType, Scalar};
pub use snapshot::GraphSnapshot;

/// Read-only view over an attributed graph
///
/// Node and edge ids are unique strings. Enumeration order is stable for a
/// given graph value and is the order script functions receive as `index`.
pub trait Graph {
    /// Enumerate node ids
    fn node_ids(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Enumerate edge ids
    fn edge_ids(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Attribute mapping of a node or edge, `None` if the item doesn't exist
    fn item_data(&self, item_type: ItemType, id: &str) -> Option<&ItemData>;

    /// Source and target node ids of an edge
    fn extremities(&self, edge: &str) -> Option<(&str, &str)>;

    fn order(&self) -> usize {
        self.node_ids().count()
    }

    fn size(&self) -> usize {
        self.edge_ids().count()
    }

    fn has_node(&self, id: &str) -> bool {
        self.item_data(ItemType::Nodes, id).is_some()
    }

    /// Ids of all items of the given type
    fn item_ids(&self, item_type: ItemType) -> Box<dyn Iterator<Item = &str> + '_> {
        match item_type {
            ItemType::Nodes => self.node_ids(),
            ItemType::Edges => self.edge_ids(),
        }
    }

    /// Look up a single attribute value
    fn attribute(&self, item_type: ItemType, id: &str, field: &str) -> Option<&Scalar> {
        self.item_data(item_type, id)?.get(field)
    }
}
