//! Versioned graph persistence.
//!
//! A [`GraphDocument`] is a plain, JSON-compatible description of a graph's
//! topology plus per-node state. Node instances are reconstructed through a
//! [`NodeRegistry`]; document ids are transient and remapped to fresh
//! runtime ids on load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphError;
use crate::graph::Graph;
use crate::model::{Node, NodeId};
use crate::registry::NodeRegistry;

/// Current document schema version. Mismatched documents are rejected
/// outright; there is no migration.
pub const GRAPH_SCHEMA_VERSION: u32 = 1;

/// Persisted description of one node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NodeDocument {
    pub id: u64,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub meta: Value,
    /// Kind-specific persisted fields, flattened beside the fixed ones.
    #[serde(flatten)]
    pub state: Map<String, Value>,
}

/// Persisted description of a whole graph.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GraphDocument {
    pub version: u32,
    #[serde(default)]
    pub meta: Value,
    pub nodes: Vec<NodeDocument>,
    /// `[sourceId, sourcePin, targetId, targetPin]` per connection.
    pub connections: Vec<(u64, String, u64, String)>,
}

/// Capture a graph's topology and node state.
pub fn serialize(graph: &Graph) -> GraphDocument {
    GraphDocument {
        version: GRAPH_SCHEMA_VERSION,
        meta: graph.meta.clone(),
        nodes: graph.nodes().iter().map(describe).collect(),
        connections: graph
            .connections()
            .iter()
            .map(|c| {
                (
                    c.from.node_id.raw(),
                    c.from.pin_name.clone(),
                    c.to.node_id.raw(),
                    c.to.pin_name.clone(),
                )
            })
            .collect(),
    }
}

fn describe(node: &Node) -> NodeDocument {
    NodeDocument {
        id: node.id().map(NodeId::raw).unwrap_or_default(),
        type_name: node.type_name().to_string(),
        meta: node.meta.clone(),
        state: node.kind().borrow().save_state(),
    }
}

/// Rebuild `graph` from a document.
///
/// The graph is cleared first; nodes are constructed through `registry`,
/// their kind state restored, and connections replayed through
/// [`Graph::connect`]. A document that was valid at save time replays
/// cleanly, so any replay failure is reported as [`GraphError::CorruptGraphDocument`].
pub fn deserialize(
    document: &GraphDocument,
    graph: &mut Graph,
    registry: &NodeRegistry,
) -> Result<(), GraphError> {
    if document.version != GRAPH_SCHEMA_VERSION {
        return Err(GraphError::VersionMismatch {
            expected: GRAPH_SCHEMA_VERSION,
            found: document.version,
        });
    }

    graph.clear();

    let mut id_map: HashMap<u64, NodeId> = HashMap::new();
    for node_doc in &document.nodes {
        let mut node = registry.create(&node_doc.type_name)?;
        {
            let kind = node.kind().clone();
            kind.borrow_mut()
                .restore_state(&node_doc.state)
                .map_err(corrupt)?;
            // Restored state may imply a different pin layout (e.g. a mixer
            // with a saved channel count), so re-derive the schema.
            let schema = kind.borrow().schema();
            node.update_schema(schema).map_err(corrupt)?;
        }
        node.meta = node_doc.meta.clone();
        let id = graph.attach_node(node).map_err(corrupt)?;
        id_map.insert(node_doc.id, id);
    }

    for (from_id, from_pin, to_id, to_pin) in &document.connections {
        let source = *id_map
            .get(from_id)
            .ok_or_else(|| corrupt(GraphError::InvalidNode(NodeId(*from_id))))?;
        let target = *id_map
            .get(to_id)
            .ok_or_else(|| corrupt(GraphError::InvalidNode(NodeId(*to_id))))?;
        graph
            .connect(source, from_pin, target, to_pin)
            .map_err(corrupt)?;
    }

    graph.meta = document.meta.clone();
    Ok(())
}

fn corrupt(err: GraphError) -> GraphError {
    GraphError::CorruptGraphDocument(Box::new(err))
}

/// Serialize a graph to pretty JSON.
pub fn save_to_string(graph: &Graph) -> Result<String, GraphError> {
    Ok(serde_json::to_string_pretty(&serialize(graph))?)
}

/// Load a JSON document into `graph`.
pub fn load_from_str(
    json: &str,
    graph: &mut Graph,
    registry: &NodeRegistry,
) -> Result<(), GraphError> {
    let document: GraphDocument = serde_json::from_str(json)?;
    deserialize(&document, graph, registry)
}
