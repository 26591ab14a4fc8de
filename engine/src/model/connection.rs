//! Connection model for the dataflow graph.

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Identifies a specific pin on a specific node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PinRef {
    pub node_id: NodeId,
    pub pin_name: String,
}

impl PinRef {
    pub fn new(node_id: NodeId, pin_name: &str) -> Self {
        Self {
            node_id,
            pin_name: pin_name.to_string(),
        }
    }
}

/// A directed link between two pins (an edge in the dataflow graph).
///
/// This is the authoritative record, owned by the graph. Each connection is
/// mirrored by exactly one [`Link`] on the target input pin.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Connection {
    /// Source pin (output)
    pub from: PinRef,
    /// Destination pin (input)
    pub to: PinRef,
}

impl Connection {
    pub fn new(from: PinRef, to: PinRef) -> Self {
        Self { from, to }
    }
}

/// Per-pin mirror of a connection, stored on the target input pin.
///
/// Evaluation walks links, not the graph's connection list: resolving an
/// input is a direct hop to the feeding output. `last_seen` records the
/// source pin's version the last time this input consumed it, which is what
/// makes change detection independent of value equality.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    /// Node owning the feeding output pin.
    pub source_node: NodeId,
    /// Name of the feeding output pin.
    pub source_pin: String,
    /// Source pin version consumed on the owning node's last computation.
    pub last_seen: Option<u64>,
}

impl Link {
    pub fn new(source_node: NodeId, source_pin: &str) -> Self {
        Self {
            source_node,
            source_pin: source_pin.to_string(),
            last_seen: None,
        }
    }
}
