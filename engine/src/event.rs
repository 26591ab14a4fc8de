//! Typed topology events emitted by the graph.
//!
//! The embedding UI drains these once per frame via [`Graph::poll_event`]
//! instead of installing callbacks; the engine never consumes them itself.
//!
//! [`Graph::poll_event`]: crate::graph::Graph::poll_event

use crate::model::{Connection, NodeId};

/// A topology or schema change observed on the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
    /// A node was attached and received its id.
    NodeAttached { node: NodeId },
    /// A node was detached; its id is retired.
    NodeDetached { node: NodeId },
    /// A connection was installed.
    NodeConnected { connection: Connection },
    /// A connection was removed.
    NodeDisconnected { connection: Connection },
    /// A node's pin layout was replaced.
    SchemaUpdated { node: NodeId },
}
