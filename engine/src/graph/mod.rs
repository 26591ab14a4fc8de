//! The graph: topology integrity and evaluation scheduling.

mod eval;

use std::collections::VecDeque;

use log::debug;

use crate::error::GraphError;
use crate::event::GraphEvent;
use crate::kind::LinkSide;
use crate::model::{Connection, Link, Node, NodeId, NodeSchema, PinRef, PinValue};

/// A directed, mutable graph of typed computational nodes.
///
/// Owns the attached nodes and the authoritative connection list. Every
/// mutating operation validates fully before touching state, so a failed
/// call leaves the graph unchanged. Topology edits and evaluation must not
/// interleave within a tick; the embedding application serializes them.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    /// Free-form graph-level presentation data, round-tripped through
    /// serialization.
    pub meta: serde_json::Value,
    next_id: u64,
    events: VecDeque<GraphEvent>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in attach order (display order, not evaluation order).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == Some(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == Some(id))
    }

    /// The authoritative connection list.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Pop the next pending topology event, if any. The embedding UI drains
    /// this once per frame.
    pub fn poll_event(&mut self) -> Option<GraphEvent> {
        self.events.pop_front()
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == Some(id))
    }

    /// Classify a node id: attached index, detached-but-known, or never
    /// issued by this graph.
    fn lookup(&self, id: NodeId) -> Result<usize, GraphError> {
        match self.index_of(id) {
            Some(index) => Ok(index),
            None if id.0 < self.next_id => Err(GraphError::NotAttached(id)),
            None => Err(GraphError::InvalidNode(id)),
        }
    }

    /// Attach a detached node, assigning it a fresh id.
    pub fn attach_node(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        if node.id.is_some() {
            return Err(GraphError::AlreadyAttached);
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = Some(id);
        debug!("Graph: attached '{}' node as {}", node.type_name(), id);
        self.nodes.push(node);
        self.events.push_back(GraphEvent::NodeAttached { node: id });
        Ok(id)
    }

    /// Detach a node with no remaining connections, returning it to the
    /// caller with its id cleared.
    pub fn detach_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let index = self.lookup(id)?;
        if self
            .connections
            .iter()
            .any(|c| c.from.node_id == id || c.to.node_id == id)
        {
            return Err(GraphError::NodeStillConnected(id));
        }
        let mut node = self.nodes.remove(index);
        node.id = None;
        debug!("Graph: detached node {}", id);
        self.events.push_back(GraphEvent::NodeDetached { node: id });
        Ok(node)
    }

    /// Install a connection from `source`'s output pin to `target`'s input
    /// pin.
    ///
    /// Validates, in order: both endpoints attached, no self-connection,
    /// output exists, input exists, matching pin types, input free. On
    /// success locks both schemas, notifies both kinds, installs the input's
    /// link mirror, and appends the authoritative record.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_pin: &str,
        target: NodeId,
        target_pin: &str,
    ) -> Result<Connection, GraphError> {
        let src_index = self
            .index_of(source)
            .ok_or(GraphError::SourceNotAttached(source))?;
        let tgt_index = self
            .index_of(target)
            .ok_or(GraphError::TargetNotAttached(target))?;
        if source == target {
            return Err(GraphError::SelfConnection(source));
        }
        let source_type = self.nodes[src_index]
            .output(source_pin)
            .ok_or_else(|| GraphError::InvalidOutput(source_pin.to_string()))?
            .data_type;
        let (target_type, occupied) = {
            let pin = self.nodes[tgt_index]
                .input(target_pin)
                .ok_or_else(|| GraphError::InvalidInput(target_pin.to_string()))?;
            (pin.data_type, pin.link.is_some())
        };
        if source_type != target_type {
            return Err(GraphError::TypeMismatch {
                source_pin: source_pin.to_string(),
                source_type,
                target_pin: target_pin.to_string(),
                target_type,
            });
        }
        if occupied {
            return Err(GraphError::InputAlreadyConnected(target_pin.to_string()));
        }

        let connection = Connection::new(
            PinRef::new(source, source_pin),
            PinRef::new(target, target_pin),
        );

        self.nodes[src_index].lock_schema();
        self.nodes[tgt_index].lock_schema();

        let src_kind = self.nodes[src_index].kind().clone();
        let tgt_kind = self.nodes[tgt_index].kind().clone();
        src_kind
            .borrow_mut()
            .on_before_connect(LinkSide::Source, &connection);
        tgt_kind
            .borrow_mut()
            .on_before_connect(LinkSide::Target, &connection);

        if let Some(pin) = self.nodes[src_index].output_mut(source_pin) {
            pin.connection_count += 1;
        }
        if let Some(pin) = self.nodes[tgt_index].input_mut(target_pin) {
            pin.connection_count += 1;
            pin.link = Some(Link::new(source, source_pin));
        }
        self.nodes[tgt_index].links_changed = true;

        debug!(
            "Graph: connected {}.{} => {}.{}",
            source, source_pin, target, target_pin
        );
        self.connections.push(connection.clone());
        self.events.push_back(GraphEvent::NodeConnected {
            connection: connection.clone(),
        });
        Ok(connection)
    }

    /// [`connect`](Self::connect) accepting a prepared connection record.
    pub fn add_connection(&mut self, connection: &Connection) -> Result<Connection, GraphError> {
        self.connect(
            connection.from.node_id,
            &connection.from.pin_name,
            connection.to.node_id,
            &connection.to.pin_name,
        )
    }

    /// Remove the connection between the given pins.
    pub fn disconnect(
        &mut self,
        source: NodeId,
        source_pin: &str,
        target: NodeId,
        target_pin: &str,
    ) -> Result<(), GraphError> {
        let tgt_index = self
            .index_of(target)
            .ok_or(GraphError::TargetNotAttached(target))?;
        let matches = {
            let pin = self.nodes[tgt_index]
                .input(target_pin)
                .ok_or_else(|| GraphError::InvalidInput(target_pin.to_string()))?;
            pin.link
                .as_ref()
                .is_some_and(|l| l.source_node == source && l.source_pin == source_pin)
        };
        if !matches {
            return Err(GraphError::ConnectionNotFound {
                source_pin: source_pin.to_string(),
                target_pin: target_pin.to_string(),
            });
        }
        let src_index = self
            .index_of(source)
            .ok_or(GraphError::SourceNotAttached(source))?;

        let connection = Connection::new(
            PinRef::new(source, source_pin),
            PinRef::new(target, target_pin),
        );

        self.nodes[src_index].unlock_schema();
        self.nodes[tgt_index].unlock_schema();

        let src_kind = self.nodes[src_index].kind().clone();
        let tgt_kind = self.nodes[tgt_index].kind().clone();
        src_kind
            .borrow_mut()
            .on_before_disconnect(LinkSide::Source, &connection);
        tgt_kind
            .borrow_mut()
            .on_before_disconnect(LinkSide::Target, &connection);

        if let Some(pin) = self.nodes[tgt_index].input_mut(target_pin) {
            pin.link = None;
            pin.connection_count = pin.connection_count.saturating_sub(1);
            pin.reset_to_default();
        }
        if let Some(pin) = self.nodes[src_index].output_mut(source_pin) {
            pin.connection_count = pin.connection_count.saturating_sub(1);
        }
        self.nodes[tgt_index].links_changed = true;

        debug!(
            "Graph: disconnected {}.{} => {}.{}",
            source, source_pin, target, target_pin
        );
        self.connections.retain(|c| c != &connection);
        self.events
            .push_back(GraphEvent::NodeDisconnected { connection });
        Ok(())
    }

    /// [`disconnect`](Self::disconnect) accepting a connection record.
    pub fn remove_connection(&mut self, connection: &Connection) -> Result<(), GraphError> {
        self.disconnect(
            connection.from.node_id,
            &connection.from.pin_name,
            connection.to.node_id,
            &connection.to.pin_name,
        )
    }

    /// Disconnect everything and drop all nodes. Used before loading a
    /// serialized graph into an existing instance. Retired ids are not
    /// reused.
    pub fn clear(&mut self) {
        while let Some(connection) = self.connections.last().cloned() {
            if self.remove_connection(&connection).is_err() {
                // A record without a matching link mirror means the two
                // stores went out of sync; drop the record instead of
                // spinning.
                debug_assert!(false, "connection list and pin links out of sync");
                self.connections.pop();
            }
        }
        let detached: Vec<NodeId> = self.nodes.iter().filter_map(|n| n.id).collect();
        self.nodes.clear();
        for id in detached {
            self.events.push_back(GraphEvent::NodeDetached { node: id });
        }
    }

    /// Set the standing literal value of an unconnected input pin.
    pub fn set_input_value(
        &mut self,
        node: NodeId,
        pin: &str,
        value: PinValue,
    ) -> Result<(), GraphError> {
        let index = self.lookup(node)?;
        self.nodes[index].set_input_value(pin, value)
    }

    /// Replace a node's pin layout, observing the schema locking rules, and
    /// announce the change.
    pub fn update_node_schema(
        &mut self,
        node: NodeId,
        schema: NodeSchema,
    ) -> Result<(), GraphError> {
        let index = self.lookup(node)?;
        self.nodes[index].update_schema(schema)?;
        self.events.push_back(GraphEvent::SchemaUpdated { node });
        Ok(())
    }
}
