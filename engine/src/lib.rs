//! Dataflow graph runtime for the artograph editor.
//!
//! A directed, mutable graph of typed nodes, evaluated lazily once per
//! external tick: `Graph::run` pulls dirty upstream nodes first, memoizes
//! within the call, and survives feedback cycles. Topology is guarded by
//! typed-pin compatibility checks and schema locking; graphs round-trip
//! through a versioned JSON document via a node kind registry.

pub mod builtin;
pub mod error;
pub mod event;
pub mod graph;
pub mod kind;
pub mod model;
pub mod registry;
pub mod serialize;

pub use error::GraphError;
pub use event::GraphEvent;
pub use graph::Graph;
pub use kind::{Inputs, KindHandle, LinkSide, NodeKind, PinValues};
pub use model::{
    AudioHandle, Connection, Node, NodeId, NodeSchema, Pin, PinDataType, PinDefinition, PinRef,
    PinValue, TextureHandle,
};
pub use registry::NodeRegistry;
pub use serialize::{GraphDocument, GRAPH_SCHEMA_VERSION};
