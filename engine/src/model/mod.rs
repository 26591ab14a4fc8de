//! Data model for the dataflow graph: pins, schemas, nodes, connections.

pub mod connection;
pub mod node;
pub mod pin;
pub mod schema;

pub use connection::{Connection, Link, PinRef};
pub use node::{Node, NodeId};
pub use pin::{AudioHandle, Pin, PinDataType, PinDefinition, PinValue, TextureHandle};
pub use schema::NodeSchema;
