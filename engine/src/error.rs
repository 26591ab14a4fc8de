use thiserror::Error;

use crate::model::NodeId;
use crate::model::PinDataType;

/// Errors raised by graph topology, schema, and persistence operations.
///
/// Every operation validates its arguments fully before touching any state,
/// so a returned error always leaves the graph unchanged.
#[derive(Error, Debug)]
pub enum GraphError {
    // --- Topology ---
    #[error("Invalid node id {0}")]
    InvalidNode(NodeId),
    #[error("Node is already attached")]
    AlreadyAttached,
    #[error("Node {0} is not attached to the graph")]
    NotAttached(NodeId),
    #[error("Node {0} still has active connections")]
    NodeStillConnected(NodeId),

    // --- Connections ---
    #[error("Source node {0} is not attached to the graph")]
    SourceNotAttached(NodeId),
    #[error("Target node {0} is not attached to the graph")]
    TargetNotAttached(NodeId),
    #[error("Node {0} cannot be connected to itself")]
    SelfConnection(NodeId),
    #[error("Invalid output \"{0}\"")]
    InvalidOutput(String),
    #[error("Invalid input \"{0}\"")]
    InvalidInput(String),
    #[error("Connection {source_pin}:{source_type}=>{target_pin}:{target_type} is not possible")]
    TypeMismatch {
        source_pin: String,
        source_type: PinDataType,
        target_pin: String,
        target_type: PinDataType,
    },
    #[error("Input \"{0}\" is already connected")]
    InputAlreadyConnected(String),
    #[error("Connection {source_pin}=>{target_pin} doesn't exist")]
    ConnectionNotFound {
        source_pin: String,
        target_pin: String,
    },

    // --- Schema ---
    #[error("Schema of node \"{0}\" is locked by active connections")]
    SchemaLocked(String),
    #[error("Cannot remove connected pin \"{0}\" from schema")]
    PinRemovalForbidden(String),
    #[error("Cannot change type of connected pin \"{0}\"")]
    PinTypeChangeForbidden(String),

    // --- Registry / serialization ---
    #[error("Unknown node type \"{0}\"")]
    UnknownNodeType(String),
    #[error("Expected graph document version {expected}, got {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Corrupt graph document: {0}")]
    CorruptGraphDocument(#[source] Box<GraphError>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
