//! Runtime node entity: pins, schema locking, and kind dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::kind::{KindHandle, NodeKind};
use crate::model::pin::{Pin, PinValue};
use crate::model::schema::NodeSchema;

/// Identifier assigned by the graph on attach.
///
/// Ids increase monotonically and are never reused within a graph's
/// lifetime, even across detach or clear.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node in the dataflow graph.
///
/// Holds the runtime pin state and dispatches behavior to its kind handle.
/// Constructed detached; the graph assigns an id on attach and clears it on
/// detach.
pub struct Node {
    pub(crate) id: Option<NodeId>,
    type_name: String,
    /// Display name, taken from the schema.
    pub name: String,
    pub(crate) inputs: Vec<Pin>,
    pub(crate) outputs: Vec<Pin>,
    /// Free-form presentation data owned by the editor; round-tripped
    /// through serialization, opaque to the engine.
    pub meta: serde_json::Value,
    /// Number of live connections forbidding schema mutation.
    pub(crate) schema_lock_count: u32,
    /// Set when a link was added or removed since the last computation.
    pub(crate) links_changed: bool,
    kind: KindHandle,
}

impl Node {
    /// Wrap a freshly constructed kind.
    pub fn new(kind: impl NodeKind + 'static) -> Self {
        Self::from_kind(Rc::new(RefCell::new(kind)))
    }

    /// Build a node around an existing kind handle (shared singleton kinds
    /// arrive this way from the registry).
    pub fn from_kind(kind: KindHandle) -> Self {
        let (type_name, schema) = {
            let k = kind.borrow();
            (k.type_name().to_string(), k.schema())
        };
        let mut node = Self {
            id: None,
            type_name,
            name: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            meta: serde_json::Value::Null,
            schema_lock_count: 0,
            links_changed: false,
            kind,
        };
        node.apply_schema(schema);
        node
    }

    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn kind(&self) -> &KindHandle {
        &self.kind
    }

    pub fn inputs(&self) -> &[Pin] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Pin] {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub(crate) fn input_mut(&mut self, name: &str) -> Option<&mut Pin> {
        self.inputs.iter_mut().find(|p| p.name == name)
    }

    pub(crate) fn output_mut(&mut self, name: &str) -> Option<&mut Pin> {
        self.outputs.iter_mut().find(|p| p.name == name)
    }

    /// Source node and pin currently feeding the named input, if linked.
    pub fn input_link(&self, name: &str) -> Option<(NodeId, &str)> {
        self.input(name)
            .and_then(|p| p.link.as_ref())
            .map(|l| (l.source_node, l.source_pin.as_str()))
    }

    pub fn is_schema_locked(&self) -> bool {
        self.schema_lock_count > 0
    }

    /// Whether any pin of this node has a live connection.
    pub fn has_connections(&self) -> bool {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .any(Pin::is_connected)
    }

    pub(crate) fn lock_schema(&mut self) {
        self.schema_lock_count += 1;
    }

    pub(crate) fn unlock_schema(&mut self) {
        debug_assert!(self.schema_lock_count > 0);
        self.schema_lock_count = self.schema_lock_count.saturating_sub(1);
    }

    /// Replace the node's pin layout with `new_schema`.
    ///
    /// Fails without touching anything when the schema is locked by active
    /// connections, when a connected pin would disappear, or when a
    /// connected pin would change type. Pins whose name and type survive
    /// keep their value, version, and link state; genuinely new pins start
    /// fresh.
    pub fn update_schema(&mut self, new_schema: NodeSchema) -> Result<(), GraphError> {
        if self.schema_lock_count > 0 {
            return Err(GraphError::SchemaLocked(self.name.clone()));
        }

        for (current, new_defs) in [
            (&self.inputs, &new_schema.inputs),
            (&self.outputs, &new_schema.outputs),
        ] {
            for pin in current.iter().filter(|p| p.is_connected()) {
                match new_defs.iter().find(|d| d.name == pin.name) {
                    None => return Err(GraphError::PinRemovalForbidden(pin.name.clone())),
                    Some(def) if def.data_type != pin.data_type => {
                        return Err(GraphError::PinTypeChangeForbidden(pin.name.clone()));
                    }
                    Some(_) => {}
                }
            }
        }

        self.apply_schema(new_schema);
        Ok(())
    }

    fn apply_schema(&mut self, schema: NodeSchema) {
        let rebuild = |old: &mut Vec<Pin>, defs: &[crate::model::pin::PinDefinition]| {
            let previous = std::mem::take(old);
            *old = defs
                .iter()
                .map(|def| {
                    match previous
                        .iter()
                        .find(|p| p.name == def.name && p.data_type == def.data_type)
                    {
                        Some(kept) => kept.clone(),
                        None => Pin::from_definition(def),
                    }
                })
                .collect();
        };
        rebuild(&mut self.inputs, &schema.inputs);
        rebuild(&mut self.outputs, &schema.outputs);
        self.name = schema.name;
    }

    /// Publish a computed output value.
    ///
    /// The version counter only advances when the published value can have
    /// changed: plain payloads (scalar, text) are compared, while handle
    /// payloads always count as new, since a handle with the same id may
    /// point at different resource contents every tick.
    pub fn set_output(&mut self, name: &str, value: PinValue) -> Result<(), GraphError> {
        let pin = self
            .output_mut(name)
            .ok_or_else(|| GraphError::InvalidOutput(name.to_string()))?;
        if Self::payload_changed(&pin.value, &value) {
            pin.set_value(value);
        }
        Ok(())
    }

    /// Set the standing literal value of an unconnected input.
    pub fn set_input_value(&mut self, name: &str, value: PinValue) -> Result<(), GraphError> {
        let pin = self
            .input_mut(name)
            .ok_or_else(|| GraphError::InvalidInput(name.to_string()))?;
        if Self::payload_changed(&pin.value, &value) {
            pin.set_value(value);
        }
        Ok(())
    }

    fn payload_changed(old: &PinValue, new: &PinValue) -> bool {
        match (old, new) {
            (PinValue::Scalar(a), PinValue::Scalar(b)) => a != b,
            (PinValue::Text(a), PinValue::Text(b)) => a != b,
            (PinValue::None, PinValue::None) => false,
            _ => true,
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("schema_lock_count", &self.schema_lock_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Inputs, PinValues};
    use crate::model::pin::{PinDataType, PinDefinition};

    struct ProbeKind;

    impl NodeKind for ProbeKind {
        fn type_name(&self) -> &'static str {
            "Probe"
        }

        fn schema(&self) -> NodeSchema {
            NodeSchema::new("Probe")
                .with_input(
                    PinDefinition::new("in", "Input", PinDataType::Scalar)
                        .with_default(PinValue::Scalar(1.0)),
                )
                .with_output(PinDefinition::new("out", "Output", PinDataType::Scalar))
        }

        fn compute(&mut self, inputs: &Inputs) -> PinValues {
            let mut out = PinValues::new();
            out.insert("out".into(), PinValue::Scalar(-inputs.scalar("in", 0.0)));
            out
        }
    }

    fn wider_schema() -> NodeSchema {
        NodeSchema::new("Probe")
            .with_input(
                PinDefinition::new("in", "Input", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(1.0)),
            )
            .with_input(PinDefinition::new("extra", "Extra", PinDataType::Text))
            .with_output(PinDefinition::new("out", "Output", PinDataType::Scalar))
    }

    #[test]
    fn test_schema_applied_on_construction() {
        let node = Node::new(ProbeKind);
        assert_eq!(node.name, "Probe");
        assert_eq!(node.inputs().len(), 1);
        assert_eq!(node.input("in").unwrap().value.as_scalar(0.0), 1.0);
        assert!(node.id().is_none());
    }

    #[test]
    fn test_update_schema_grows_pins() {
        let mut node = Node::new(ProbeKind);
        node.set_input_value("in", PinValue::Scalar(5.0)).unwrap();
        node.update_schema(wider_schema()).unwrap();
        assert_eq!(node.inputs().len(), 2);
        // Retained pin keeps its value and version
        assert_eq!(node.input("in").unwrap().value.as_scalar(0.0), 5.0);
        assert_eq!(node.input("in").unwrap().version, 1);
        // New pin starts fresh
        assert_eq!(node.input("extra").unwrap().version, 0);
    }

    #[test]
    fn test_update_schema_fails_when_locked() {
        let mut node = Node::new(ProbeKind);
        node.lock_schema();
        let err = node.update_schema(wider_schema()).unwrap_err();
        assert!(matches!(err, GraphError::SchemaLocked(_)));
        assert_eq!(node.inputs().len(), 1);
        node.unlock_schema();
        assert!(node.update_schema(wider_schema()).is_ok());
    }

    #[test]
    fn test_update_schema_forbids_removing_connected_pin() {
        let mut node = Node::new(ProbeKind);
        node.input_mut("in").unwrap().connection_count = 1;
        let slim = NodeSchema::new("Probe")
            .with_output(PinDefinition::new("out", "Output", PinDataType::Scalar));
        let err = node.update_schema(slim).unwrap_err();
        assert!(matches!(err, GraphError::PinRemovalForbidden(name) if name == "in"));
        // Current schema untouched
        assert_eq!(node.inputs().len(), 1);
    }

    #[test]
    fn test_update_schema_forbids_retyping_connected_pin() {
        let mut node = Node::new(ProbeKind);
        node.input_mut("in").unwrap().connection_count = 1;
        let retyped = NodeSchema::new("Probe")
            .with_input(PinDefinition::new("in", "Input", PinDataType::Text))
            .with_output(PinDefinition::new("out", "Output", PinDataType::Scalar));
        let err = node.update_schema(retyped).unwrap_err();
        assert!(matches!(err, GraphError::PinTypeChangeForbidden(name) if name == "in"));
        assert_eq!(node.input("in").unwrap().data_type, PinDataType::Scalar);
    }

    #[test]
    fn test_set_output_skips_version_bump_for_equal_scalar() {
        let mut node = Node::new(ProbeKind);
        node.set_output("out", PinValue::Scalar(3.0)).unwrap();
        node.set_output("out", PinValue::Scalar(3.0)).unwrap();
        assert_eq!(node.output("out").unwrap().version, 1);
        node.set_output("out", PinValue::Scalar(4.0)).unwrap();
        assert_eq!(node.output("out").unwrap().version, 2);
    }

    #[test]
    fn test_set_output_always_bumps_for_handles() {
        use crate::model::pin::TextureHandle;

        struct TexKind;
        impl NodeKind for TexKind {
            fn type_name(&self) -> &'static str {
                "Tex"
            }
            fn schema(&self) -> NodeSchema {
                NodeSchema::new("Tex")
                    .with_output(PinDefinition::new("image", "Image", PinDataType::Texture))
            }
            fn compute(&mut self, _inputs: &Inputs) -> PinValues {
                PinValues::new()
            }
        }

        let mut node = Node::new(TexKind);
        node.set_output("image", PinValue::Texture(TextureHandle(7)))
            .unwrap();
        node.set_output("image", PinValue::Texture(TextureHandle(7)))
            .unwrap();
        assert_eq!(node.output("image").unwrap().version, 2);
    }

    #[test]
    fn test_set_output_unknown_pin() {
        let mut node = Node::new(ProbeKind);
        let err = node.set_output("nope", PinValue::Scalar(0.0)).unwrap_err();
        assert!(matches!(err, GraphError::InvalidOutput(_)));
    }
}
