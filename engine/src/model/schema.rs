//! Node schema: the declared pin layout of a node.

use super::pin::PinDefinition;

/// Declared pin layout of a node: a display name plus ordered, named input
/// and output definitions.
///
/// Built by node kinds at construction time and replaced wholesale through
/// `Node::update_schema` for kinds whose layout can change (e.g. a mixer
/// growing channels).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct NodeSchema {
    /// Display name of the node (e.g. "Oscillator")
    pub name: String,
    /// Input pin definitions, in display order
    pub inputs: Vec<PinDefinition>,
    /// Output pin definitions, in display order
    pub outputs: Vec<PinDefinition>,
}

impl NodeSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, def: PinDefinition) -> Self {
        self.inputs.push(def);
        self
    }

    pub fn with_output(mut self, def: PinDefinition) -> Self {
        self.outputs.push(def);
        self
    }

    pub fn input(&self, name: &str) -> Option<&PinDefinition> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&PinDefinition> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pin::PinDataType;

    #[test]
    fn test_lookup_by_name() {
        let schema = NodeSchema::new("Summator")
            .with_input(PinDefinition::new("a", "Value 1", PinDataType::Scalar))
            .with_input(PinDefinition::new("b", "Value 2", PinDataType::Scalar))
            .with_output(PinDefinition::new("c", "Result", PinDataType::Scalar));
        assert!(schema.input("a").is_some());
        assert!(schema.input("c").is_none());
        assert_eq!(schema.output("c").unwrap().display_name, "Result");
    }
}
