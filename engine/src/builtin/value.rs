//! Constant scalar source.

use serde_json::{json, Map, Value};

use crate::error::GraphError;
use crate::kind::{Inputs, NodeKind, PinValues};
use crate::model::{NodeSchema, PinDataType, PinDefinition, PinValue};

/// Emits a constant scalar on its `value` output.
///
/// Being input-free it is revisited every tick, but the output version only
/// advances when [`set_value`](Self::set_value) actually changes the number,
/// so downstream nodes stay clean.
pub struct ValueNode {
    value: f64,
}

impl ValueNode {
    pub const TYPE_NAME: &'static str = "Value";

    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }
}

impl NodeKind for ValueNode {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema::new("Value")
            .with_output(PinDefinition::new("value", "Constant", PinDataType::Scalar))
    }

    fn compute(&mut self, _inputs: &Inputs) -> PinValues {
        let mut out = PinValues::new();
        out.insert("value".into(), PinValue::Scalar(self.value));
        out
    }

    fn save_state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("value".into(), json!(self.value));
        state
    }

    fn restore_state(&mut self, state: &Map<String, Value>) -> Result<(), GraphError> {
        if let Some(value) = state.get("value").and_then(Value::as_f64) {
            self.value = value;
        }
        Ok(())
    }
}
