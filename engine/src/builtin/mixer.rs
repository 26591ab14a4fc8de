//! Fan-in mixer with a growable channel count.

use serde_json::{json, Map, Value};

use crate::error::GraphError;
use crate::kind::{Inputs, NodeKind, PinValues};
use crate::model::{NodeSchema, PinDataType, PinDefinition, PinValue};

/// Sums its `in1..inN` inputs, ignoring unsatisfied channels.
///
/// The channel count is mutable: [`set_channels`](Self::set_channels)
/// produces the grown (or shrunk) schema, which the caller applies through
/// `Graph::update_node_schema`, subject to the usual rule that connected
/// pins cannot disappear.
pub struct MixerNode {
    channels: u32,
}

impl MixerNode {
    pub fn new(channels: u32) -> Self {
        Self { channels }
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// The pin layout this mixer would have with `channels` inputs.
    pub fn schema_for(&self, channels: u32) -> NodeSchema {
        let mut schema = NodeSchema::new("Mixer");
        for i in 1..=channels {
            schema = schema.with_input(PinDefinition::new(
                &format!("in{}", i),
                &format!("In {}", i),
                PinDataType::Scalar,
            ));
        }
        schema.with_output(PinDefinition::new("output", "Output", PinDataType::Scalar))
    }

    /// Change the channel count and return the matching schema to apply.
    pub fn set_channels(&mut self, channels: u32) -> NodeSchema {
        self.channels = channels;
        self.schema_for(channels)
    }
}

impl NodeKind for MixerNode {
    fn type_name(&self) -> &'static str {
        "Mixer"
    }

    fn schema(&self) -> NodeSchema {
        self.schema_for(self.channels)
    }

    fn compute(&mut self, inputs: &Inputs) -> PinValues {
        let mix: f64 = (1..=self.channels)
            .filter_map(|i| inputs.try_scalar(&format!("in{}", i)))
            .sum();
        let mut out = PinValues::new();
        out.insert("output".into(), PinValue::Scalar(mix));
        out
    }

    fn save_state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("channels".into(), json!(self.channels));
        state
    }

    fn restore_state(&mut self, state: &Map<String, Value>) -> Result<(), GraphError> {
        if let Some(channels) = state.get("channels").and_then(Value::as_u64) {
            self.channels = channels as u32;
        }
        Ok(())
    }
}
