//! Out-of-tree node kind: a deterministic noise source.
//!
//! Lives outside the engine crate on purpose, as a check that the
//! [`NodeKind`] contract is implementable without access to engine
//! internals.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use engine::{
    GraphError, Inputs, NodeKind, NodeRegistry, NodeSchema, PinDataType, PinDefinition, PinValue,
    PinValues,
};

/// Emits seeded random noise in `[-amplitude, amplitude]`.
///
/// The rng is reseeded from `seed ^ time_bucket` every computation, so the
/// output is a pure function of its inputs and replaying a saved graph
/// reproduces the same noise.
pub struct NoiseNode {
    seed: u64,
}

impl NoiseNode {
    pub const TYPE_NAME: &'static str = "Noise";

    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl NodeKind for NoiseNode {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema::new("Noise")
            .with_input(
                PinDefinition::new("time", "Time", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(0.0)),
            )
            .with_input(
                PinDefinition::new("amplitude", "Amplitude", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(1.0)),
            )
            .with_output(PinDefinition::new("value", "Noise", PinDataType::Scalar))
    }

    fn compute(&mut self, inputs: &Inputs) -> PinValues {
        let amplitude = inputs.scalar("amplitude", 1.0).abs();
        let time_bucket = (inputs.scalar("time", 0.0) * 1000.0).round() as u64;
        let mut rng = StdRng::seed_from_u64(self.seed ^ time_bucket);
        let mut out = PinValues::new();
        out.insert(
            "value".into(),
            PinValue::Scalar(rng.gen_range(-amplitude..=amplitude)),
        );
        out
    }

    fn save_state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert("seed".into(), json!(self.seed));
        state
    }

    fn restore_state(&mut self, state: &Map<String, Value>) -> Result<(), GraphError> {
        if let Some(seed) = state.get("seed").and_then(Value::as_u64) {
            self.seed = seed;
        }
        Ok(())
    }
}

/// Make the noise kind constructible by name, e.g. for deserialization.
pub fn register(registry: &mut NodeRegistry) {
    registry.register(NoiseNode::TYPE_NAME, || NoiseNode::new(0));
}

#[cfg(test)]
mod tests {
    use engine::{Graph, Node};

    use super::*;

    #[test]
    fn test_noise_is_deterministic_per_time_bucket() {
        let mut values = PinValues::new();
        values.insert("time".into(), PinValue::Scalar(0.25));
        let inputs = Inputs::new(values);

        let first = NoiseNode::new(7).compute(&inputs)["value"].clone();
        let second = NoiseNode::new(7).compute(&inputs)["value"].clone();
        assert_eq!(first, second);

        let other_seed = NoiseNode::new(8).compute(&inputs)["value"].clone();
        assert_ne!(first, other_seed);
    }

    #[test]
    fn test_noise_respects_amplitude() {
        let mut node = NoiseNode::new(42);
        for tick in 0..100 {
            let mut values = PinValues::new();
            values.insert("time".into(), PinValue::Scalar(tick as f64 * 0.01));
            values.insert("amplitude".into(), PinValue::Scalar(0.5));
            let outputs = node.compute(&Inputs::new(values));
            let sample = outputs["value"].as_scalar(f64::NAN);
            assert!((-0.5..=0.5).contains(&sample));
        }
    }

    #[test]
    fn test_seed_survives_persistence() {
        let mut registry = NodeRegistry::new();
        register(&mut registry);

        let mut graph = Graph::new();
        graph.attach_node(Node::new(NoiseNode::new(1234))).unwrap();

        let json = engine::serialize::save_to_string(&graph).unwrap();
        let mut restored = Graph::new();
        engine::serialize::load_from_str(&json, &mut restored, &registry).unwrap();

        let kind = restored.nodes()[0].kind().clone();
        let state = kind.borrow().save_state();
        assert_eq!(state.get("seed").and_then(Value::as_u64), Some(1234));
    }
}
