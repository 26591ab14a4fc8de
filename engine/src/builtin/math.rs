//! Scalar arithmetic kinds.

use log::debug;

use crate::kind::{Inputs, NodeKind, PinValues};
use crate::model::{NodeSchema, PinDataType, PinDefinition, PinValue};

/// Adds two scalars. Publishes nothing while either input is unsatisfied
/// (e.g. during the first pass of a feedback loop).
pub struct SumNode;

impl NodeKind for SumNode {
    fn type_name(&self) -> &'static str {
        "Sum"
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema::new("Summator")
            .with_input(PinDefinition::new("a", "Value 1", PinDataType::Scalar))
            .with_input(PinDefinition::new("b", "Value 2", PinDataType::Scalar))
            .with_output(PinDefinition::new("c", "Result", PinDataType::Scalar))
    }

    fn compute(&mut self, inputs: &Inputs) -> PinValues {
        let mut out = PinValues::new();
        match (inputs.try_scalar("a"), inputs.try_scalar("b")) {
            (Some(a), Some(b)) => {
                out.insert("c".into(), PinValue::Scalar(a + b));
            }
            _ => debug!("Sum: skipping, an input is unsatisfied"),
        }
        out
    }
}

/// Negates a scalar.
pub struct NegateNode;

impl NodeKind for NegateNode {
    fn type_name(&self) -> &'static str {
        "Negate"
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema::new("Negate")
            .with_input(PinDefinition::new("in", "Input", PinDataType::Scalar))
            .with_output(PinDefinition::new("out", "Negated", PinDataType::Scalar))
    }

    fn compute(&mut self, inputs: &Inputs) -> PinValues {
        let mut out = PinValues::new();
        if let Some(value) = inputs.try_scalar("in") {
            out.insert("out".into(), PinValue::Scalar(-value));
        }
        out
    }
}
