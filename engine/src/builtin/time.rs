//! Wall-clock source.

use std::time::Instant;

use crate::kind::{Inputs, NodeKind, PinValues};
use crate::model::{NodeSchema, PinDataType, PinDefinition, PinValue};

/// Emits seconds elapsed since construction on its `seconds` output.
///
/// Input-free, so it is re-evaluated every tick and drives everything
/// downstream of it.
pub struct TimeNode {
    started: Instant,
}

impl TimeNode {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for TimeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeKind for TimeNode {
    fn type_name(&self) -> &'static str {
        "Time"
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema::new("Time")
            .with_output(PinDefinition::new("seconds", "Seconds", PinDataType::Scalar))
    }

    fn compute(&mut self, _inputs: &Inputs) -> PinValues {
        let mut out = PinValues::new();
        out.insert(
            "seconds".into(),
            PinValue::Scalar(self.started.elapsed().as_secs_f64()),
        );
        out
    }
}
