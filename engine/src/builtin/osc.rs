//! Waveform oscillator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphError;
use crate::kind::{Inputs, NodeKind, PinValues};
use crate::model::{NodeSchema, PinDataType, PinDefinition, PinValue};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    #[default]
    Triangle,
    Square,
    Saw,
}

impl Waveform {
    /// Sample the waveform at a phase measured in cycles.
    fn sample(self, phase: f64) -> f64 {
        let t = phase.rem_euclid(1.0);
        match self {
            Waveform::Sine => (t * std::f64::consts::TAU).sin(),
            Waveform::Triangle => 4.0 * (t - 0.5).abs() - 1.0,
            Waveform::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Saw => 2.0 * t - 1.0,
        }
    }
}

/// Samples a periodic waveform: `output = gain * wave(freq * time)`.
///
/// The waveform shape is a node property, persisted with the graph; `time`,
/// `freq`, and `gain` are pins, so any of them can be driven by upstream
/// nodes or left at their literals.
pub struct OscillatorNode {
    waveform: Waveform,
}

impl OscillatorNode {
    pub fn new(waveform: Waveform) -> Self {
        Self { waveform }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }
}

impl Default for OscillatorNode {
    fn default() -> Self {
        Self::new(Waveform::Triangle)
    }
}

impl NodeKind for OscillatorNode {
    fn type_name(&self) -> &'static str {
        "Oscillator"
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema::new("Oscillator")
            .with_input(
                PinDefinition::new("time", "Time", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(0.0)),
            )
            .with_input(
                PinDefinition::new("freq", "Freq", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(440.0)),
            )
            .with_input(
                PinDefinition::new("gain", "Gain", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(0.5)),
            )
            .with_output(PinDefinition::new("output", "Output", PinDataType::Scalar))
    }

    fn compute(&mut self, inputs: &Inputs) -> PinValues {
        let time = inputs.scalar("time", 0.0);
        let freq = inputs.scalar("freq", 440.0);
        let gain = inputs.scalar("gain", 0.5);
        let mut out = PinValues::new();
        out.insert(
            "output".into(),
            PinValue::Scalar(gain * self.waveform.sample(freq * time)),
        );
        out
    }

    fn save_state(&self) -> Map<String, Value> {
        let mut state = Map::new();
        state.insert(
            "waveform".into(),
            serde_json::to_value(self.waveform).unwrap_or(Value::Null),
        );
        state
    }

    fn restore_state(&mut self, state: &Map<String, Value>) -> Result<(), GraphError> {
        if let Some(value) = state.get("waveform") {
            self.waveform = serde_json::from_value(value.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_wave_samples() {
        assert_eq!(Waveform::Square.sample(0.25), 1.0);
        assert_eq!(Waveform::Square.sample(0.75), -1.0);
        // Phase wraps
        assert_eq!(Waveform::Square.sample(1.25), 1.0);
        assert_eq!(Waveform::Square.sample(-0.25), -1.0);
    }

    #[test]
    fn test_compute_applies_gain() {
        let mut osc = OscillatorNode::new(Waveform::Square);
        let mut values = PinValues::new();
        values.insert("time".into(), PinValue::Scalar(0.1));
        values.insert("freq".into(), PinValue::Scalar(1.0));
        values.insert("gain".into(), PinValue::Scalar(0.5));
        let outputs = osc.compute(&Inputs::new(values));
        assert_eq!(outputs["output"], PinValue::Scalar(0.5));
    }

    #[test]
    fn test_waveform_roundtrip() {
        let osc = OscillatorNode::new(Waveform::Saw);
        let state = osc.save_state();
        let mut restored = OscillatorNode::default();
        restored.restore_state(&state).unwrap();
        assert_eq!(restored.waveform(), Waveform::Saw);
    }
}
