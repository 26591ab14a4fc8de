//! Built-in node kinds shipped with the engine.
//!
//! Concrete processing units (shader programs, samplers) live outside the
//! engine; these kinds cover the plain-value plumbing every graph needs.

pub mod math;
pub mod mixer;
pub mod osc;
pub mod screen;
pub mod time;
pub mod value;

use std::cell::RefCell;
use std::rc::Rc;

pub use math::{NegateNode, SumNode};
pub use mixer::MixerNode;
pub use osc::{OscillatorNode, Waveform};
pub use screen::{PresentedFrame, ScreenNode};
pub use time::TimeNode;
pub use value::ValueNode;

use crate::registry::NodeRegistry;

/// Register every built-in kind, returning the shared screen sink so the
/// embedding renderer can read presented frames from it.
pub fn register_builtin_kinds(registry: &mut NodeRegistry) -> Rc<RefCell<ScreenNode>> {
    registry.register(ValueNode::TYPE_NAME, || ValueNode::new(0.0));
    registry.register("Sum", || SumNode);
    registry.register("Negate", || NegateNode);
    registry.register("Time", TimeNode::new);
    registry.register("Oscillator", OscillatorNode::default);
    registry.register("Mixer", || MixerNode::new(4));

    let screen = ScreenNode::shared();
    registry.register_shared(ScreenNode::TYPE_NAME, screen.clone());
    screen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_registered() {
        let mut registry = NodeRegistry::new();
        register_builtin_kinds(&mut registry);
        for name in ["Value", "Sum", "Negate", "Time", "Oscillator", "Mixer", "Screen"] {
            assert!(registry.contains(name), "missing kind {}", name);
        }
    }
}
