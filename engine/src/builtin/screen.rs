//! Terminal screen sink.

use std::cell::RefCell;
use std::rc::Rc;

use crate::kind::{Inputs, NodeKind, PinValues};
use crate::model::{NodeSchema, PinDataType, PinDefinition, PinValue, TextureHandle};

/// The frame most recently presented to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentedFrame {
    pub image: TextureHandle,
    pub width: f64,
    pub height: f64,
}

/// The terminal sink of a running graph. Only one can meaningfully exist,
/// so it is registered as a shared kind: every created screen node drives
/// the same instance, and the embedding renderer reads the last presented
/// frame from its own handle to it.
#[derive(Default)]
pub struct ScreenNode {
    last_frame: Option<PresentedFrame>,
}

impl ScreenNode {
    pub const TYPE_NAME: &'static str = "Screen";

    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle suitable for `NodeRegistry::register_shared`.
    pub fn shared() -> Rc<RefCell<ScreenNode>> {
        Rc::new(RefCell::new(ScreenNode::new()))
    }

    pub fn last_frame(&self) -> Option<PresentedFrame> {
        self.last_frame
    }
}

impl NodeKind for ScreenNode {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn schema(&self) -> NodeSchema {
        NodeSchema::new("Screen")
            .with_input(PinDefinition::new("image", "Image", PinDataType::Texture))
            .with_input(
                PinDefinition::new("width", "Width", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(512.0)),
            )
            .with_input(
                PinDefinition::new("height", "Height", PinDataType::Scalar)
                    .with_default(PinValue::Scalar(512.0)),
            )
    }

    fn compute(&mut self, inputs: &Inputs) -> PinValues {
        if let Some(image) = inputs.get("image").as_texture() {
            self.last_frame = Some(PresentedFrame {
                image,
                width: inputs.scalar("width", 512.0),
                height: inputs.scalar("height", 512.0),
            });
        }
        PinValues::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_presented_frame() {
        let mut screen = ScreenNode::new();
        let mut values = PinValues::new();
        values.insert("image".into(), PinValue::Texture(TextureHandle(3)));
        screen.compute(&Inputs::new(values));
        let frame = screen.last_frame().unwrap();
        assert_eq!(frame.image, TextureHandle(3));
        assert_eq!(frame.width, 512.0);
    }

    #[test]
    fn test_no_frame_without_image() {
        let mut screen = ScreenNode::new();
        screen.compute(&Inputs::default());
        assert!(screen.last_frame().is_none());
    }
}
