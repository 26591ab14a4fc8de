//! Pin model: the typed input/output slots of a node.

use serde::{Deserialize, Serialize};

use super::connection::Link;

/// Data type carried by a pin.
///
/// Used for connection compatibility checks only; the engine never coerces
/// values between types.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PinDataType {
    /// Floating point scalar
    Scalar,
    /// Text string
    Text,
    /// GPU texture handle
    Texture,
    /// Audio stream handle
    Audio,
    /// Generic opaque resource
    Resource,
}

impl std::fmt::Display for PinDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PinDataType::Scalar => "scalar",
            PinDataType::Text => "text",
            PinDataType::Texture => "texture",
            PinDataType::Audio => "audio",
            PinDataType::Resource => "resource",
        };
        write!(f, "{}", s)
    }
}

/// Opaque handle to a GPU texture owned by the rendering backend.
///
/// Only an identifier travels through the graph; two handles with the same
/// id may refer to different texture contents at different ticks, which is
/// why dirty tracking relies on pin versions and never on value equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque handle to an audio routing node owned by the audio backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AudioHandle(pub u64);

/// The value held by a pin.
///
/// Each variant corresponds to a `PinDataType`. `None` marks an input that
/// has not received a value (unconnected with no literal, or starved by a
/// feedback cycle during the current pass).
#[derive(Clone, Debug, PartialEq, Default)]
pub enum PinValue {
    /// Single floating-point number.
    Scalar(f64),
    /// Text string.
    Text(String),
    /// GPU texture handle.
    Texture(TextureHandle),
    /// Audio stream handle.
    Audio(AudioHandle),
    /// Generic resource payload.
    Resource(serde_json::Value),
    /// No value.
    #[default]
    None,
}

impl PinValue {
    /// Extract as scalar, returning `default` for any other variant.
    pub fn as_scalar(&self, default: f64) -> f64 {
        match self {
            PinValue::Scalar(v) => *v,
            _ => default,
        }
    }

    /// Extract as scalar if present.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            PinValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PinValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as texture handle.
    pub fn as_texture(&self) -> Option<TextureHandle> {
        match self {
            PinValue::Texture(t) => Some(*t),
            _ => None,
        }
    }

    /// Extract as audio handle.
    pub fn as_audio(&self) -> Option<AudioHandle> {
        match self {
            PinValue::Audio(a) => Some(*a),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PinValue::None)
    }

    /// The data type tag of this value, if it carries one.
    pub fn data_type(&self) -> Option<PinDataType> {
        match self {
            PinValue::Scalar(_) => Some(PinDataType::Scalar),
            PinValue::Text(_) => Some(PinDataType::Text),
            PinValue::Texture(_) => Some(PinDataType::Texture),
            PinValue::Audio(_) => Some(PinDataType::Audio),
            PinValue::Resource(_) => Some(PinDataType::Resource),
            PinValue::None => None,
        }
    }
}

/// Definition of a pin in a node schema.
#[derive(Clone, Debug, PartialEq)]
pub struct PinDefinition {
    /// Internal name used for connections (e.g. "freq", "image_in")
    pub name: String,
    /// Display name shown in the UI (e.g. "Frequency", "Image")
    pub display_name: String,
    /// Data type of this pin
    pub data_type: PinDataType,
    /// Standing literal value used when no connection is present (input pins)
    pub default_value: Option<PinValue>,
}

impl PinDefinition {
    pub fn new(name: &str, display_name: &str, data_type: PinDataType) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            data_type,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: PinValue) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// Runtime state of a single pin on an attached node.
///
/// The `version` counter increments on every value write; comparing versions
/// is how downstream nodes detect change, since payloads may be mutable
/// handles for which equality says nothing.
#[derive(Clone, Debug)]
pub struct Pin {
    pub name: String,
    pub display_name: String,
    pub data_type: PinDataType,
    /// Last computed (output) or last received (input) value.
    pub value: PinValue,
    /// Bumped every time `value` is written.
    pub version: u64,
    /// Number of live connections targeting (input) or sourcing from
    /// (output) this pin. Maintained by `Graph::connect`/`disconnect`.
    pub connection_count: u32,
    /// Standing default from the pin definition, restored when a feeding
    /// connection is removed.
    pub default_value: Option<PinValue>,
    /// Mirror of the graph-level connection feeding this input, if any.
    /// Always `None` for output pins.
    pub link: Option<Link>,
    /// Version of `value` the owning node consumed on its last computation.
    /// Used for unlinked inputs whose literal value can be edited externally.
    pub seen_version: Option<u64>,
}

impl Pin {
    pub fn from_definition(def: &PinDefinition) -> Self {
        let value = def.default_value.clone().unwrap_or_default();
        Self {
            name: def.name.clone(),
            display_name: def.display_name.clone(),
            data_type: def.data_type,
            value,
            version: 0,
            connection_count: 0,
            default_value: def.default_value.clone(),
            link: None,
            seen_version: None,
        }
    }

    /// Store a value and bump the version counter.
    pub fn set_value(&mut self, value: PinValue) {
        self.value = value;
        self.version += 1;
    }

    /// Drop the current value in favor of the definition default. Values
    /// received through a link must not outlive the link, so this runs on
    /// disconnect; the version bump makes downstream notice.
    pub fn reset_to_default(&mut self) {
        self.set_value(self.default_value.clone().unwrap_or_default());
    }

    pub fn is_connected(&self) -> bool {
        self.connection_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_bumps_version() {
        let def = PinDefinition::new("freq", "Frequency", PinDataType::Scalar);
        let mut pin = Pin::from_definition(&def);
        assert_eq!(pin.version, 0);
        pin.set_value(PinValue::Scalar(440.0));
        pin.set_value(PinValue::Scalar(440.0));
        assert_eq!(pin.version, 2);
    }

    #[test]
    fn test_default_value_applied() {
        let def = PinDefinition::new("width", "Width", PinDataType::Scalar)
            .with_default(PinValue::Scalar(512.0));
        let pin = Pin::from_definition(&def);
        assert_eq!(pin.value.as_scalar(0.0), 512.0);
    }

    #[test]
    fn test_value_type_tags() {
        assert_eq!(
            PinValue::Texture(TextureHandle(7)).data_type(),
            Some(PinDataType::Texture)
        );
        assert_eq!(PinValue::None.data_type(), None);
    }
}
