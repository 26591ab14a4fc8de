//! Node kind registry: stable type name → constructor.
//!
//! An explicit registry value is built at startup and passed to whatever
//! needs to instantiate nodes (deserialization in particular); there is no
//! process-global factory.

use std::collections::HashMap;

use log::debug;

use crate::error::GraphError;
use crate::kind::{KindHandle, NodeKind};
use crate::model::Node;

type KindFactory = Box<dyn Fn() -> Node>;

/// Maps stable type identifiers to node constructors.
///
/// Two registration flavors exist: ordinary kinds get a fresh instance per
/// [`create`](Self::create) call, while a shared kind (the terminal screen
/// sink, of which only one can meaningfully exist per running graph) hands
/// out nodes backed by the same underlying instance.
#[derive(Default)]
pub struct NodeRegistry {
    factories: HashMap<String, KindFactory>,
    shared: HashMap<String, KindHandle>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an ordinary kind under `type_name`.
    pub fn register<K, F>(&mut self, type_name: &str, factory: F)
    where
        K: NodeKind + 'static,
        F: Fn() -> K + 'static,
    {
        debug!("NodeRegistry: registered kind '{}'", type_name);
        self.factories
            .insert(type_name.to_string(), Box::new(move || Node::new(factory())));
    }

    /// Register a shared singleton kind; every created node drives the same
    /// underlying instance.
    pub fn register_shared(&mut self, type_name: &str, kind: KindHandle) {
        debug!("NodeRegistry: registered shared kind '{}'", type_name);
        self.shared.insert(type_name.to_string(), kind);
    }

    /// Instantiate a detached node of the named kind.
    pub fn create(&self, type_name: &str) -> Result<Node, GraphError> {
        if let Some(kind) = self.shared.get(type_name) {
            return Ok(Node::from_kind(kind.clone()));
        }
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| GraphError::UnknownNodeType(type_name.to_string()))?;
        Ok(factory())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name) || self.shared.contains_key(type_name)
    }

    /// All registered type names, sorted for stable display.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .factories
            .keys()
            .chain(self.shared.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}
