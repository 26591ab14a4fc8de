//! The node kind contract: what every concrete node behavior implements.
//!
//! A kind supplies its pin schema, a `compute` transformation, optional
//! lifecycle hooks, and optional persisted state. Kinds live behind
//! `Rc<RefCell<..>>` handles so a reserved singleton kind (the terminal
//! screen sink) can be shared between the registry and the embedding
//! application; the engine is single-threaded by contract.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::GraphError;
use crate::model::{Connection, NodeSchema, PinValue};

/// Named pin values, as produced by [`NodeKind::compute`].
pub type PinValues = HashMap<String, PinValue>;

/// Shared handle to a node kind instance.
pub type KindHandle = Rc<RefCell<dyn NodeKind>>;

/// Which end of a connection the notified node sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkSide {
    /// The node's output feeds the connection.
    Source,
    /// The node's input receives from the connection.
    Target,
}

static NONE: PinValue = PinValue::None;

/// Resolved input values handed to [`NodeKind::compute`].
///
/// Every declared input appears here; unsatisfied inputs (unconnected with
/// no literal, or starved by a feedback cycle) read as [`PinValue::None`].
#[derive(Clone, Debug, Default)]
pub struct Inputs {
    values: PinValues,
}

impl Inputs {
    pub fn new(values: PinValues) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> &PinValue {
        self.values.get(name).unwrap_or(&NONE)
    }

    /// Scalar accessor with a fallback for missing or mistyped values.
    pub fn scalar(&self, name: &str, default: f64) -> f64 {
        self.get(name).as_scalar(default)
    }

    /// Scalar accessor that distinguishes "absent" from "present".
    pub fn try_scalar(&self, name: &str) -> Option<f64> {
        self.get(name).scalar()
    }

    pub fn is_satisfied(&self, name: &str) -> bool {
        !self.get(name).is_none()
    }
}

/// Behavior of a concrete node kind.
///
/// `compute` is infallible from the engine's point of view: a kind whose
/// work can fail (bad expression, missing resource) handles that internally
/// and publishes a safe default or nothing at all.
pub trait NodeKind {
    /// Stable type identifier, resolvable through the registry.
    fn type_name(&self) -> &'static str;

    /// The pin layout a fresh node of this kind starts with.
    fn schema(&self) -> NodeSchema;

    /// Transform resolved inputs into output values.
    ///
    /// Kinds without declared inputs are treated as time-varying sources and
    /// get called on every evaluation visit with empty `inputs`.
    fn compute(&mut self, inputs: &Inputs) -> PinValues;

    /// Called once per evaluation visit, before input resolution.
    fn on_enter(&mut self) {}

    /// Notification fired before a connection touching this node is
    /// installed. Used to wire an external resource graph (audio routing,
    /// GPU plumbing) in lockstep with the logical connection; connection
    /// counts and schema locks are the graph's own bookkeeping.
    fn on_before_connect(&mut self, side: LinkSide, connection: &Connection) {
        let _ = (side, connection);
    }

    /// Notification fired before a connection touching this node is removed.
    fn on_before_disconnect(&mut self, side: LinkSide, connection: &Connection) {
        let _ = (side, connection);
    }

    /// Kind-specific fields persisted beside `id`/`type`/`meta` in the node
    /// document. Empty by default.
    fn save_state(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }

    /// Restore the fields produced by [`save_state`](Self::save_state).
    fn restore_state(
        &mut self,
        state: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), GraphError> {
        let _ = state;
        Ok(())
    }
}
