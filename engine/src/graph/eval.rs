//! Pull-based, memoized-per-tick evaluation.

use std::collections::HashSet;

use log::warn;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::kind::{Inputs, PinValues};
use crate::model::{NodeId, PinValue};

impl Graph {
    /// Evaluate `target`, pulling every dirty upstream node first, and
    /// return its output snapshot.
    ///
    /// Called once per external tick. Each call carries a fresh visited set:
    /// a node is computed at most once per call, and re-entering a node
    /// already visited this call (a feedback cycle) returns its previous
    /// outputs instead of recursing, so cycles terminate with the looped
    /// input left unsatisfied for the pass.
    pub fn run(&mut self, target: NodeId) -> Result<PinValues, GraphError> {
        let mut visited = HashSet::new();
        self.run_node(target, &mut visited)
    }

    fn run_node(
        &mut self,
        id: NodeId,
        visited: &mut HashSet<NodeId>,
    ) -> Result<PinValues, GraphError> {
        let index = self.lookup(id)?;
        if !visited.insert(id) {
            return Ok(self.output_snapshot(index));
        }

        self.nodes[index].kind().clone().borrow_mut().on_enter();

        // Kinds without declared inputs are time-varying sources; they run
        // on every visit.
        if self.nodes[index].inputs().is_empty() {
            let kind = self.nodes[index].kind().clone();
            let outputs = kind.borrow_mut().compute(&Inputs::default());
            self.publish(index, outputs);
            return Ok(self.output_snapshot(index));
        }

        let mut dirty = self.nodes[index].links_changed;
        let input_names: Vec<String> = self.nodes[index]
            .inputs()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        let mut values = PinValues::new();

        for name in &input_names {
            let link = self.nodes[index].input(name).and_then(|p| p.link.clone());
            match link {
                Some(link) => {
                    self.run_node(link.source_node, visited)?;
                    let read = self.index_of(link.source_node).and_then(|src| {
                        self.nodes[src]
                            .output(&link.source_pin)
                            .map(|p| (p.value.clone(), p.version))
                    });
                    let Some((value, version)) = read else {
                        // A link always mirrors a live connection; a dangling
                        // one means the invariant broke upstream of us.
                        warn!(
                            "Graph: node {} input '{}' links to missing {}.{}",
                            id, name, link.source_node, link.source_pin
                        );
                        values.insert(name.clone(), PinValue::None);
                        continue;
                    };
                    if link.last_seen != Some(version) {
                        dirty = true;
                        if let Some(pin) = self.nodes[index].input_mut(name) {
                            pin.set_value(value.clone());
                            pin.seen_version = Some(pin.version);
                            if let Some(l) = pin.link.as_mut() {
                                l.last_seen = Some(version);
                            }
                        }
                    }
                    values.insert(name.clone(), value);
                }
                None => {
                    // Unlinked input: use the standing literal, and notice
                    // when it was edited since the last computation.
                    if let Some(pin) = self.nodes[index].input_mut(name) {
                        if pin.seen_version != Some(pin.version) {
                            dirty = true;
                            pin.seen_version = Some(pin.version);
                        }
                        values.insert(name.clone(), pin.value.clone());
                    }
                }
            }
        }

        if dirty {
            let kind = self.nodes[index].kind().clone();
            let outputs = kind.borrow_mut().compute(&Inputs::new(values));
            self.publish(index, outputs);
        }

        Ok(self.output_snapshot(index))
    }

    fn publish(&mut self, index: usize, outputs: PinValues) {
        for (name, value) in outputs {
            if let Err(err) = self.nodes[index].set_output(&name, value) {
                warn!(
                    "Graph: node {} dropped computed output: {}",
                    self.nodes[index].name, err
                );
            }
        }
        self.nodes[index].links_changed = false;
    }

    fn output_snapshot(&self, index: usize) -> PinValues {
        self.nodes[index]
            .outputs()
            .iter()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect()
    }
}
