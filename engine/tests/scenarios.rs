//! End-to-end scenarios exercising evaluation, topology safety, and
//! persistence together.

use std::cell::RefCell;
use std::rc::Rc;

use engine::builtin::{register_builtin_kinds, MixerNode, NegateNode, SumNode, ValueNode};
use engine::{
    Graph, GraphError, Inputs, Node, NodeKind, NodeRegistry, NodeSchema, PinValue, PinValues,
};

fn builtin_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    register_builtin_kinds(&mut registry);
    registry
}

/// Sum node that counts its compute invocations.
struct CountingSum(Rc<RefCell<u32>>);

impl NodeKind for CountingSum {
    fn type_name(&self) -> &'static str {
        "CountingSum"
    }
    fn schema(&self) -> NodeSchema {
        SumNode.schema()
    }
    fn compute(&mut self, inputs: &Inputs) -> PinValues {
        *self.0.borrow_mut() += 1;
        SumNode.compute(inputs)
    }
}

#[test]
fn sum_graph_memoizes_until_upstream_changes() {
    let mut graph = Graph::new();
    let value_a = Rc::new(RefCell::new(ValueNode::new(10.0)));
    let a = graph.attach_node(Node::from_kind(value_a.clone())).unwrap();
    let b = graph.attach_node(Node::new(ValueNode::new(20.0))).unwrap();
    let computes = Rc::new(RefCell::new(0));
    let c = graph
        .attach_node(Node::new(CountingSum(computes.clone())))
        .unwrap();
    graph.connect(a, "value", c, "a").unwrap();
    graph.connect(b, "value", c, "b").unwrap();

    assert_eq!(graph.run(c).unwrap()["c"].as_scalar(0.0), 30.0);
    assert_eq!(*computes.borrow(), 1);

    // Unchanged inputs: no additional compute
    graph.run(c).unwrap();
    assert_eq!(*computes.borrow(), 1);

    // Upstream change propagates and recomputes exactly once
    value_a.borrow_mut().set_value(20.0);
    assert_eq!(graph.run(c).unwrap()["c"].as_scalar(0.0), 40.0);
    assert_eq!(*computes.borrow(), 2);
}

#[test]
fn upstream_change_recomputes_only_reachable_nodes() {
    let mut graph = Graph::new();
    let value = Rc::new(RefCell::new(ValueNode::new(1.0)));
    let a = graph.attach_node(Node::from_kind(value.clone())).unwrap();
    let b = graph.attach_node(Node::new(ValueNode::new(2.0))).unwrap();

    let left_counter = Rc::new(RefCell::new(0));
    let right_counter = Rc::new(RefCell::new(0));
    let left = graph
        .attach_node(Node::new(CountingSum(left_counter.clone())))
        .unwrap();
    let right = graph
        .attach_node(Node::new(CountingSum(right_counter.clone())))
        .unwrap();
    let sink_counter = Rc::new(RefCell::new(0));
    let sink = graph
        .attach_node(Node::new(CountingSum(sink_counter.clone())))
        .unwrap();

    // left <- (a, a); right <- (b, b); sink <- (left.c, right.c)
    graph.connect(a, "value", left, "a").unwrap();
    graph.connect(a, "value", left, "b").unwrap();
    graph.connect(b, "value", right, "a").unwrap();
    graph.connect(b, "value", right, "b").unwrap();
    graph.connect(left, "c", sink, "a").unwrap();
    graph.connect(right, "c", sink, "b").unwrap();

    graph.run(sink).unwrap();
    assert_eq!((*left_counter.borrow(), *right_counter.borrow()), (1, 1));

    value.borrow_mut().set_value(5.0);
    graph.run(sink).unwrap();
    // Only the branch fed by the changed source recomputed
    assert_eq!(*left_counter.borrow(), 2);
    assert_eq!(*right_counter.borrow(), 1);
    assert_eq!(*sink_counter.borrow(), 2);
}

#[test]
fn connect_disconnect_restores_connection_state() {
    let mut graph = Graph::new();
    let a = graph.attach_node(Node::new(ValueNode::new(1.0))).unwrap();
    let c = graph.attach_node(Node::new(SumNode)).unwrap();

    graph.connect(a, "value", c, "a").unwrap();
    graph.disconnect(a, "value", c, "a").unwrap();

    assert!(graph.connections().is_empty());
    assert_eq!(graph.node(c).unwrap().input_link("a"), None);
    assert!(!graph.node(a).unwrap().is_schema_locked());

    // The same connection can be made again afterwards
    graph.connect(a, "value", c, "a").unwrap();
    assert_eq!(graph.connections().len(), 1);
}

#[test]
fn three_node_cycle_terminates_with_unsatisfied_input() {
    let mut graph = Graph::new();
    let x = graph.attach_node(Node::new(NegateNode)).unwrap();
    let y = graph.attach_node(Node::new(NegateNode)).unwrap();
    let z = graph.attach_node(Node::new(NegateNode)).unwrap();
    graph.connect(x, "out", y, "in").unwrap();
    graph.connect(y, "out", z, "in").unwrap();
    graph.connect(z, "out", x, "in").unwrap();

    let outputs = graph.run(z).unwrap();
    assert!(outputs["out"].is_none());
    assert!(graph.node(z).unwrap().input("in").unwrap().value.is_none());
}

#[test]
fn type_mismatch_leaves_graph_unmodified() {
    let registry = builtin_registry();
    let mut graph = Graph::new();
    let screen = graph
        .attach_node(registry.create("Screen").unwrap())
        .unwrap();
    let value = graph
        .attach_node(registry.create("Value").unwrap())
        .unwrap();

    // Scalar output into a texture input
    let err = graph.connect(value, "value", screen, "image").unwrap_err();
    assert!(matches!(err, GraphError::TypeMismatch { .. }));
    assert!(graph.connections().is_empty());
    assert!(!graph.node(value).unwrap().is_schema_locked());
}

#[test]
fn detach_requires_disconnection_first() {
    let mut graph = Graph::new();
    let a = graph.attach_node(Node::new(ValueNode::new(1.0))).unwrap();
    let c = graph.attach_node(Node::new(SumNode)).unwrap();
    graph.connect(a, "value", c, "a").unwrap();

    assert!(matches!(
        graph.detach_node(a).unwrap_err(),
        GraphError::NodeStillConnected(id) if id == a
    ));
    graph.disconnect(a, "value", c, "a").unwrap();
    let detached = graph.detach_node(a).unwrap();
    assert_eq!(detached.id(), None);
}

#[test]
fn schema_update_cannot_remove_connected_pin() {
    let mut graph = Graph::new();
    let mixer = MixerNode::new(2);
    let shrunk = mixer.schema_for(1);
    let m = graph.attach_node(Node::new(mixer)).unwrap();
    let a = graph.attach_node(Node::new(ValueNode::new(1.0))).unwrap();
    graph.connect(a, "value", m, "in2").unwrap();

    // Connected node: schema is locked outright
    assert!(matches!(
        graph.update_node_schema(m, shrunk.clone()).unwrap_err(),
        GraphError::SchemaLocked(_)
    ));

    // Even unlocked, removing the still-referenced pin is refused
    graph.disconnect(a, "value", m, "in2").unwrap();
    graph.update_node_schema(m, shrunk).unwrap();
    assert_eq!(graph.node(m).unwrap().inputs().len(), 1);
}

#[test]
fn serialized_graph_reproduces_isomorphic_topology() {
    let registry = builtin_registry();
    let mut graph = Graph::new();
    graph.meta = serde_json::json!({ "title": "patch" });

    let time = graph.attach_node(registry.create("Time").unwrap()).unwrap();
    let osc = graph
        .attach_node(registry.create("Oscillator").unwrap())
        .unwrap();
    let mixer = graph
        .attach_node(registry.create("Mixer").unwrap())
        .unwrap();
    graph.node_mut(osc).unwrap().meta = serde_json::json!({ "x": 42 });
    graph.connect(time, "seconds", osc, "time").unwrap();
    graph.connect(osc, "output", mixer, "in1").unwrap();

    let json = engine::serialize::save_to_string(&graph).unwrap();
    let mut restored = Graph::new();
    engine::serialize::load_from_str(&json, &mut restored, &registry).unwrap();

    let types: Vec<&str> = restored.nodes().iter().map(|n| n.type_name()).collect();
    assert_eq!(types, vec!["Time", "Oscillator", "Mixer"]);
    assert_eq!(restored.connections().len(), 2);
    assert_eq!(restored.nodes()[1].meta, serde_json::json!({ "x": 42 }));

    // Connection structure survives: oscillator feeds mixer channel 1
    let osc_id = restored.nodes()[1].id().unwrap();
    let mixer_id = restored.nodes()[2].id().unwrap();
    assert_eq!(
        restored.node(mixer_id).unwrap().input_link("in1"),
        Some((osc_id, "output"))
    );

    // And the restored graph evaluates
    let outputs = restored.run(mixer_id).unwrap();
    assert!(outputs["output"].scalar().is_some());
}
