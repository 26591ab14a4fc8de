use engine::builtin::register_builtin_kinds;
use engine::{Graph, GraphError, Node, NodeRegistry, PinValue};

/// Assembles a small oscillator patch, ticks it a few times, then proves the
/// graph survives a save/load roundtrip.
fn main() -> Result<(), GraphError> {
    env_logger::init();

    let mut registry = NodeRegistry::new();
    register_builtin_kinds(&mut registry);

    let mut graph = Graph::new();
    let time = graph.attach_node(registry.create("Time")?)?;
    let osc = graph.attach_node(registry.create("Oscillator")?)?;
    let mixer = graph.attach_node(registry.create("Mixer")?)?;

    graph.connect(time, "seconds", osc, "time")?;
    graph.connect(osc, "output", mixer, "in1")?;
    graph.set_input_value(osc, "freq", PinValue::Scalar(2.0))?;

    for tick in 0..5 {
        let outputs = graph.run(mixer)?;
        println!("tick {}: mix = {:.4}", tick, outputs["output"].as_scalar(0.0));
        std::thread::sleep(std::time::Duration::from_millis(50));
    }

    let json = engine::serialize::save_to_string(&graph)?;
    println!("--- saved graph document ---\n{}", json);

    let mut reloaded = Graph::new();
    engine::serialize::load_from_str(&json, &mut reloaded, &registry)?;
    let target = reloaded
        .nodes()
        .iter()
        .find(|n| n.type_name() == "Mixer")
        .and_then(Node::id);
    if let Some(target) = target {
        let outputs = reloaded.run(target)?;
        println!("reloaded mix = {:.4}", outputs["output"].as_scalar(0.0));
    }

    Ok(())
}
