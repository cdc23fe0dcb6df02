//! Manual-inspection binary: builds a small sample canvas with the engine's own
//! constructors, runs the full layout pipeline, and prints the resulting node
//! positions. Not a documented product surface — a convenience for eyeballing
//! layout output, the library analogue of the teacher's `regviz_core` CLI binary
//! that builds an NFA/DFA from a pattern and prints diagnostics.

use canvas_layout::{
    layout, ApproxFontMetrics, Canvas, ContainerStyle, Factory, LayoutOptions, Machine, Network,
    Node, NodeStyle, NodeType, Orientation,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn sample_canvas() -> Canvas {
    let ingest = Node::new("ingest", NodeType::Input)
        .unwrap()
        .with_label("Ingest Request")
        .with_content("Reads the incoming request payload from the queue.")
        .with_outputs(["validate".to_string()]);

    let validate = Node::new("validate", NodeType::Decision)
        .unwrap()
        .with_label("Validate Schema")
        .with_content("Checks the payload against the expected schema.")
        .with_inputs(["ingest".to_string()])
        .with_outputs(["enrich".to_string()]);

    let enrich = Node::new("enrich", NodeType::Ai)
        .unwrap()
        .with_label("Enrich With Model")
        .with_content("Calls an LLM to enrich the payload with derived fields.")
        .with_inputs(["validate".to_string()])
        .with_outputs(["persist".to_string()])
        .with_style(NodeStyle {
            border_color: Some("#9C27B0".to_string()),
            ..Default::default()
        });

    let persist = Node::new("persist", NodeType::Output)
        .unwrap()
        .with_label("Persist Result")
        .with_content("Writes the enriched record to the results store.")
        .with_inputs(["enrich".to_string()]);

    let pipeline = Machine::new("request_pipeline")
        .unwrap()
        .with_label("Request Pipeline")
        .with_nodes([ingest, validate, enrich, persist])
        .with_style(ContainerStyle::default());

    let factory = Factory::new("ingestion").unwrap().with_label("Ingestion").with_machines([pipeline]);
    let network = Network::new("primary").unwrap().with_label("Primary System").with_factories([factory]);

    Canvas::new("Request Processing Pipeline").with_networks([network])
}

fn main() {
    init_tracing();

    let mut canvas = sample_canvas();
    let options = LayoutOptions {
        orientation: Orientation::Horizontal,
        ..Default::default()
    };
    layout(&mut canvas, &ApproxFontMetrics, &options);

    println!("Canvas: {}", canvas.title);
    for node in canvas.all_nodes() {
        println!(
            "  {:<12} [{:<8}] pos=({:>6.0}, {:>6.0}) size=({:>5.0} x {:>4.0})",
            node.id,
            node.kind.as_str(),
            node.position.x,
            node.position.y,
            node.size.width,
            node.size.height,
        );
    }

    let connections = canvas.all_connections();
    println!("Connections: {}", connections.len());
    for (src, dst) in &connections {
        println!("  {src} -> {dst}");
    }
}
