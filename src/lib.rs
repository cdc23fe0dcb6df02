//! Hierarchical topological layout engine for network/factory/machine/node diagrams.
//!
//! Wires the three coupled subsystems together in the order node size determines
//! container bounds, container bounds determine placement, placement determines
//! connector geometry: [`sizer`] first, then [`hierarchy`], then [`avoider`].
//! See `original_source/src/canvas_mcp/organize.py::organize_canvas` for the
//! top-level orchestration this entry point mirrors.

pub mod avoider;
pub mod connector;
pub mod errors;
pub mod geom;
pub mod hierarchy;
pub mod model;
pub mod placer;
pub mod sizer;
pub mod style;

pub use errors::ModelError;
pub use hierarchy::{LayoutOptions, SpacingLevel};
pub use model::{Canvas, ContainerStyle, Factory, Machine, Network, Node, NodeStyle, NodeType, Theme};
pub use placer::Orientation;
pub use sizer::{ApproxFontMetrics, FontMetrics};

/// Runs the full layout pipeline over `canvas`, mutating every node's `size` and
/// `position` in place: auto-size every node, then position bottom-up through the
/// hierarchy, then run one avoider pass to clear connector/node overlaps.
pub fn layout(canvas: &mut model::Canvas, metrics: &dyn FontMetrics, options: &LayoutOptions) {
    sizer::auto_size_nodes(canvas, metrics);
    hierarchy::layout_canvas(canvas, options);
    avoider::avoid_connectors(canvas);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Factory as F, Machine as M, Network as N};

    #[test]
    fn layout_pipeline_produces_finite_positive_geometry() {
        let a = Node::new("a", NodeType::Input)
            .unwrap()
            .with_label("Start")
            .with_content("Reads the raw request payload from the queue.")
            .with_outputs(["b".to_string()]);
        let b = Node::new("b", NodeType::Process)
            .unwrap()
            .with_label("Transform")
            .with_inputs(["a".to_string()])
            .with_outputs(["c".to_string()]);
        let c = Node::new("c", NodeType::Output)
            .unwrap()
            .with_label("Done")
            .with_inputs(["b".to_string()]);

        let machine = M::new("m1").unwrap().with_nodes([a, b, c]);
        let factory = F::new("f1").unwrap().with_machines([machine]);
        let network = N::new("n1").unwrap().with_factories([factory]);
        let mut canvas = Canvas::new("Demo").with_networks([network]);

        layout(&mut canvas, &ApproxFontMetrics, &LayoutOptions::default());

        for node in canvas.all_nodes() {
            assert!(node.size.width > 0.0 && node.size.height > 0.0);
            assert!(node.position.x.is_finite() && node.position.y.is_finite());
        }

        let nodes = canvas.all_nodes();
        let ax = nodes.iter().find(|n| n.id == "a").unwrap().position.x;
        let bx = nodes.iter().find(|n| n.id == "b").unwrap().position.x;
        let cx = nodes.iter().find(|n| n.id == "c").unwrap().position.x;
        assert!(ax < bx);
        assert!(bx < cx);
    }

    #[test]
    fn layout_is_deterministic() {
        let build = || {
            let a = Node::new("a", NodeType::Source).unwrap().with_outputs(["b".to_string()]);
            let b = Node::new("b", NodeType::Ai).unwrap().with_inputs(["a".to_string()]);
            let machine = M::new("m1").unwrap().with_nodes([a, b]);
            let factory = F::new("f1").unwrap().with_machines([machine]);
            let network = N::new("n1").unwrap().with_factories([factory]);
            Canvas::new("Demo").with_networks([network])
        };

        let mut first = build();
        let mut second = build();
        layout(&mut first, &ApproxFontMetrics, &LayoutOptions::default());
        layout(&mut second, &ApproxFontMetrics, &LayoutOptions::default());

        let first_positions: Vec<_> = first.all_nodes().iter().map(|n| (n.id.clone(), n.position)).collect();
        let second_positions: Vec<_> = second.all_nodes().iter().map(|n| (n.id.clone(), n.position)).collect();
        assert_eq!(first_positions, second_positions);
    }
}
