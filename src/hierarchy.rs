//! Bottom-up application of the placer at every container level: machine, factory,
//! network, canvas. Each level treats its children as padded placer items, positions
//! them, then translates the children's real contents into the chosen position.
//!
//! Grounded directly on `original_source/src/canvas_mcp/organize.py`'s
//! `_organize_machine` / `_organize_factory` / `_organize_network` / `organize_canvas`
//! and their shared `compute_bounds_from_nodes` / `_resolve_edges_for_containers`
//! helpers, which this module follows pass for pass. The recursive bottom-up shape —
//! recurse into children, compute a bounds fragment, translate it into the parent's
//! coordinate space — mirrors the teacher's `regviz_app::graph::layout::compute_box_layout`.

use indexmap::{IndexMap, IndexSet};

use crate::geom::{BoundsTracker, Rect};
use crate::model::{Canvas, Factory, Machine, Network};
use crate::placer::{self, Orientation, PlacerEdge, PlacerItem, PlacerOptions};

const NODE_HORIZONTAL_SPACING: f64 = 90.0;
const NODE_VERTICAL_SPACING: f64 = 140.0;
const CONTAINER_HORIZONTAL_SPACING: f64 = 200.0;
const CONTAINER_VERTICAL_SPACING: f64 = 240.0;
const NETWORK_HORIZONTAL_SPACING: f64 = 260.0;
const NETWORK_VERTICAL_SPACING: f64 = 320.0;
const INTER_NETWORK_HORIZONTAL_SPACING: f64 = 320.0;
const INTER_NETWORK_VERTICAL_SPACING: f64 = 380.0;

const MACHINE_PADDING: f64 = 55.0;
const FACTORY_PADDING: f64 = 75.0;
const NETWORK_PADDING: f64 = 100.0;
const LABEL_HEADER: f64 = 40.0;

const GRID_COLUMNS_NODE: usize = 4;
const GRID_COLUMNS_CONTAINER: usize = 3;

const CANVAS_START_X: f64 = 80.0;
const CANVAS_START_Y: f64 = 100.0;

/// Options controlling the hierarchy driver. `spacing_level` is accepted for API
/// compatibility but is advisory only: the per-level spacing table above is always
/// used, matching the original system's own note that the parameter "is now advisory."
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub orientation: Orientation,
    pub spacing_level: SpacingLevel,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            spacing_level: SpacingLevel::Container,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingLevel {
    Node,
    Container,
    Network,
}

/// Computes the bounding box of a set of nodes, substituting a fallback size for
/// any node whose size was never set. Returns `None` for an empty or entirely
/// non-finite set.
fn compute_bounds_from_nodes(nodes: &[&crate::model::Node]) -> Option<Rect> {
    let mut tracker = BoundsTracker::new();
    for node in nodes {
        let w = if node.size.width > 0.0 { node.size.width } else { 360.0 };
        let h = if node.size.height > 0.0 { node.size.height } else { 180.0 };
        tracker.include_rect(Rect::new(node.position.x, node.position.y, w, h));
    }
    tracker.finish()
}

/// Resolves node-level connections up to container-level edges: if a node in
/// container A connects to a node in container B, this yields an edge A -> B.
/// Self-edges are excluded and duplicates deduplicated.
fn resolve_container_edges(
    connections: &[(String, String)],
    node_to_container: &IndexMap<String, String>,
    container_ids: &IndexSet<String>,
) -> Vec<PlacerEdge> {
    let mut seen: IndexSet<(String, String)> = IndexSet::new();
    let mut edges = Vec::new();

    for (src_node, dst_node) in connections {
        let Some(src_container) = node_to_container.get(src_node) else { continue };
        let Some(dst_container) = node_to_container.get(dst_node) else { continue };
        if src_container == dst_container {
            continue;
        }
        if !container_ids.contains(src_container) || !container_ids.contains(dst_container) {
            continue;
        }
        let pair = (src_container.clone(), dst_container.clone());
        if seen.contains(&pair) {
            continue;
        }
        seen.insert(pair.clone());
        edges.push(PlacerEdge {
            from_id: pair.0,
            to_id: pair.1,
        });
    }

    edges
}

/// Organizes the nodes within a single machine. Returns the machine's bounds, or
/// `None` if it has no nodes.
fn organize_machine(
    machine: &mut Machine,
    all_connections: &[(String, String)],
    start_x: f64,
    start_y: f64,
    orientation: Orientation,
) -> Option<Rect> {
    if machine.nodes.is_empty() {
        return None;
    }

    let node_ids: IndexSet<&str> = machine.nodes.iter().map(|n| n.id.as_str()).collect();

    let items: Vec<PlacerItem> = machine
        .nodes
        .iter()
        .map(|node| PlacerItem {
            id: node.id.clone(),
            width: node.size.width,
            height: node.size.height,
            x: node.position.x,
            y: node.position.y,
        })
        .collect();

    let edges: Vec<PlacerEdge> = all_connections
        .iter()
        .filter(|(src, dst)| node_ids.contains(src.as_str()) && node_ids.contains(dst.as_str()))
        .map(|(src, dst)| PlacerEdge {
            from_id: src.clone(),
            to_id: dst.clone(),
        })
        .collect();

    let options = PlacerOptions {
        orientation,
        horizontal_spacing: NODE_HORIZONTAL_SPACING,
        vertical_spacing: NODE_VERTICAL_SPACING,
        start_x: start_x + MACHINE_PADDING,
        start_y: start_y + MACHINE_PADDING,
        reference_center_x: 0.0,
        reference_center_y: 0.0,
        grid_columns: GRID_COLUMNS_NODE,
    };

    let layout = placer::compute_layout(&items, &edges, &options);

    for node in &mut machine.nodes {
        if let Some(pos) = layout.get(&node.id) {
            node.position = *pos;
        }
    }

    let refs: Vec<&crate::model::Node> = machine.nodes.iter().collect();
    compute_bounds_from_nodes(&refs)
}

/// Organizes the machines within a single factory, recursing into each machine
/// first. Returns the factory's bounds, or `None` if it has no machines.
fn organize_factory(
    factory: &mut Factory,
    all_connections: &[(String, String)],
    start_x: f64,
    start_y: f64,
    orientation: Orientation,
) -> Option<Rect> {
    if factory.machines.is_empty() {
        return None;
    }

    let mut machine_bounds: IndexMap<String, Rect> = IndexMap::new();
    for machine in &mut factory.machines {
        if let Some(bounds) = organize_machine(machine, all_connections, 0.0, 0.0, orientation) {
            machine_bounds.insert(machine.id.clone(), bounds);
        }
    }
    if machine_bounds.is_empty() {
        return None;
    }

    let mut node_to_machine: IndexMap<String, String> = IndexMap::new();
    for machine in &factory.machines {
        for node in &machine.nodes {
            node_to_machine.insert(node.id.clone(), machine.id.clone());
        }
    }
    let machine_ids: IndexSet<String> = factory.machines.iter().map(|m| m.id.clone()).collect();

    let container_edges = resolve_container_edges(all_connections, &node_to_machine, &machine_ids);

    let mut items = Vec::new();
    for machine in &factory.machines {
        let Some(bounds) = machine_bounds.get(&machine.id) else { continue };
        items.push(PlacerItem {
            id: machine.id.clone(),
            width: bounds.width + MACHINE_PADDING * 2.0,
            height: bounds.height + MACHINE_PADDING * 2.0 + LABEL_HEADER,
            x: bounds.x,
            y: bounds.y,
        });
    }
    if items.is_empty() {
        return None;
    }

    let effective_grid_columns = if container_edges.is_empty() {
        items.len().max(1)
    } else {
        GRID_COLUMNS_CONTAINER
    };

    let options = PlacerOptions {
        orientation,
        horizontal_spacing: CONTAINER_HORIZONTAL_SPACING,
        vertical_spacing: CONTAINER_VERTICAL_SPACING,
        start_x: start_x + FACTORY_PADDING,
        start_y: start_y + FACTORY_PADDING,
        reference_center_x: 0.0,
        reference_center_y: 0.0,
        grid_columns: effective_grid_columns,
    };

    let layout = placer::compute_layout(&items, &container_edges, &options);

    for machine in &mut factory.machines {
        let Some(pos) = layout.get(&machine.id) else { continue };
        let Some(bounds) = machine_bounds.get(&machine.id) else { continue };
        let dx = pos.x + MACHINE_PADDING - bounds.x;
        let dy = pos.y + MACHINE_PADDING + LABEL_HEADER - bounds.y;
        for node in &mut machine.nodes {
            node.position.x += dx;
            node.position.y += dy;
        }
    }

    let all_factory_nodes: Vec<&crate::model::Node> = factory
        .machines
        .iter()
        .flat_map(|m| m.nodes.iter())
        .collect();
    compute_bounds_from_nodes(&all_factory_nodes)
}

/// Organizes the factories within a single network, recursing into each factory
/// first. Returns the network's bounds, or `None` if it has no factories.
fn organize_network(
    network: &mut Network,
    all_connections: &[(String, String)],
    start_x: f64,
    start_y: f64,
    orientation: Orientation,
) -> Option<Rect> {
    if network.factories.is_empty() {
        return None;
    }

    let mut factory_bounds: IndexMap<String, Rect> = IndexMap::new();
    for factory in &mut network.factories {
        if let Some(bounds) = organize_factory(factory, all_connections, 0.0, 0.0, orientation) {
            factory_bounds.insert(factory.id.clone(), bounds);
        }
    }
    if factory_bounds.is_empty() {
        return None;
    }

    if factory_bounds.len() == 1 {
        let factory = &mut network.factories[0];
        if let Some(bounds) = factory_bounds.get(&factory.id) {
            let dx = start_x + NETWORK_PADDING - bounds.x;
            let dy = start_y + NETWORK_PADDING - bounds.y;
            for machine in &mut factory.machines {
                for node in &mut machine.nodes {
                    node.position.x += dx;
                    node.position.y += dy;
                }
            }
        }
        let all_nodes: Vec<&crate::model::Node> = network
            .factories
            .iter()
            .flat_map(|f| f.machines.iter())
            .flat_map(|m| m.nodes.iter())
            .collect();
        return compute_bounds_from_nodes(&all_nodes);
    }

    let mut node_to_factory: IndexMap<String, String> = IndexMap::new();
    for factory in &network.factories {
        for machine in &factory.machines {
            for node in &machine.nodes {
                node_to_factory.insert(node.id.clone(), factory.id.clone());
            }
        }
    }
    let factory_ids: IndexSet<String> = network.factories.iter().map(|f| f.id.clone()).collect();

    let container_edges = resolve_container_edges(all_connections, &node_to_factory, &factory_ids);

    let mut items = Vec::new();
    for factory in &network.factories {
        let Some(bounds) = factory_bounds.get(&factory.id) else { continue };
        items.push(PlacerItem {
            id: factory.id.clone(),
            width: bounds.width + FACTORY_PADDING * 2.0,
            height: bounds.height + FACTORY_PADDING * 2.0 + LABEL_HEADER,
            x: bounds.x,
            y: bounds.y,
        });
    }
    if items.is_empty() {
        return None;
    }

    let effective_grid_columns = if container_edges.is_empty() {
        items.len().max(1)
    } else {
        GRID_COLUMNS_CONTAINER
    };

    let options = PlacerOptions {
        orientation,
        horizontal_spacing: NETWORK_HORIZONTAL_SPACING,
        vertical_spacing: NETWORK_VERTICAL_SPACING,
        start_x: start_x + NETWORK_PADDING,
        start_y: start_y + NETWORK_PADDING,
        reference_center_x: 0.0,
        reference_center_y: 0.0,
        grid_columns: effective_grid_columns,
    };

    let layout = placer::compute_layout(&items, &container_edges, &options);

    for factory in &mut network.factories {
        let Some(pos) = layout.get(&factory.id) else { continue };
        let Some(bounds) = factory_bounds.get(&factory.id) else { continue };
        let dx = pos.x + FACTORY_PADDING - bounds.x;
        let dy = pos.y + FACTORY_PADDING + LABEL_HEADER - bounds.y;
        for machine in &mut factory.machines {
            for node in &mut machine.nodes {
                node.position.x += dx;
                node.position.y += dy;
            }
        }
    }

    let all_nodes: Vec<&crate::model::Node> = network
        .factories
        .iter()
        .flat_map(|f| f.machines.iter())
        .flat_map(|m| m.nodes.iter())
        .collect();
    compute_bounds_from_nodes(&all_nodes)
}

fn all_network_nodes(network: &Network) -> Vec<&crate::model::Node> {
    network
        .factories
        .iter()
        .flat_map(|f| f.machines.iter())
        .flat_map(|m| m.nodes.iter())
        .collect()
}

/// Applies the hierarchical layout algorithm to an entire canvas, repositioning
/// nodes in-place. Bottom-up: nodes within machines, machines within factories,
/// factories within networks, networks relative to each other.
pub fn layout_canvas(canvas: &mut Canvas, options: &LayoutOptions) {
    if canvas.all_nodes().is_empty() {
        return;
    }

    let all_connections = canvas.all_connections();
    let orientation = options.orientation;

    let mut network_bounds: IndexMap<String, Rect> = IndexMap::new();
    for network in &mut canvas.networks {
        organize_network(network, &all_connections, 0.0, 0.0, orientation);
        let net_nodes = all_network_nodes(network);
        if !net_nodes.is_empty() {
            if let Some(bounds) = compute_bounds_from_nodes(&net_nodes) {
                network_bounds.insert(network.id.clone(), bounds);
            }
        }
    }

    if canvas.networks.len() <= 1 {
        if let Some(network) = canvas.networks.first_mut() {
            let net_node_ids: Vec<String> = all_network_nodes(network)
                .iter()
                .map(|n| n.id.clone())
                .collect();
            if !net_node_ids.is_empty() {
                if let Some(bounds) = network_bounds.get(&network.id) {
                    let dx = CANVAS_START_X - bounds.x;
                    let dy = CANVAS_START_Y - bounds.y;
                    for factory in &mut network.factories {
                        for machine in &mut factory.machines {
                            for node in &mut machine.nodes {
                                node.position.x += dx;
                                node.position.y += dy;
                            }
                        }
                    }
                }
            }
        }
        return;
    }

    let mut node_to_network: IndexMap<String, String> = IndexMap::new();
    for network in &canvas.networks {
        for node in all_network_nodes(network) {
            node_to_network.insert(node.id.clone(), network.id.clone());
        }
    }
    let network_ids: IndexSet<String> = canvas.networks.iter().map(|n| n.id.clone()).collect();

    let container_edges = resolve_container_edges(&all_connections, &node_to_network, &network_ids);

    let mut items = Vec::new();
    for network in &canvas.networks {
        let Some(bounds) = network_bounds.get(&network.id) else { continue };
        items.push(PlacerItem {
            id: network.id.clone(),
            width: bounds.width + NETWORK_PADDING * 2.0,
            height: bounds.height + NETWORK_PADDING * 2.0,
            x: bounds.x,
            y: bounds.y,
        });
    }
    if items.is_empty() {
        return;
    }

    let options = PlacerOptions {
        orientation,
        horizontal_spacing: INTER_NETWORK_HORIZONTAL_SPACING,
        vertical_spacing: INTER_NETWORK_VERTICAL_SPACING,
        start_x: CANVAS_START_X,
        start_y: CANVAS_START_Y,
        reference_center_x: 0.0,
        reference_center_y: 0.0,
        grid_columns: GRID_COLUMNS_CONTAINER,
    };

    let layout = placer::compute_layout(&items, &container_edges, &options);

    for network in &mut canvas.networks {
        let Some(pos) = layout.get(&network.id) else { continue };
        let Some(bounds) = network_bounds.get(&network.id) else { continue };
        let dx = pos.x + NETWORK_PADDING - bounds.x;
        let dy = pos.y + NETWORK_PADDING - bounds.y;
        for factory in &mut network.factories {
            for machine in &mut factory.machines {
                for node in &mut machine.nodes {
                    node.position.x += dx;
                    node.position.y += dy;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Machine as M, Network as N, Node, NodeType};

    fn sized_node(id: &str, w: f64, h: f64) -> Node {
        let mut node = Node::new(id, NodeType::Process).unwrap();
        node.size.width = w;
        node.size.height = h;
        node
    }

    #[test]
    fn single_machine_chain_lays_out_left_to_right() {
        let a = sized_node("a", 100.0, 50.0).with_outputs(["b".to_string()]);
        let b = sized_node("b", 100.0, 50.0).with_inputs(["a".to_string()]);
        let machine = M::new("m1").unwrap().with_nodes([a, b]);
        let mut canvas = Canvas::new("t").with_networks([N::new("n1")
            .unwrap()
            .with_factories([crate::model::Factory::new("f1").unwrap().with_machines([machine])])]);

        layout_canvas(&mut canvas, &LayoutOptions::default());

        let nodes = canvas.all_nodes();
        let a_pos = nodes.iter().find(|n| n.id == "a").unwrap().position;
        let b_pos = nodes.iter().find(|n| n.id == "b").unwrap().position;
        assert!(b_pos.x > a_pos.x);
    }

    #[test]
    fn empty_canvas_does_not_panic() {
        let mut canvas = Canvas::new("empty");
        layout_canvas(&mut canvas, &LayoutOptions::default());
        assert!(canvas.all_nodes().is_empty());
    }
}
