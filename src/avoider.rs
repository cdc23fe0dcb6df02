//! Connector-aware post-pass: nudges nodes off connector curves that would
//! otherwise pass through their interior.
//!
//! Grounded directly on `original_source/src/canvas_mcp/organize.py::_avoid_connectors`
//! / `_node_intersects_path` / `_compute_nudge_direction` / `_build_node_to_machine_map`,
//! which this module follows pass for pass, including the pre-shift leapfrog
//! comparison documented as a known limitation in SPEC_FULL.md §9.

use indexmap::{IndexMap, IndexSet};

use crate::connector::{sample_connector, PathPoint};
use crate::geom::{Point, Rect};
use crate::model::Canvas;

/// Breathing room kept between a nudged node and the connector path it cleared.
pub const CLEARANCE: f64 = 20.0;
/// Upper bound on how many full passes the avoider makes over the connection list.
pub const MAX_ITERATIONS: u32 = 6;
/// Contraction applied to a node's bbox before testing for intersection; grazing
/// contact at the exact edge is not a hit.
pub const BBOX_MARGIN: f64 = -8.0;
/// Maximum cumulative y-displacement a single node may accumulate from its
/// position at the start of the pass.
pub const MAX_DISPLACEMENT: f64 = 400.0;

const BEZIER_STEPS: usize = 24;

fn node_intersects_path(x: f64, y: f64, width: f64, height: f64, path: &[PathPoint]) -> bool {
    let bbox = Rect::new(x, y, width, height).contract(BBOX_MARGIN);
    path.iter().any(|pt| bbox.contains_point(Point::new(pt.x, pt.y)))
}

/// Runs the iterative nudge pass over the whole canvas, mutating node `y`
/// positions in place. Never touches `x`. Returns the total number of nudges
/// applied, for diagnostics.
///
/// Skipped entirely (returns `0`) when the canvas has fewer than 3 nodes or no
/// connections at all — sampling and testing bezier paths is pointless work
/// below that threshold, matching the original system's early-exit guard.
pub fn avoid_connectors(canvas: &mut Canvas) -> u32 {
    let connections = canvas.all_connections();
    let node_count = canvas.all_nodes().len();
    if connections.is_empty() || node_count < 3 {
        return 0;
    }

    let node_to_machine = canvas.node_to_machine();

    let mut machine_nodes: IndexMap<String, Vec<String>> = IndexMap::new();
    for network in &canvas.networks {
        for factory in &network.factories {
            for machine in &factory.machines {
                machine_nodes.insert(
                    machine.id.clone(),
                    machine.nodes.iter().map(|n| n.id.clone()).collect(),
                );
            }
        }
    }

    let original_y: IndexMap<String, f64> = canvas
        .all_nodes()
        .iter()
        .map(|n| (n.id.clone(), n.position.y))
        .collect();

    let mut total_nudges: u32 = 0;

    for _iteration in 0..MAX_ITERATIONS {
        let mut nudged_this_round: IndexSet<String> = IndexSet::new();

        for (src_id, dst_id) in &connections {
            let (src, dst) = {
                let nodes = canvas.all_nodes();
                let src = nodes.iter().find(|n| &n.id == src_id).cloned();
                let dst = nodes.iter().find(|n| &n.id == dst_id).cloned();
                match (src, dst) {
                    (Some(s), Some(d)) => (s.clone(), d.clone()),
                    _ => continue,
                }
            };
            let path = sample_connector(&src, &dst, BEZIER_STEPS).points;

            let candidate_ids: Vec<String> = canvas
                .all_nodes()
                .iter()
                .filter(|n| n.id != *src_id && n.id != *dst_id)
                .filter(|n| !nudged_this_round.contains(&n.id))
                .map(|n| n.id.clone())
                .collect();

            for node_id in candidate_ids {
                if nudged_this_round.contains(&node_id) {
                    continue;
                }
                let (node_x, node_y, node_w, node_h) = {
                    let nodes = canvas.all_nodes();
                    let Some(node) = nodes.iter().find(|n| n.id == node_id) else { continue };
                    (node.position.x, node.position.y, node.size.width, node.size.height)
                };

                if !node_intersects_path(node_x, node_y, node_w, node_h, &path) {
                    continue;
                }

                let inside_ys: Vec<f64> = path
                    .iter()
                    .filter(|pt| pt.x >= node_x && pt.x <= node_x + node_w)
                    .map(|pt| pt.y)
                    .collect();
                if inside_ys.is_empty() {
                    continue;
                }

                let node_center_y = node_y + node_h / 2.0;
                let path_avg_y = inside_ys.iter().sum::<f64>() / inside_ys.len() as f64;
                let direction: f64 = if path_avg_y <= node_center_y { 1.0 } else { -1.0 };

                let mut shift = if direction > 0.0 {
                    let path_max_y = inside_ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    path_max_y + CLEARANCE - node_y
                } else {
                    let path_min_y = inside_ys.iter().cloned().fold(f64::INFINITY, f64::min);
                    (path_min_y - node_h - CLEARANCE) - node_y
                };
                if direction > 0.0 && shift <= 0.0 {
                    continue;
                }
                if direction < 0.0 && shift >= 0.0 {
                    continue;
                }

                let original = *original_y.get(&node_id).unwrap_or(&node_y);
                let displacement_after = (node_y + shift - original).abs();
                if displacement_after > MAX_DISPLACEMENT {
                    let already_spent = (node_y - original).abs();
                    let budget = (MAX_DISPLACEMENT - already_spent).max(0.0);
                    shift = if shift > 0.0 { budget } else { -budget };
                    if shift.abs() < 5.0 {
                        continue;
                    }
                }

                let node_y_before_shift = node_y;
                let new_node_y = (node_y + shift).round();
                {
                    let mut nodes = canvas.all_nodes_mut();
                    if let Some(node) = nodes.iter_mut().find(|n| n.id == node_id) {
                        node.position.y = new_node_y;
                    }
                }
                nudged_this_round.insert(node_id.clone());
                total_nudges += 1;

                if let Some(machine_id) = node_to_machine.get(&node_id) {
                    let siblings = machine_nodes.get(machine_id).cloned().unwrap_or_default();
                    for sibling_id in siblings {
                        if sibling_id == node_id || nudged_this_round.contains(&sibling_id) {
                            continue;
                        }
                        let sibling_y = {
                            let nodes = canvas.all_nodes();
                            match nodes.iter().find(|n| n.id == sibling_id) {
                                Some(n) => n.position.y,
                                None => continue,
                            }
                        };
                        let sibling_original = *original_y.get(&sibling_id).unwrap_or(&sibling_y);
                        if (sibling_y + shift - sibling_original).abs() > MAX_DISPLACEMENT {
                            continue;
                        }
                        let leapfrogged = (direction > 0.0 && sibling_y >= node_y_before_shift)
                            || (direction < 0.0 && sibling_y <= node_y_before_shift);
                        if !leapfrogged {
                            continue;
                        }
                        let new_sibling_y = (sibling_y + shift).round();
                        let mut nodes = canvas.all_nodes_mut();
                        if let Some(sibling) = nodes.iter_mut().find(|n| n.id == sibling_id) {
                            sibling.position.y = new_sibling_y;
                        }
                        nudged_this_round.insert(sibling_id);
                    }
                }
            }
        }

        if nudged_this_round.is_empty() {
            break;
        }
    }

    if total_nudges > 0 {
        tracing::debug!(total_nudges, "avoider applied nudges to clear connector paths");
    }

    total_nudges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Factory, Machine, Network, Node, NodeType};

    fn sized_node(id: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        let mut node = Node::new(id, NodeType::Process).unwrap();
        node.position.x = x;
        node.position.y = y;
        node.size.width = w;
        node.size.height = h;
        node
    }

    #[test]
    fn below_threshold_skips_entirely() {
        let a = sized_node("a", 0.0, 0.0, 100.0, 50.0);
        let b = sized_node("b", 200.0, 0.0, 100.0, 50.0);
        let machine = Machine::new("m").unwrap().with_nodes([a, b]);
        let mut canvas = Canvas::new("t").with_networks([Network::new("n")
            .unwrap()
            .with_factories([Factory::new("f").unwrap().with_machines([machine])])]);
        assert_eq!(avoid_connectors(&mut canvas), 0);
    }

    #[test]
    fn unrelated_node_blocking_path_is_nudged_clear() {
        let a = sized_node("a", 0.0, 0.0, 100.0, 50.0).with_outputs(["c".to_string()]);
        let c = sized_node("c", 400.0, 0.0, 100.0, 50.0).with_inputs(["a".to_string()]);
        let b = sized_node("b", 200.0, 10.0, 80.0, 40.0);

        let m1 = Machine::new("m1").unwrap().with_nodes([a]);
        let m2 = Machine::new("m2").unwrap().with_nodes([b]);
        let m3 = Machine::new("m3").unwrap().with_nodes([c]);
        let mut canvas = Canvas::new("t").with_networks([Network::new("n").unwrap().with_factories([
            Factory::new("f").unwrap().with_machines([m1, m2, m3]),
        ])]);

        let before_y = canvas
            .all_nodes()
            .iter()
            .find(|n| n.id == "b")
            .unwrap()
            .position
            .y;
        let nudges = avoid_connectors(&mut canvas);
        assert!(nudges > 0);
        let after_y = canvas
            .all_nodes()
            .iter()
            .find(|n| n.id == "b")
            .unwrap()
            .position
            .y;
        assert!((after_y - before_y).abs() <= MAX_DISPLACEMENT);

        let b_node = canvas.all_nodes().into_iter().find(|n| n.id == "b").unwrap().clone();
        let a_node = canvas.all_nodes().into_iter().find(|n| n.id == "a").unwrap().clone();
        let c_node = canvas.all_nodes().into_iter().find(|n| n.id == "c").unwrap().clone();
        let path = sample_connector(&a_node, &c_node, BEZIER_STEPS).points;
        assert!(!node_intersects_path(
            b_node.position.x,
            b_node.position.y,
            b_node.size.width,
            b_node.size.height,
            &path
        ));
    }

    #[test]
    fn x_coordinates_are_never_touched() {
        let a = sized_node("a", 0.0, 0.0, 100.0, 50.0).with_outputs(["c".to_string()]);
        let c = sized_node("c", 400.0, 0.0, 100.0, 50.0).with_inputs(["a".to_string()]);
        let b = sized_node("b", 200.0, 10.0, 80.0, 40.0);
        let m1 = Machine::new("m1").unwrap().with_nodes([a]);
        let m2 = Machine::new("m2").unwrap().with_nodes([b]);
        let m3 = Machine::new("m3").unwrap().with_nodes([c]);
        let mut canvas = Canvas::new("t").with_networks([Network::new("n").unwrap().with_factories([
            Factory::new("f").unwrap().with_machines([m1, m2, m3]),
        ])]);

        let before_x: Vec<f64> = canvas.all_nodes().iter().map(|n| n.position.x).collect();
        avoid_connectors(&mut canvas);
        let after_x: Vec<f64> = canvas.all_nodes().iter().map(|n| n.position.x).collect();
        assert_eq!(before_x, after_x);
    }
}
