//! Connector geometry: port selection and cubic bezier sampling.
//!
//! Grounded directly on `original_source/src/canvas_mcp/organize.py::_sample_bezier_path`,
//! which itself mirrors the renderer's `_determine_port`/`_draw_bezier_connection`. The
//! `B(t)` evaluation style follows the teacher's quadratic bezier evaluation in
//! `regviz_app/src/graph/edge.rs` one degree up.

use crate::geom::Rect;
use crate::model::Node;

/// Which side of a node a connector attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Top,
    Bottom,
    Left,
    Right,
}

/// A sampled point along a connector path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

/// The resolved endpoints, control points, and sampled polyline for one connector.
#[derive(Debug, Clone)]
pub struct ConnectorPath {
    pub start_port: Port,
    pub end_port: Port,
    pub start: PathPoint,
    pub end: PathPoint,
    pub control1: PathPoint,
    pub control2: PathPoint,
    pub points: Vec<PathPoint>,
}

/// Selects ports and samples the cubic bezier between two nodes at `steps + 1`
/// evenly-spaced parameter values.
///
/// Port selection uses the "horizon" rule: a connector is routed vertically only
/// when the vertical gap between node centers exceeds both `1.5 * src.height` and
/// the horizontal gap; otherwise it routes horizontally.
#[must_use]
pub fn sample_connector(src: &Node, dst: &Node, steps: usize) -> ConnectorPath {
    let src_rect = Rect::new(src.position.x, src.position.y, src.size.width, src.size.height);
    let dst_rect = Rect::new(dst.position.x, dst.position.y, dst.size.width, dst.size.height);
    let src_center = src_rect.center();
    let dst_center = dst_rect.center();

    let dx = dst_center.x - src_center.x;
    let dy = dst_center.y - src_center.y;
    let horizon = src.size.height * 1.5;

    let (sx, sy, ex, ey, start_port, end_port) = if dy.abs() > horizon && dy.abs() > dx.abs() {
        if dy > 0.0 {
            (
                src_center.x,
                src_rect.bottom(),
                dst_center.x,
                dst_rect.top(),
                Port::Bottom,
                Port::Top,
            )
        } else {
            (
                src_center.x,
                src_rect.top(),
                dst_center.x,
                dst_rect.bottom(),
                Port::Top,
                Port::Bottom,
            )
        }
    } else if dx >= 0.0 {
        (
            src_rect.right(),
            src_center.y,
            dst_rect.left(),
            dst_center.y,
            Port::Right,
            Port::Left,
        )
    } else {
        (
            src_rect.left(),
            src_center.y,
            dst_rect.right(),
            dst_center.y,
            Port::Left,
            Port::Right,
        )
    };

    let vertical = matches!(start_port, Port::Top | Port::Bottom);
    let (cp1x, cp1y, cp2x, cp2y) = if vertical {
        let cp_offset = ((ey - sy).abs() * 0.4).max(40.0);
        let signed = if ey > sy { cp_offset } else { -cp_offset };
        (sx, sy + signed, ex, ey - signed)
    } else {
        let cp_offset = ((ex - sx).abs() * 0.4).max(40.0);
        let signed = if ex > sx { cp_offset } else { -cp_offset };
        (sx + signed, sy, ex - signed, ey)
    };

    let points = sample_cubic_bezier(
        PathPoint { x: sx, y: sy },
        PathPoint { x: cp1x, y: cp1y },
        PathPoint { x: cp2x, y: cp2y },
        PathPoint { x: ex, y: ey },
        steps,
    );

    ConnectorPath {
        start_port,
        end_port,
        start: PathPoint { x: sx, y: sy },
        end: PathPoint { x: ex, y: ey },
        control1: PathPoint { x: cp1x, y: cp1y },
        control2: PathPoint { x: cp2x, y: cp2y },
        points,
    }
}

/// Evaluates a cubic bezier at `steps + 1` evenly spaced values of `t` in `[0, 1]`.
#[must_use]
pub fn sample_cubic_bezier(
    p0: PathPoint,
    p1: PathPoint,
    p2: PathPoint,
    p3: PathPoint,
    steps: usize,
) -> Vec<PathPoint> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let mt = 1.0 - t;
            let x = mt.powi(3) * p0.x
                + 3.0 * mt.powi(2) * t * p1.x
                + 3.0 * mt * t.powi(2) * p2.x
                + t.powi(3) * p3.x;
            let y = mt.powi(3) * p0.y
                + 3.0 * mt.powi(2) * t * p1.y
                + 3.0 * mt * t.powi(2) * p2.y
                + t.powi(3) * p3.y;
            PathPoint { x, y }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    fn positioned(id: &str, x: f64, y: f64, w: f64, h: f64) -> Node {
        let mut node = Node::new(id, NodeType::Process).unwrap();
        node.position.x = x;
        node.position.y = y;
        node.size.width = w;
        node.size.height = h;
        node
    }

    #[test]
    fn horizontal_neighbors_route_left_to_right() {
        let src = positioned("a", 0.0, 0.0, 100.0, 50.0);
        let dst = positioned("b", 300.0, 0.0, 100.0, 50.0);
        let path = sample_connector(&src, &dst, 24);
        assert_eq!(path.start_port, Port::Right);
        assert_eq!(path.end_port, Port::Left);
        assert_eq!(path.points.len(), 25);
    }

    #[test]
    fn far_vertical_neighbor_routes_top_to_bottom() {
        let src = positioned("a", 0.0, 0.0, 100.0, 50.0);
        let dst = positioned("b", 0.0, 500.0, 100.0, 50.0);
        let path = sample_connector(&src, &dst, 24);
        assert_eq!(path.start_port, Port::Bottom);
        assert_eq!(path.end_port, Port::Top);
    }

    #[test]
    fn endpoints_match_first_and_last_sample() {
        let src = positioned("a", 0.0, 0.0, 100.0, 50.0);
        let dst = positioned("b", 300.0, 20.0, 100.0, 50.0);
        let path = sample_connector(&src, &dst, 10);
        let first = path.points.first().unwrap();
        let last = path.points.last().unwrap();
        assert!((first.x - path.start.x).abs() < 1e-9);
        assert!((last.x - path.end.x).abs() < 1e-9);
    }
}
