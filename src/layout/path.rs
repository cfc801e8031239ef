// SVG path data for branch edges.
//
// A branch runs from the source handle to the hub column, along the column,
// then into the target handle. Corners are rounded with quadratic curves.

use std::fmt::Write;

use crate::model::{Node, Point, Side};
use super::{node_rect, LayoutConfig};

/// Middle of the left or right border of a node box.
pub fn handle_anchor(node: &Node, side: Side, cfg: &LayoutConfig) -> Point {
    let r = node_rect(node, cfg);
    let x = match side {
        Side::Left => r.x,
        Side::Right => r.right(),
    };
    Point::new(x, r.center_y())
}

/// Orthogonal waypoints source -> (hub.x, source.y) -> (hub.x, target.y) -> target,
/// with repeated points removed.
pub fn branch_points(source: Point, hub: Point, target: Point) -> Vec<Point> {
    let raw = [source, Point::new(hub.x, source.y), Point::new(hub.x, target.y), target];
    let mut pts: Vec<Point> = Vec::with_capacity(raw.len());
    for p in raw {
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    pts
}

fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Point at `d` along a -> b.
fn toward(a: Point, b: Point, d: f64) -> Point {
    let len = distance(a, b);
    if len < f64::EPSILON {
        return a;
    }
    Point::new(a.x + (b.x - a.x) * d / len, a.y + (b.y - a.y) * d / len)
}

/// Path data for a branch edge. Without a hub the midpoint is used.
pub fn branch_path(source: Point, hub: Option<Point>, target: Point, radius: f64) -> String {
    let hub = hub.unwrap_or(Point::new((source.x + target.x) / 2.0, (source.y + target.y) / 2.0));
    let pts = branch_points(source, hub, target);

    let mut d = String::new();
    let _ = write!(d, "M {} {}", pts[0].x, pts[0].y);

    for i in 1..pts.len() {
        let cur = pts[i];
        if i + 1 == pts.len() {
            let _ = write!(d, " L {} {}", cur.x, cur.y);
            break;
        }
        let prev = pts[i - 1];
        let next = pts[i + 1];
        // Clamp so neighbouring corners never cross
        let r = radius.min(distance(prev, cur) / 2.0).min(distance(cur, next) / 2.0);
        let start = toward(cur, prev, r);
        let end = toward(cur, next, r);
        let _ = write!(d, " L {} {} Q {} {} {} {}", start.x, start.y, cur.x, cur.y, end.x, end.y);
    }
    d
}
