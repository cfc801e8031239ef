// Placement of children created by dragging a handle into empty space.
//
// The new child goes a fixed horizontal distance out from the source on the
// handle's side. Its y starts at the drop point and walks outward in fixed
// steps, upper side first, until it clears every existing child on that side
// by at least one node height plus margin.

use crate::model::topology::{children_of, find_node, side_against_axis};
use crate::model::{Edge, Node, NodeId, Point, Side};
use super::{node_rect, LayoutConfig};

/// Top y of the existing children of `source` lying on `side` of it.
pub fn same_side_children(source: &Node, side: Side, nodes: &[Node], edges: &[Edge], cfg: &LayoutConfig) -> Vec<f64> {
    let axis = node_rect(source, cfg).center_x();
    children_of(&source.id, edges)
        .into_iter()
        .filter_map(|id: &NodeId| find_node(id, nodes))
        .filter(|child| side_against_axis(node_rect(child, cfg).center_x(), axis) == side)
        .map(|child| child.position.y)
        .collect()
}

/// First y, searching outward from `drop_y`, that keeps clear of `obstacles`.
pub fn find_child_y(drop_y: f64, obstacles: &[f64], cfg: &LayoutConfig) -> f64 {
    let clearance = cfg.node_size.height + cfg.sibling_margin;
    let is_clear = |y: f64| obstacles.iter().all(|oy| (oy - y).abs() >= clearance);

    for k in 0..=cfg.max_search_steps {
        let offset = k as f64 * cfg.search_step;
        let upper = drop_y - offset;
        if is_clear(upper) {
            return upper;
        }
        let lower = drop_y + offset;
        if is_clear(lower) {
            return lower;
        }
    }

    // Nothing within range: stack below the lowest child
    let lowest = obstacles.iter().copied().fold(drop_y, f64::max);
    lowest + clearance
}

/// Top-left position for a new child of `source` dropped at canvas y `drop_y`.
pub fn child_position(source: &Node, side: Side, drop_y: f64, nodes: &[Node], edges: &[Edge], cfg: &LayoutConfig) -> Point {
    let obstacles = same_side_children(source, side, nodes, edges, cfg);
    Point {
        x: source.position.x + side.sign() * cfg.child_offset_x,
        y: find_child_y(drop_y, &obstacles, cfg),
    }
}
