// Tree queries over the node/edge collections.
//
// Everything here is a pure function of the slices passed in. Nothing is
// cached: callers pass the current collections every time.
//
// The tree relies on the single-parent invariant (a node has at most one
// incoming edge). `GraphStore::connect` is what keeps it true.

use std::collections::{HashSet, VecDeque};

use super::{Edge, Node, NodeId, Side};
use crate::layout::{node_rect, LayoutConfig};

/// Source of the unique incoming edge, if any.
pub fn parent_of<'a>(id: &NodeId, edges: &'a [Edge]) -> Option<&'a NodeId> {
    edges.iter().find(|e| &e.target == id).map(|e| &e.source)
}

/// Direct children in edge order.
pub fn children_of<'a>(id: &NodeId, edges: &'a [Edge]) -> Vec<&'a NodeId> {
    edges.iter().filter(|e| &e.source == id).map(|e| &e.target).collect()
}

/// Walk up the parent chain, nearest ancestor first.
///
/// Acyclicity is the store's job; the visited set only guarantees termination
/// if a cycle slipped in through hand-built edge lists.
pub fn ancestors_of(id: &NodeId, edges: &[Edge]) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen: HashSet<&NodeId> = HashSet::new();
    seen.insert(id);

    let mut current = parent_of(id, edges);
    while let Some(p) = current {
        if !seen.insert(p) {
            break;
        }
        out.push(p.clone());
        current = parent_of(p, edges);
    }
    out
}

/// Breadth-first walk over outgoing edges. Never contains `id` itself.
pub fn descendants_of(id: &NodeId, edges: &[Edge]) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    seen.insert(id.clone());

    let mut queue: VecDeque<NodeId> = VecDeque::new();
    queue.push_back(id.clone());

    while let Some(current) = queue.pop_front() {
        for edge in edges.iter().filter(|e| e.source == current) {
            if seen.insert(edge.target.clone()) {
                out.push(edge.target.clone());
                queue.push_back(edge.target.clone());
            }
        }
    }
    out
}

/// Both nodes have a parent and it is the same one.
pub fn are_siblings(a: &NodeId, b: &NodeId, edges: &[Edge]) -> bool {
    match (parent_of(a, edges), parent_of(b, edges)) {
        (Some(pa), Some(pb)) => pa == pb,
        _ => false,
    }
}

/// Topological root: the end of the ancestor chain, or the node itself.
pub fn root_of(id: &NodeId, edges: &[Edge]) -> NodeId {
    ancestors_of(id, edges).pop().unwrap_or_else(|| id.clone())
}

pub fn find_node<'a>(id: &NodeId, nodes: &'a [Node]) -> Option<&'a Node> {
    nodes.iter().find(|n| &n.id == id)
}

/// Side of a node relative to its topological root.
///
/// This is the one side rule of the engine: the node's box centre against the
/// root's box centre, `Left` iff strictly less. Parentless nodes have no side.
pub fn side_of(id: &NodeId, nodes: &[Node], edges: &[Edge], cfg: &LayoutConfig) -> Option<Side> {
    parent_of(id, edges)?;
    let node = find_node(id, nodes)?;
    let root = find_node(&root_of(id, edges), nodes)?;
    Some(side_against_axis(node_rect(node, cfg).center_x(), node_rect(root, cfg).center_x()))
}

/// Side of a box centre against a vertical axis.
pub fn side_against_axis(center_x: f64, axis_x: f64) -> Side {
    if center_x < axis_x { Side::Left } else { Side::Right }
}

/// Which way an edge runs: left iff the target starts left of the source.
pub fn edge_side(source: &Node, target: &Node) -> Side {
    if target.position.x < source.position.x { Side::Left } else { Side::Right }
}
