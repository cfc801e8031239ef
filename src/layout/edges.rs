// Edge presentation: handle ids and hub waypoint for every parent -> child edge.
//
// The values are a pure function of node positions and tree shape. Anything
// persisted with an edge is overwritten here.

use crate::model::topology::{edge_side, find_node, parent_of};
use crate::model::{Edge, EdgeKind, HandleId, Node, Point, Side};
use super::{node_size, LayoutConfig};

/// Root-like nodes (main, or no parent) expose fixed left/right handles.
fn exposes_both_handles(node: &Node, edges: &[Edge]) -> bool {
    node.data.is_main || parent_of(&node.id, edges).is_none()
}

pub fn source_handle(node: &Node, side: Side, edges: &[Edge]) -> HandleId {
    if exposes_both_handles(node, edges) { HandleId::source_for(side) } else { HandleId::SourceSide }
}

pub fn target_handle(node: &Node, side: Side, edges: &[Edge]) -> HandleId {
    if exposes_both_handles(node, edges) { HandleId::target_for(side) } else { HandleId::TargetSide }
}

/// Hub x sits `hub_offset` outside the source's facing border, y on the source's mid line.
pub fn hub_point(source: &Node, side: Side, cfg: &LayoutConfig) -> Point {
    let handle_x = match side {
        Side::Right => source.position.x + node_size(source, cfg).width,
        Side::Left => source.position.x,
    };
    Point {
        x: handle_x + side.sign() * cfg.hub_offset,
        y: source.position.y + cfg.node_size.height / 2.0,
    }
}

/// Recompute handles and hub for one edge. Dangling edges come back unchanged.
pub fn build_edge_presentation(edge: &Edge, nodes: &[Node], edges: &[Edge], cfg: &LayoutConfig) -> Edge {
    let (Some(source), Some(target)) = (find_node(&edge.source, nodes), find_node(&edge.target, nodes)) else {
        return edge.clone();
    };

    let side = edge_side(source, target);
    let mut out = edge.clone();
    out.kind = EdgeKind::Branch;
    out.source_handle = Some(source_handle(source, side, edges));
    out.target_handle = Some(target_handle(target, side, edges));
    out.data.hub = Some(hub_point(source, side, cfg));
    out.data.side = Some(side);
    out
}

/// Pointwise comparison of the derived fields.
pub fn same_presentation(a: &Edge, b: &Edge) -> bool {
    a.kind == b.kind
        && a.source_handle == b.source_handle
        && a.target_handle == b.target_handle
        && a.data.hub == b.data.hub
        && a.data.side == b.data.side
}

/// Rebuild every edge, writing back only the ones whose presentation changed.
/// Returns true if anything was written.
pub fn refresh_edges(edges: &mut [Edge], nodes: &[Node], cfg: &LayoutConfig) -> bool {
    let updated: Vec<Edge> = {
        let all: &[Edge] = edges;
        all.iter().map(|e| build_edge_presentation(e, nodes, all, cfg)).collect()
    };

    let mut changed = false;
    for (slot, next) in edges.iter_mut().zip(updated) {
        if !same_presentation(slot, &next) {
            *slot = next;
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeData, NodeId};

    fn make_nodes() -> Vec<Node> {
        vec![
            Node::new("r", Point::new(0.0, 0.0), NodeData::main("root", "#fff")),
            Node::new("a", Point::new(300.0, 100.0), NodeData::new("a", "#e3f2fd")),
            Node::new("b", Point::new(-300.0, -100.0), NodeData::new("b", "#e3f2fd")),
            Node::new("c", Point::new(600.0, 100.0), NodeData::new("c", "#bbdefb")),
        ]
    }

    fn make_edges() -> Vec<Edge> {
        vec![
            Edge::new("e-r-a", &"r".into(), &"a".into()),
            Edge::new("e-r-b", &"r".into(), &"b".into()),
            Edge::new("e-a-c", &"a".into(), &"c".into()),
        ]
    }

    #[test]
    fn test_right_edge_from_root() {
        let cfg = LayoutConfig::default();
        let nodes = make_nodes();
        let edges = make_edges();
        let e = build_edge_presentation(&edges[0], &nodes, &edges, &cfg);

        assert_eq!(e.data.side, Some(Side::Right));
        assert_eq!(e.source_handle, Some(HandleId::SourceRight));
        assert_eq!(e.target_handle, Some(HandleId::TargetSide));
        // 0 + 200 (width) + 50
        assert_eq!(e.data.hub, Some(Point::new(250.0, 24.0)));
    }

    #[test]
    fn test_left_edge_from_root() {
        let cfg = LayoutConfig::default();
        let nodes = make_nodes();
        let edges = make_edges();
        let e = build_edge_presentation(&edges[1], &nodes, &edges, &cfg);

        assert_eq!(e.data.side, Some(Side::Left));
        assert_eq!(e.source_handle, Some(HandleId::SourceLeft));
        assert_eq!(e.data.hub, Some(Point::new(-50.0, 24.0)));
    }

    #[test]
    fn test_child_with_parent_uses_side_handle() {
        let cfg = LayoutConfig::default();
        let nodes = make_nodes();
        let edges = make_edges();
        let e = build_edge_presentation(&edges[2], &nodes, &edges, &cfg);

        assert_eq!(e.source_handle, Some(HandleId::SourceSide));
        assert_eq!(e.target_handle, Some(HandleId::TargetSide));
        assert_eq!(e.data.hub, Some(Point::new(550.0, 124.0)));
    }

    #[test]
    fn test_dangling_edge_passes_through() {
        let cfg = LayoutConfig::default();
        let nodes = make_nodes();
        let edges = vec![Edge::new("e-r-ghost", &"r".into(), &NodeId::from("ghost"))];
        let e = build_edge_presentation(&edges[0], &nodes, &edges, &cfg);
        assert_eq!(e, edges[0]);
    }

    #[test]
    fn test_refresh_is_stable() {
        let cfg = LayoutConfig::default();
        let nodes = make_nodes();
        let mut edges = make_edges();

        assert!(refresh_edges(&mut edges, &nodes, &cfg));
        let snapshot = edges.clone();
        // Same positions, same shape: nothing to write
        assert!(!refresh_edges(&mut edges, &nodes, &cfg));
        assert_eq!(edges, snapshot);
    }

    #[test]
    fn test_refresh_detects_moved_source() {
        let cfg = LayoutConfig::default();
        let mut nodes = make_nodes();
        let mut edges = make_edges();
        refresh_edges(&mut edges, &nodes, &cfg);

        nodes[1].position.x = -600.0;
        assert!(refresh_edges(&mut edges, &nodes, &cfg));
        assert_eq!(edges[0].data.side, Some(Side::Left));
        assert_eq!(edges[0].source_handle, Some(HandleId::SourceLeft));
    }
}
