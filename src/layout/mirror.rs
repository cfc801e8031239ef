// Reflect a subtree across a vertical axis.
//
// Width is part of the reflection so a box keeps the same visual distance to
// the axis on the other side. Reflecting twice across the same axis is the
// identity.

use std::collections::HashSet;

use crate::model::topology::descendants_of;
use crate::model::{Edge, Node, NodeId};
use super::{node_size, LayoutConfig};

/// `x' = 2 * axis - x - width`
pub fn mirror_x(x: f64, width: f64, axis_x: f64) -> f64 {
    2.0 * axis_x - x - width
}

/// Mirror every strict descendant of `root_id`. The root itself and anything
/// outside its subtree are left untouched.
pub fn mirror_subtree(nodes: &mut [Node], root_id: &NodeId, edges: &[Edge], axis_x: f64, cfg: &LayoutConfig) {
    let subtree: HashSet<NodeId> = descendants_of(root_id, edges).into_iter().collect();
    for node in nodes.iter_mut().filter(|n| subtree.contains(&n.id)) {
        let width = node_size(node, cfg).width;
        node.position.x = mirror_x(node.position.x, width, axis_x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeData, Point, Size};

    fn make_graph() -> (Vec<Node>, Vec<Edge>) {
        let mut wide = Node::new("d", Point::new(700.0, 40.0), NodeData::new("d", "#fff"));
        wide.measured = Some(Size { width: 320.0, height: 48.0 });
        let nodes = vec![
            Node::new("r", Point::new(0.0, 0.0), NodeData::main("r", "#fff")),
            Node::new("a", Point::new(300.0, 0.0), NodeData::new("a", "#fff")),
            Node::new("b", Point::new(300.0, 100.0), NodeData::new("b", "#fff")),
            Node::new("c", Point::new(600.0, -20.0), NodeData::new("c", "#fff")),
            wide,
        ];
        let edges = vec![
            Edge::new("e1", &"r".into(), &"a".into()),
            Edge::new("e2", &"r".into(), &"b".into()),
            Edge::new("e3", &"a".into(), &"c".into()),
            Edge::new("e4", &"c".into(), &"d".into()),
        ];
        (nodes, edges)
    }

    #[test]
    fn test_mirror_touches_only_strict_descendants() {
        let cfg = LayoutConfig::default();
        let (mut nodes, edges) = make_graph();
        let before = nodes.clone();
        mirror_subtree(&mut nodes, &"a".into(), &edges, 100.0, &cfg);

        // Root of the operation, its parent and its sibling stay put
        assert_eq!(nodes[0], before[0]);
        assert_eq!(nodes[1], before[1]);
        assert_eq!(nodes[2], before[2]);
        // c: 200 - 600 - 200
        assert_eq!(nodes[3].position, Point::new(-600.0, -20.0));
        // d uses its measured width: 200 - 700 - 320
        assert_eq!(nodes[4].position, Point::new(-820.0, 40.0));
    }

    #[test]
    fn test_mirror_twice_is_identity() {
        let cfg = LayoutConfig::default();
        let (mut nodes, edges) = make_graph();
        let before = nodes.clone();
        mirror_subtree(&mut nodes, &"r".into(), &edges, 37.5, &cfg);
        assert_ne!(nodes, before);
        mirror_subtree(&mut nodes, &"r".into(), &edges, 37.5, &cfg);
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_mirror_leaf_is_noop() {
        let cfg = LayoutConfig::default();
        let (mut nodes, edges) = make_graph();
        let before = nodes.clone();
        mirror_subtree(&mut nodes, &"b".into(), &edges, 0.0, &cfg);
        assert_eq!(nodes, before);
    }
}
