// Built-in mind map shown when nothing could be loaded.

use crate::model::{Edge, Node, NodeData, Point};

const COLOR_MAIN: &str = "#ffffff";
const COLOR_SUB: &str = "#e3f2fd";
const COLOR_SUB2: &str = "#bbdefb";

pub const SEED_GRAPH_ID: &str = "seed";

// (id, x, y, text, color, is_main)
const NODES: [(&str, f64, f64, &str, &str, bool); 10] = [
    ("school", -700.0, -200.0, "School", COLOR_MAIN, true),
    ("visual-essay", -400.0, -250.0, "Visual essay", COLOR_SUB, false),
    ("interactive-design", -400.0, -150.0, "Interactive design", COLOR_SUB, false),
    ("typography", -400.0, -50.0, "Advanced typography", COLOR_SUB, false),
    ("motion-graphics", -400.0, 50.0, "Motion graphics", COLOR_SUB, false),
    ("typography-mid", -100.0, -100.0, "Midterm", COLOR_SUB2, false),
    ("typography-final", -100.0, 0.0, "Final", COLOR_SUB2, false),
    ("motion-mid-poster", -100.0, 50.0, "Midterm motion poster", COLOR_SUB2, false),
    ("motion-quiz", -100.0, 100.0, "Quiz prep", COLOR_SUB2, false),
    ("motion-final-team", -100.0, 200.0, "Final team project", COLOR_SUB2, false),
];

const EDGES: [(&str, &str, &str); 9] = [
    ("e-school-visual", "school", "visual-essay"),
    ("e-school-interactive", "school", "interactive-design"),
    ("e-school-typography", "school", "typography"),
    ("e-typography-mid", "typography", "typography-mid"),
    ("e-typography-final", "typography", "typography-final"),
    ("e-school-motion", "school", "motion-graphics"),
    ("e-motion-mid", "motion-graphics", "motion-mid-poster"),
    ("e-motion-quiz", "motion-graphics", "motion-quiz"),
    ("e-motion-final", "motion-graphics", "motion-final-team"),
];

/// Seed nodes and bare edges. Edge presentation is filled in by the caller.
pub fn school_mindmap() -> (Vec<Node>, Vec<Edge>) {
    let nodes = NODES
        .iter()
        .map(|&(id, x, y, text, color, is_main)| {
            let data = if is_main { NodeData::main(text, color) } else { NodeData::new(text, color) };
            let mut node = Node::new(id, Point::new(x, y), data);
            node.graph_id = Some(SEED_GRAPH_ID.to_string());
            node
        })
        .collect();
    let edges = EDGES
        .iter()
        .map(|&(id, source, target)| Edge::new(id, &source.into(), &target.into()))
        .collect();
    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::topology::{ancestors_of, parent_of};

    #[test]
    fn test_seed_is_a_single_tree() {
        let (nodes, edges) = school_mindmap();
        assert_eq!(nodes.len(), 10);
        assert_eq!(edges.len(), 9);
        for n in nodes.iter().filter(|n| n.id.0 != "school") {
            assert!(parent_of(&n.id, &edges).is_some(), "{} has no parent", n.id);
            assert_eq!(ancestors_of(&n.id, &edges).last().map(|a| a.0.as_str()), Some("school"));
        }
    }

    #[test]
    fn test_seed_endpoints_exist() {
        let (nodes, edges) = school_mindmap();
        for e in &edges {
            assert!(nodes.iter().any(|n| n.id == e.source));
            assert!(nodes.iter().any(|n| n.id == e.target));
        }
    }
}
