// Connection rules for parent -> child edges.
//
// Strict is the default. Loose only forbids self loops and duplicating the
// current parent, and is opt-in through configuration. Cycle prevention is not
// part of either policy: the store refuses cycles unconditionally.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::topology::{ancestors_of, are_siblings, parent_of};
use crate::model::{Edge, NodeId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    #[default]
    Strict,
    Loose,
}

/// Why a proposed `source -> target` edge was refused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    SelfLoop,
    AlreadyParent,
    Siblings,
    /// The target is above the source in its chain
    TargetIsAncestor,
    /// The source is already above the target in its chain
    SourceIsAncestor,
    AlreadyConnected,
    WouldCycle,
    MissingNode,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rejection::SelfLoop => "a node cannot be its own parent",
            Rejection::AlreadyParent => "source is already the target's parent",
            Rejection::Siblings => "source and target are siblings",
            Rejection::TargetIsAncestor => "target is an ancestor of source",
            Rejection::SourceIsAncestor => "source is an ancestor of target",
            Rejection::AlreadyConnected => "nodes are already connected",
            Rejection::WouldCycle => "edge would create a cycle",
            Rejection::MissingNode => "edge endpoint does not exist",
        };
        f.write_str(msg)
    }
}

pub fn validate_connection(
    source: &NodeId,
    target: &NodeId,
    edges: &[Edge],
    policy: ValidationPolicy,
) -> Result<(), Rejection> {
    if source == target {
        return Err(Rejection::SelfLoop);
    }

    match policy {
        ValidationPolicy::Loose => {
            if parent_of(target, edges) == Some(source) {
                return Err(Rejection::AlreadyParent);
            }
        }
        ValidationPolicy::Strict => {
            if are_siblings(source, target, edges) {
                return Err(Rejection::Siblings);
            }
            if ancestors_of(source, edges).contains(target) {
                return Err(Rejection::TargetIsAncestor);
            }
            if ancestors_of(target, edges).contains(source) {
                return Err(Rejection::SourceIsAncestor);
            }
            let already = edges.iter().any(|e| {
                (&e.source == source && &e.target == target) || (&e.source == target && &e.target == source)
            });
            if already {
                return Err(Rejection::AlreadyConnected);
            }
        }
    }
    Ok(())
}

pub fn is_invalid_connection(source: &NodeId, target: &NodeId, edges: &[Edge], policy: ValidationPolicy) -> bool {
    validate_connection(source, target, edges, policy).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(s: &str, t: &str) -> Edge {
        Edge::new(format!("e-{}-{}", s, t), &NodeId::from(s), &NodeId::from(t))
    }

    // r -> a -> c, r -> b
    fn make_tree() -> Vec<Edge> {
        vec![edge("r", "a"), edge("r", "b"), edge("a", "c")]
    }

    fn check(s: &str, t: &str, policy: ValidationPolicy) -> Result<(), Rejection> {
        validate_connection(&s.into(), &t.into(), &make_tree(), policy)
    }

    #[test]
    fn test_self_loop_rejected_by_both_policies() {
        for id in ["r", "a", "c", "unknown"] {
            assert_eq!(check(id, id, ValidationPolicy::Strict), Err(Rejection::SelfLoop));
            assert_eq!(check(id, id, ValidationPolicy::Loose), Err(Rejection::SelfLoop));
        }
    }

    #[test]
    fn test_strict_rules() {
        use ValidationPolicy::Strict;
        assert_eq!(check("a", "b", Strict), Err(Rejection::Siblings));
        assert_eq!(check("c", "r", Strict), Err(Rejection::TargetIsAncestor));
        assert_eq!(check("r", "c", Strict), Err(Rejection::SourceIsAncestor));
        assert_eq!(check("r", "a", Strict), Err(Rejection::SourceIsAncestor));
        // Unrelated nodes are fine
        assert_eq!(check("b", "c", Strict), Ok(()));
        assert_eq!(check("x", "c", Strict), Ok(()));
    }

    #[test]
    fn test_loose_only_blocks_existing_parent() {
        use ValidationPolicy::Loose;
        assert_eq!(check("r", "a", Loose), Err(Rejection::AlreadyParent));
        assert_eq!(check("a", "b", Loose), Ok(()));
        assert_eq!(check("r", "c", Loose), Ok(()));
    }

    #[test]
    fn test_is_invalid_connection() {
        let edges = make_tree();
        assert!(is_invalid_connection(&"a".into(), &"a".into(), &edges, ValidationPolicy::Strict));
        assert!(!is_invalid_connection(&"b".into(), &"c".into(), &edges, ValidationPolicy::Strict));
    }
}
