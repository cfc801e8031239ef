//! The authoritative node/edge collections.
//!
//! Every write goes through a method here. `connect` is the only place edges
//! are added, and it is what keeps the tree single-parent and acyclic.

use super::topology::{ancestors_of, find_node};
use super::{Edge, EdgeId, Node, NodeData, NodeId, Point, Size};
use crate::error::{Error, Result};
use crate::layout::edges::refresh_edges;
use crate::layout::mirror::mirror_subtree;
use crate::layout::validate::{validate_connection, Rejection, ValidationPolicy};
use crate::layout::LayoutConfig;

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Suffix counter for generated ids
    seq: u64,
}

impl GraphStore {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges, seq: 0 }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Re-derive handles and hubs of every edge. Returns true if any changed.
    pub fn refresh_presentation(&mut self, cfg: &LayoutConfig) -> bool {
        refresh_edges(&mut self.edges, &self.nodes, cfg)
    }

    /// Reflect every strict descendant of `root` across `axis_x`.
    pub fn mirror_subtree(&mut self, root: &NodeId, axis_x: f64, cfg: &LayoutConfig) {
        mirror_subtree(&mut self.nodes, root, &self.edges, axis_x, cfg);
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        find_node(id, &self.nodes)
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    pub fn next_node_id(&mut self, now_ms: f64) -> NodeId {
        loop {
            self.seq += 1;
            let id = NodeId(format!("node_{}_{}", now_ms as i64, self.seq));
            if !self.contains(&id) {
                return id;
            }
        }
    }

    pub fn next_edge_id(&mut self, source: &NodeId, target: &NodeId, now_ms: f64) -> EdgeId {
        let base = format!("e-{}-{}-{}", source, target, now_ms as i64);
        let mut id = EdgeId(base.clone());
        while self.edge(&id).is_some() {
            self.seq += 1;
            id = EdgeId(format!("{}-{}", base, self.seq));
        }
        id
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Create a standalone node at `position` and return its id.
    pub fn create_node(&mut self, position: Point, data: NodeData, now_ms: f64) -> NodeId {
        let id = self.next_node_id(now_ms);
        self.nodes.push(Node { id: id.clone(), position, measured: None, data, graph_id: None });
        id
    }

    /// Remove a node and every edge touching it. Its children become parentless.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        let idx = self
            .nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        self.edges.retain(|e| !e.touches(id));
        Ok(self.nodes.remove(idx))
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<Edge> {
        let idx = self
            .edges
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| Error::EdgeNotFound(id.clone()))?;
        Ok(self.edges.remove(idx))
    }

    pub fn set_position(&mut self, id: &NodeId, position: Point) -> Result<()> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Shift every listed node by the same delta. Unknown ids are skipped.
    pub fn translate(&mut self, ids: &[NodeId], dx: f64, dy: f64) {
        for node in self.nodes.iter_mut().filter(|n| ids.contains(&n.id)) {
            node.position = node.position.offset(dx, dy);
        }
    }

    pub fn set_measured(&mut self, id: &NodeId, size: Size) -> Result<()> {
        self.node_mut(id)?.measured = Some(size);
        Ok(())
    }

    pub fn update_data(&mut self, id: &NodeId, f: impl FnOnce(&mut NodeData)) -> Result<()> {
        f(&mut self.node_mut(id)?.data);
        Ok(())
    }

    /// Make `source` the parent of `target`.
    ///
    /// Any existing incoming edge of `target` is replaced in the same call, so
    /// there is never a state with two parents or a dropped parent in between.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        policy: ValidationPolicy,
        now_ms: f64,
    ) -> Result<EdgeId> {
        let reject = |reason: Rejection| Error::InvalidConnection {
            source_id: source.clone(),
            target_id: target.clone(),
            reason,
        };

        if !self.contains(source) || !self.contains(target) {
            return Err(reject(Rejection::MissingNode));
        }
        validate_connection(source, target, &self.edges, policy).map_err(reject)?;
        if ancestors_of(source, &self.edges).contains(target) {
            return Err(reject(Rejection::WouldCycle));
        }

        let id = self.next_edge_id(source, target, now_ms);
        self.edges.retain(|e| &e.target != target);
        self.edges.push(Edge::new(id.0.clone(), source, target));
        Ok(id)
    }

    /// Drop the incoming edge of `target`, if any.
    pub fn disconnect(&mut self, target: &NodeId) -> Option<Edge> {
        let idx = self.edges.iter().position(|e| &e.target == target)?;
        Some(self.edges.remove(idx))
    }

    pub fn recolor(&mut self, id: &NodeId, color: &str, text_color: Option<&str>) -> Result<()> {
        self.update_data(id, |d| {
            d.color = color.to_string();
            d.text_color = text_color.map(str::to_string);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::topology::parent_of;

    fn make_store() -> GraphStore {
        let nodes = ["r", "a", "b", "c"]
            .iter()
            .map(|id| Node::new(*id, Point::default(), NodeData::new(*id, "#fff")))
            .collect();
        let edges = vec![
            Edge::new("e-r-a", &"r".into(), &"a".into()),
            Edge::new("e-r-b", &"r".into(), &"b".into()),
        ];
        GraphStore::new(nodes, edges)
    }

    fn incoming(store: &GraphStore, id: &str) -> usize {
        store.edges().iter().filter(|e| e.target.0 == id).count()
    }

    #[test]
    fn test_connect_replaces_existing_parent() {
        let mut store = make_store();
        store.connect(&"c".into(), &"a".into(), ValidationPolicy::Strict, 1000.0).unwrap();
        assert_eq!(incoming(&store, "a"), 1);
        assert_eq!(parent_of(&"a".into(), store.edges()), Some(&NodeId::from("c")));
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn test_connect_rejects_cycle_under_loose_policy() {
        let mut store = make_store();
        store.connect(&"a".into(), &"c".into(), ValidationPolicy::Loose, 1.0).unwrap();
        // a -> c exists, so c -> r would close r -> a -> c -> r
        let err = store.connect(&"c".into(), &"r".into(), ValidationPolicy::Loose, 2.0).unwrap_err();
        assert!(matches!(err, Error::InvalidConnection { reason: Rejection::WouldCycle, .. }));
        assert_eq!(parent_of(&"r".into(), store.edges()), None);
    }

    #[test]
    fn test_connect_missing_node() {
        let mut store = make_store();
        let err = store.connect(&"ghost".into(), &"a".into(), ValidationPolicy::Strict, 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidConnection { reason: Rejection::MissingNode, .. }));
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut store = make_store();
        store.remove_node(&"r".into()).unwrap();
        assert!(store.edges().is_empty());
        assert!(store.contains(&"a".into()));
        assert!(store.remove_node(&"r".into()).is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut store = make_store();
        let a = store.create_node(Point::default(), NodeData::new("x", "#fff"), 5.0);
        let b = store.create_node(Point::default(), NodeData::new("y", "#fff"), 5.0);
        assert_ne!(a, b);
        assert_eq!(a.0, "node_5_1");

        let e1 = store.connect(&"r".into(), &a, ValidationPolicy::Strict, 7.0).unwrap();
        assert_eq!(e1.0, format!("e-r-{}-7", a));
        let e2 = store.next_edge_id(&"r".into(), &a, 7.0);
        assert_ne!(e1, e2);
    }

    #[test]
    fn test_translate_only_listed() {
        let mut store = make_store();
        store.translate(&["a".into(), "b".into()], 10.0, -5.0);
        assert_eq!(store.node(&"a".into()).unwrap().position, Point::new(10.0, -5.0));
        assert_eq!(store.node(&"r".into()).unwrap().position, Point::default());
    }
}
