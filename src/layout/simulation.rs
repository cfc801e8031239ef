// Collision-avoidance simulation that runs while a node is dragged.
//
// The simulation keeps its own copy of every node as a point mass. Dragged
// nodes are pinned (fx/fy) and follow the pointer; everything else is relaxed
// by `rect_collide`. Energy (`alpha`) moves toward `alpha_target` by
// `alpha_decay` each tick. While dragging the target is kept above zero; on
// release it drops to zero and the layout coasts to rest.
//
// Lifecycle is explicit: `start` reheats, `stop` releases pins and lets it
// cool, `dispose` drops all state. `tick` is cheap when cold.

use serde::{Deserialize, Serialize};

use crate::model::{Node, NodeId, Point, Size};
use super::collide::{rect_collide, SimNode};
use super::{node_size, LayoutConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fraction of the overlap applied per push.
    pub strength: f64,
    /// Padding around each box for the overlap test.
    pub padding: f64,
    /// Pushes smaller than this, in canvas units, close the overlap outright.
    pub min_push: f64,
    /// Per-tick approach of alpha toward its target.
    pub alpha_decay: f64,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f64,
    /// Below this the simulation is considered at rest.
    pub alpha_min: f64,
    /// Energy target held while a drag is in progress.
    pub drag_alpha_target: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            strength: 0.2,
            padding: 0.0,
            min_push: 0.5,
            alpha_decay: 0.02,
            velocity_decay: 0.4,
            alpha_min: 0.001,
            drag_alpha_target: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    cfg: SimulationConfig,
    nodes: Vec<SimNode>,
    alpha: f64,
    alpha_target: f64,
}

impl Simulation {
    pub fn new(cfg: SimulationConfig) -> Self {
        Self { cfg, nodes: Vec::new(), alpha: 0.0, alpha_target: 0.0 }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, id: &NodeId) -> Option<&SimNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut SimNode> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    /// At rest and not being driven.
    pub fn is_idle(&self) -> bool {
        self.alpha < self.cfg.alpha_min && self.alpha_target < self.cfg.alpha_min
    }

    /// Rebuild the point masses from the store. Velocities of nodes that were
    /// already present are kept; pins are cleared.
    pub fn sync(&mut self, nodes: &[Node], layout: &LayoutConfig) {
        let previous = std::mem::take(&mut self.nodes);
        self.nodes = nodes
            .iter()
            .map(|n| {
                let size = node_size(n, layout);
                let mut sim = SimNode::new(n.id.clone(), n.position, size.width, size.height);
                if let Some(old) = previous.iter().find(|p| p.id == n.id) {
                    sim.vx = old.vx;
                    sim.vy = old.vy;
                }
                sim
            })
            .collect();
    }

    /// Add a node created after the last `sync`, or refresh one already known.
    pub fn insert(&mut self, node: &Node, layout: &LayoutConfig) {
        let size = node_size(node, layout);
        match self.node_mut(&node.id) {
            Some(n) => {
                n.width = size.width;
                n.height = size.height;
            }
            None => self.nodes.push(SimNode::new(node.id.clone(), node.position, size.width, size.height)),
        }
        self.place(&node.id, node.position);
    }

    /// Forget a node. Returns false for unknown ids.
    pub fn remove(&mut self, id: &NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| &n.id != id);
        self.nodes.len() != before
    }

    /// Move a node to a position set from outside. Velocity is dropped and a
    /// pinned node's pin follows.
    pub fn place(&mut self, id: &NodeId, at: Point) {
        if let Some(n) = self.node_mut(id) {
            n.x = at.x;
            n.y = at.y;
            n.vx = 0.0;
            n.vy = 0.0;
            if n.fx.is_some() {
                n.fx = Some(at.x);
            }
            if n.fy.is_some() {
                n.fy = Some(at.y);
            }
        }
    }

    pub fn resize(&mut self, id: &NodeId, size: Size) {
        if let Some(n) = self.node_mut(id) {
            n.width = size.width;
            n.height = size.height;
        }
    }

    /// Reheat for an interactive drag.
    pub fn start(&mut self) {
        self.alpha_target = self.cfg.drag_alpha_target;
        self.alpha = self.alpha.max(self.cfg.drag_alpha_target);
    }

    /// Release every pin and let the layout cool down.
    pub fn stop(&mut self) {
        self.unpin_all();
        self.alpha_target = 0.0;
    }

    /// Drop all simulation state.
    pub fn dispose(&mut self) {
        self.nodes.clear();
        self.alpha = 0.0;
        self.alpha_target = 0.0;
    }

    /// Pin a node on both axes. Returns false for unknown ids.
    pub fn pin(&mut self, id: &NodeId, at: Point) -> bool {
        match self.node_mut(id) {
            Some(n) => {
                n.fx = Some(at.x);
                n.fy = Some(at.y);
                n.x = at.x;
                n.y = at.y;
                n.vx = 0.0;
                n.vy = 0.0;
                true
            }
            None => false,
        }
    }

    pub fn unpin(&mut self, id: &NodeId) {
        if let Some(n) = self.node_mut(id) {
            n.fx = None;
            n.fy = None;
        }
    }

    pub fn unpin_all(&mut self) {
        for n in &mut self.nodes {
            n.fx = None;
            n.fy = None;
        }
    }

    pub fn pinned(&self, id: &NodeId) -> Option<Point> {
        let n = self.node(id)?;
        Some(Point::new(n.fx?, n.fy?))
    }

    /// One relaxation step. Returns the new positions of unpinned nodes that moved.
    pub fn tick(&mut self) -> Vec<(NodeId, Point)> {
        if self.is_idle() {
            return Vec::new();
        }

        self.alpha += (self.alpha_target - self.alpha) * self.cfg.alpha_decay;
        rect_collide(&mut self.nodes, self.alpha, self.cfg.padding, self.cfg.strength, self.cfg.min_push);

        let keep = 1.0 - self.cfg.velocity_decay;
        let mut moved = Vec::new();
        for n in &mut self.nodes {
            let before = n.position();
            match n.fx {
                Some(fx) => {
                    n.x = fx;
                    n.vx = 0.0;
                }
                None => {
                    n.vx *= keep;
                    n.x += n.vx;
                }
            }
            match n.fy {
                Some(fy) => {
                    n.y = fy;
                    n.vy = 0.0;
                }
                None => {
                    n.vy *= keep;
                    n.y += n.vy;
                }
            }
            if !n.is_pinned() && n.position() != before {
                moved.push((n.id.clone(), n.position()));
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeData;

    fn make_nodes() -> Vec<Node> {
        vec![
            Node::new("a", Point::new(0.0, 0.0), NodeData::new("a", "#fff")),
            Node::new("b", Point::new(50.0, 10.0), NodeData::new("b", "#fff")),
            Node::new("far", Point::new(5000.0, 5000.0), NodeData::new("far", "#fff")),
        ]
    }

    fn make_sim() -> Simulation {
        let mut sim = Simulation::new(SimulationConfig::default());
        sim.sync(&make_nodes(), &LayoutConfig::default());
        sim
    }

    fn overlap(sim: &Simulation) -> f64 {
        sim.nodes()[0].rect().overlap_area(&sim.nodes()[1].rect())
    }

    #[test]
    fn test_cold_tick_is_noop() {
        let mut sim = make_sim();
        assert!(sim.is_idle());
        assert!(sim.tick().is_empty());
        assert_eq!(sim.nodes()[1].position(), Point::new(50.0, 10.0));
    }

    #[test]
    fn test_overlap_shrinks_to_zero() {
        let mut sim = make_sim();
        sim.start();
        sim.stop();

        let mut prev = overlap(&sim);
        assert!(prev > 0.0);
        let mut steps = 0;
        while overlap(&sim) > 0.0 {
            sim.tick();
            let now = overlap(&sim);
            assert!(now < prev, "overlap did not shrink at step {}", steps);
            prev = now;
            steps += 1;
            assert!(steps < 100);
        }
    }

    #[test]
    fn test_pinned_node_never_moves() {
        let mut sim = make_sim();
        sim.start();
        assert!(sim.pin(&"a".into(), Point::new(0.0, 0.0)));

        let start = overlap(&sim);
        for _ in 0..100 {
            let moved = sim.tick();
            assert!(moved.iter().all(|(id, _)| id.0 != "a"));
            assert_eq!(sim.node(&"a".into()).unwrap().position(), Point::new(0.0, 0.0));
        }
        // b alone absorbs the push and is nearly clear of the pinned box
        assert!(overlap(&sim) < start * 0.01);
    }

    #[test]
    fn test_stop_releases_pins_and_cools() {
        let mut sim = make_sim();
        sim.start();
        sim.pin(&"a".into(), Point::new(10.0, 10.0));
        assert_eq!(sim.pinned(&"a".into()), Some(Point::new(10.0, 10.0)));
        sim.pin(&"b".into(), Point::new(50.0, 10.0));
        sim.unpin(&"b".into());
        assert_eq!(sim.pinned(&"b".into()), None);
        assert!(sim.node(&"a".into()).unwrap().is_pinned());

        sim.stop();
        assert_eq!(sim.pinned(&"a".into()), None);
        assert_eq!(sim.alpha_target(), 0.0);

        let mut ticks = 0;
        while !sim.is_idle() {
            sim.tick();
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert!(sim.tick().is_empty());
    }

    #[test]
    fn test_dispose_clears_state() {
        let mut sim = make_sim();
        sim.start();
        sim.dispose();
        assert!(sim.nodes().is_empty());
        assert_eq!(sim.alpha(), 0.0);
        assert!(sim.is_idle());
    }

    #[test]
    fn test_outside_edits_reach_the_simulation() {
        let mut sim = make_sim();
        sim.start();
        sim.stop();

        // b leaves, so nothing overlaps a any more
        assert!(sim.remove(&"b".into()));
        assert!(!sim.remove(&"b".into()));
        assert!(sim.tick().is_empty());

        sim.place(&"far".into(), Point::new(7.0, 9.0));
        assert_eq!(sim.node(&"far".into()).unwrap().position(), Point::new(7.0, 9.0));

        let late = Node::new("late", Point::new(100.0, 0.0), NodeData::new("late", "#fff"));
        sim.insert(&late, &LayoutConfig::default());
        sim.resize(&"late".into(), Size { width: 80.0, height: 20.0 });
        let n = sim.node(&"late".into()).unwrap();
        assert_eq!((n.width, n.height), (80.0, 20.0));
        assert_eq!(sim.nodes().len(), 3);
    }
}
