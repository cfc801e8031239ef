// Rectangle collision force.
//
// For every unordered pair of boxes that overlap (optionally padded), the
// pair is pushed apart along the axis of least overlap. Each box receives
// `overlap * strength * alpha` of velocity in its direction. Once that push
// drops below `min_push` the pair is moved apart by the whole remaining
// overlap instead, so overlaps reach zero rather than decaying toward it.
// A box pinned on that axis is never pushed or moved.

use crate::model::{NodeId, Point};
use super::Rect;

/// Point mass used by the simulation, in top-left canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Pinned x; the axis is excluded from relaxation while set
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    pub width: f64,
    pub height: f64,
}

impl SimNode {
    pub fn new(id: NodeId, position: Point, width: f64, height: f64) -> Self {
        Self { id, x: position.x, y: position.y, vx: 0.0, vy: 0.0, fx: None, fy: None, width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect { x: self.x, y: self.y, w: self.width, h: self.height }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl SimNode {
    fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    fn pinned_on(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.fx.is_some(),
            Axis::Y => self.fy.is_some(),
        }
    }

    fn set_start(&mut self, axis: Axis, v: f64) {
        match axis {
            Axis::X => self.x = v,
            Axis::Y => self.y = v,
        }
    }

    fn push(&mut self, axis: Axis, dv: f64) {
        match axis {
            Axis::X => self.vx += dv,
            Axis::Y => self.vy += dv,
        }
    }
}

/// Move `lo` and `hi` apart until they just touch, `lo` ending before `hi`.
fn separate(nodes: &mut [SimNode], lo: usize, hi: usize, axis: Axis, overlap: f64, padding: f64) {
    let gap = nodes[lo].extent(axis) + 2.0 * padding;
    match (nodes[lo].pinned_on(axis), nodes[hi].pinned_on(axis)) {
        (true, true) => {}
        (true, false) => {
            let at = nodes[lo].start(axis) + gap;
            nodes[hi].set_start(axis, at);
        }
        (false, true) => {
            let at = nodes[hi].start(axis) - gap;
            nodes[lo].set_start(axis, at);
        }
        (false, false) => {
            let at = nodes[lo].start(axis) - overlap / 2.0;
            nodes[lo].set_start(axis, at);
            nodes[hi].set_start(axis, at + gap);
        }
    }
}

/// Apply one round of the collision force to `nodes`.
pub fn rect_collide(nodes: &mut [SimNode], alpha: f64, padding: f64, strength: f64, min_push: f64) {
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let a = nodes[i].rect().padded(padding);
            let b = nodes[j].rect().padded(padding);
            if !a.overlaps(&b) {
                continue;
            }

            // Minimum translation: move along the cheaper axis
            let (axis, overlap, a_first) = if a.overlap_x(&b) < a.overlap_y(&b) {
                (Axis::X, a.overlap_x(&b), a.center_x() < b.center_x())
            } else {
                (Axis::Y, a.overlap_y(&b), a.center_y() < b.center_y())
            };
            let (lo, hi) = if a_first { (i, j) } else { (j, i) };

            let shift = overlap * strength * alpha;
            if shift < min_push {
                separate(nodes, lo, hi, axis, overlap, padding);
                continue;
            }
            if !nodes[lo].pinned_on(axis) {
                nodes[lo].push(axis, -shift);
            }
            if !nodes[hi].pinned_on(axis) {
                nodes[hi].push(axis, shift);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim_node(id: &str, x: f64, y: f64) -> SimNode {
        SimNode::new(NodeId::from(id), Point::new(x, y), 200.0, 48.0)
    }

    #[test]
    fn test_pushes_along_least_overlap() {
        // x overlap 150, y overlap 38: vertical push
        let mut nodes = vec![sim_node("a", 0.0, 0.0), sim_node("b", 50.0, 10.0)];
        rect_collide(&mut nodes, 1.0, 0.0, 0.2, 0.5);

        assert_eq!(nodes[0].vx, 0.0);
        assert!(nodes[0].vy < 0.0);
        assert!(nodes[1].vy > 0.0);
        assert!((nodes[1].vy - 38.0 * 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_push() {
        // x overlap 20, y overlap 48
        let mut nodes = vec![sim_node("a", 0.0, 0.0), sim_node("b", 180.0, 0.0)];
        rect_collide(&mut nodes, 0.5, 0.0, 0.2, 0.5);
        assert!((nodes[0].vx + 2.0).abs() < 1e-9);
        assert!((nodes[1].vx - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pinned_axis_is_not_pushed() {
        let mut nodes = vec![sim_node("a", 0.0, 0.0), sim_node("b", 50.0, 10.0)];
        nodes[0].fy = Some(0.0);
        rect_collide(&mut nodes, 1.0, 0.0, 0.2, 0.5);
        assert_eq!(nodes[0].vy, 0.0);
        assert!(nodes[1].vy > 0.0);
    }

    #[test]
    fn test_disjoint_boxes_untouched_unless_padded() {
        let mut nodes = vec![sim_node("a", 0.0, 0.0), sim_node("b", 0.0, 52.0)];
        rect_collide(&mut nodes, 1.0, 0.0, 0.2, 0.5);
        assert_eq!(nodes[1].vy, 0.0);

        rect_collide(&mut nodes, 1.0, 4.0, 0.2, 0.5);
        assert!(nodes[1].vy > 0.0);
    }

    #[test]
    fn test_small_overlap_is_closed_in_one_step() {
        // y overlap 2: the push would be 0.4, below the minimum
        let mut nodes = vec![sim_node("a", 0.0, 0.0), sim_node("b", 0.0, 46.0)];
        rect_collide(&mut nodes, 1.0, 0.0, 0.2, 0.5);
        assert_eq!(nodes[0].y, -1.0);
        assert_eq!(nodes[1].y, 47.0);
        assert_eq!(nodes[0].rect().overlap_area(&nodes[1].rect()), 0.0);
        assert_eq!(nodes[1].vy, 0.0);
    }

    #[test]
    fn test_small_overlap_moves_only_the_free_box() {
        let mut nodes = vec![sim_node("a", 0.0, 46.0), sim_node("b", 0.0, 0.0)];
        nodes[1].fy = Some(0.0);
        rect_collide(&mut nodes, 1.0, 0.0, 0.2, 0.5);
        assert_eq!(nodes[1].y, 0.0);
        assert_eq!(nodes[0].y, 48.0);
    }
}
