// Layout geometry for the mind-map canvas.
//
// Submodules:
// - validate: which parent -> child edges may be created
// - edges: handle/hub presentation derived from positions and tree shape
// - path: SVG path data for branch edges
// - mirror: reflect a subtree across a vertical axis
// - collide / simulation: rectangle collision relaxation while dragging
// - placement: vertical slot search for new children
// - spatial_grid: broad phase for hover-candidate lookup
//
// All coordinates are canvas-space, top-left anchored.

use serde::{Deserialize, Serialize};

use crate::model::{Node, Size};

pub mod collide;
pub mod edges;
pub mod mirror;
pub mod path;
pub mod placement;
pub mod simulation;
pub mod spatial_grid;
pub mod validate;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn right(&self) -> f64 { self.x + self.w }
    pub fn bottom(&self) -> f64 { self.y + self.h }
    pub fn center_x(&self) -> f64 { self.x + self.w / 2.0 }
    pub fn center_y(&self) -> f64 { self.y + self.h / 2.0 }

    /// Grow on every side by `p`.
    pub fn padded(&self, p: f64) -> Rect {
        Rect { x: self.x - p, y: self.y - p, w: self.w + 2.0 * p, h: self.h + 2.0 * p }
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Length of the x-axis intersection, 0 when disjoint.
    pub fn overlap_x(&self, other: &Rect) -> f64 {
        (self.right().min(other.right()) - self.x.max(other.x)).max(0.0)
    }

    pub fn overlap_y(&self, other: &Rect) -> f64 {
        (self.bottom().min(other.bottom()) - self.y.max(other.y)).max(0.0)
    }

    pub fn overlap_area(&self, other: &Rect) -> f64 {
        self.overlap_x(other) * self.overlap_y(other)
    }

    /// Horizontal gap between the boxes, 0 when their x-ranges intersect.
    pub fn gap_x(&self, other: &Rect) -> f64 {
        (other.x - self.right()).max(self.x - other.right()).max(0.0)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect { x: x0, y: y0, w: x1 - x0, h: y1 - y0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Size used when the renderer has not measured a node yet.
    pub node_size: Size,
    /// Horizontal distance from a source handle to the branch hub.
    pub hub_offset: f64,
    /// Horizontal distance from a source node to a child created off a handle.
    pub child_offset_x: f64,
    /// Extra vertical clearance between stacked siblings.
    pub sibling_margin: f64,
    /// Step used when searching for a free vertical slot.
    pub search_step: f64,
    /// Bail-out for the slot search.
    pub max_search_steps: usize,
    /// Corner radius of branch edge paths.
    pub edge_corner_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_size: Size { width: 200.0, height: 48.0 },
            hub_offset: 50.0,
            child_offset_x: 300.0,
            sibling_margin: 16.0,
            search_step: 8.0,
            max_search_steps: 500,
            edge_corner_radius: 12.0,
        }
    }
}

/// Measured size, or the configured default.
pub fn node_size(node: &Node, cfg: &LayoutConfig) -> Size {
    node.measured.unwrap_or(cfg.node_size)
}

pub fn node_rect(node: &Node, cfg: &LayoutConfig) -> Rect {
    let size = node_size(node, cfg);
    Rect { x: node.position.x, y: node.position.y, w: size.width, h: size.height }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeData, Point};

    #[test]
    fn test_rect_overlap_needs_both_axes() {
        let a = Rect { x: 0.0, y: 0.0, w: 100.0, h: 50.0 };
        let b = Rect { x: 50.0, y: 25.0, w: 100.0, h: 50.0 };
        let c = Rect { x: 50.0, y: 60.0, w: 100.0, h: 50.0 };
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.overlap_x(&b), 50.0);
        assert_eq!(a.overlap_y(&b), 25.0);
        assert_eq!(a.overlap_area(&c), 0.0);
    }

    #[test]
    fn test_touching_is_not_overlap() {
        let a = Rect { x: 0.0, y: 0.0, w: 100.0, h: 50.0 };
        let b = Rect { x: 100.0, y: 0.0, w: 100.0, h: 50.0 };
        assert!(!a.overlaps(&b));
        assert!(a.padded(1.0).overlaps(&b));
        assert_eq!(a.gap_x(&b), 0.0);
    }

    #[test]
    fn test_node_rect_falls_back_to_default_size() {
        let cfg = LayoutConfig::default();
        let mut n = Node::new("a", Point::new(10.0, 20.0), NodeData::new("a", "#fff"));
        assert_eq!(node_rect(&n, &cfg), Rect { x: 10.0, y: 20.0, w: 200.0, h: 48.0 });

        n.measured = Some(Size { width: 120.0, height: 40.0 });
        assert_eq!(node_rect(&n, &cfg).w, 120.0);
    }

    #[test]
    fn test_union() {
        let a = Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 };
        let b = Rect { x: 20.0, y: -5.0, w: 10.0, h: 10.0 };
        assert_eq!(a.union(&b), Rect { x: 0.0, y: -5.0, w: 30.0, h: 15.0 });
    }
}
