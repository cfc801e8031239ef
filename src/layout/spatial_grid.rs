// Spatial hash grid for hover-candidate lookup.
//
// Node boxes are bucketed into square cells so a drag sample only looks at
// nodes near the pointer instead of the whole canvas.

use super::Rect;
use std::collections::{HashMap, HashSet};

/// A spatial hash grid mapping cells to item indices.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Size of each cell in the grid.
    cell_size: f64,
    /// Map from cell coordinates to the items overlapping that cell.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Cell size should be roughly the size of the largest expected item.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    /// Build a grid over `rects`, keyed by their index in the slice.
    pub fn from_rects(cell_size: f64, rects: &[Rect]) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, r) in rects.iter().enumerate() {
            grid.insert(idx, r);
        }
        grid
    }

    fn cell_of(&self, v: f64) -> i64 {
        (v / self.cell_size).floor() as i64
    }

    /// Cells a rectangle touches.
    fn cell_range(&self, rect: &Rect) -> Vec<(i64, i64)> {
        let (min_x, max_x) = (self.cell_of(rect.x), self.cell_of(rect.right()));
        let (min_y, max_y) = (self.cell_of(rect.y), self.cell_of(rect.bottom()));

        let mut cells = Vec::new();
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                cells.push((cx, cy));
            }
        }
        cells
    }

    pub fn insert(&mut self, idx: usize, rect: &Rect) {
        for cell in self.cell_range(rect) {
            self.cells.entry(cell).or_default().push(idx);
        }
    }

    /// Items sharing a cell with `rect`, deduplicated, ascending.
    /// May include false positives; callers do the exact test.
    pub fn query(&self, rect: &Rect) -> Vec<usize> {
        let mut seen: HashSet<usize> = HashSet::new();
        for cell in self.cell_range(rect) {
            if let Some(items) = self.cells.get(&cell) {
                seen.extend(items.iter().copied());
            }
        }
        let mut out: Vec<usize> = seen.into_iter().collect();
        out.sort_unstable();
        out
    }
}
