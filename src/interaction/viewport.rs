use serde::{Deserialize, Serialize};

use crate::model::Point;

/// Pan/zoom transform between screen pixels and canvas units.
///
/// `screen = canvas * zoom + (x, y)`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom: Self::clamp_zoom(zoom) }
    }

    fn clamp_zoom(zoom: f64) -> f64 {
        if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 }
    }

    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        let zoom = Self::clamp_zoom(self.zoom);
        Point::new((screen.x - self.x) / zoom, (screen.y - self.y) / zoom)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        let zoom = Self::clamp_zoom(self.zoom);
        Point::new(canvas.x * zoom + self.x, canvas.y * zoom + self.y)
    }

    /// A screen distance expressed in canvas units.
    pub fn screen_len(&self, px: f64) -> f64 {
        px / Self::clamp_zoom(self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let vp = Viewport::default();
        assert_eq!(vp.screen_to_canvas(Point::new(12.0, -4.0)), Point::new(12.0, -4.0));
    }

    #[test]
    fn test_pan_and_zoom() {
        let vp = Viewport::new(100.0, 50.0, 2.0);
        let canvas = vp.screen_to_canvas(Point::new(300.0, 150.0));
        assert_eq!(canvas, Point::new(100.0, 50.0));
        assert_eq!(vp.canvas_to_screen(canvas), Point::new(300.0, 150.0));
        assert_eq!(vp.screen_len(40.0), 20.0);
    }

    #[test]
    fn test_invalid_zoom_falls_back() {
        let vp = Viewport::new(0.0, 0.0, 0.0);
        assert_eq!(vp.zoom, 1.0);
    }
}
