use serde::{Deserialize, Serialize};

use crate::constants::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH};

/// Window geometry in host units. Origin may be negative or off-screen; the
/// host clips, the engine does not.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "w")]
    pub width: f64,
    #[serde(rename = "h")]
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeEdge::Left | ResizeEdge::TopLeft | ResizeEdge::BottomLeft
        )
    }

    fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeEdge::Right | ResizeEdge::TopRight | ResizeEdge::BottomRight
        )
    }

    fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeEdge::Top | ResizeEdge::TopLeft | ResizeEdge::TopRight
        )
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeEdge::Bottom | ResizeEdge::BottomLeft | ResizeEdge::BottomRight
        )
    }
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect anchored at the origin covering `size`.
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns a copy with the given size, clamped to the minimum window
    /// size. `x`/`y` keep their current values when `None`.
    pub fn resize(&self, width: f64, height: f64, x: Option<f64>, y: Option<f64>) -> Rect {
        Rect {
            x: x.unwrap_or(self.x),
            y: y.unwrap_or(self.y),
            width: width.max(MIN_WINDOW_WIDTH),
            height: height.max(MIN_WINDOW_HEIGHT),
        }
    }

    /// Returns a copy translated by `(dx, dy)`. No bounds clamp.
    pub fn move_by(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Applies a drag delta to one edge or corner, keeping the opposite edge
    /// anchored. When the minimum size kicks in on a left/top drag the origin
    /// is pulled back so the right/bottom edge stays put.
    pub fn resize_from_edge(&self, edge: ResizeEdge, dx: f64, dy: f64) -> Rect {
        let mut x = self.x;
        let mut y = self.y;
        let mut width = self.width;
        let mut height = self.height;

        if edge.moves_left() {
            x += dx;
            width -= dx;
        } else if edge.moves_right() {
            width += dx;
        }
        if edge.moves_top() {
            y += dy;
            height -= dy;
        } else if edge.moves_bottom() {
            height += dy;
        }

        if width < MIN_WINDOW_WIDTH {
            if edge.moves_left() {
                x -= MIN_WINDOW_WIDTH - width;
            }
            width = MIN_WINDOW_WIDTH;
        }
        if height < MIN_WINDOW_HEIGHT {
            if edge.moves_top() {
                y -= MIN_WINDOW_HEIGHT - height;
            }
            height = MIN_WINDOW_HEIGHT;
        }

        self.resize(width, height, Some(x), Some(y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_clamps_to_minimum() {
        let r = Rect::new(10.0, 20.0, 400.0, 300.0).resize(50.0, 50.0, None, None);
        assert_eq!(r, Rect::new(10.0, 20.0, 200.0, 150.0));
    }

    #[test]
    fn resize_takes_explicit_origin() {
        let r = Rect::new(10.0, 20.0, 400.0, 300.0).resize(500.0, 350.0, Some(-5.0), None);
        assert_eq!(r, Rect::new(-5.0, 20.0, 500.0, 350.0));
    }

    #[test]
    fn direct_construction_is_not_clamped() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(r.width, 1.0);
        assert_eq!(r.height, 1.0);
    }

    #[test]
    fn move_by_allows_offscreen() {
        let r = Rect::new(10.0, 10.0, 300.0, 200.0).move_by(-50.0, 25.0);
        assert_eq!(r, Rect::new(-40.0, 35.0, 300.0, 200.0));
    }

    #[test]
    fn right_edge_drag_grows_width_only() {
        let r = Rect::new(100.0, 100.0, 300.0, 200.0).resize_from_edge(ResizeEdge::Right, 40.0, 99.0);
        assert_eq!(r, Rect::new(100.0, 100.0, 340.0, 200.0));
    }

    #[test]
    fn top_left_drag_keeps_bottom_right_anchored() {
        let start = Rect::new(100.0, 100.0, 300.0, 200.0);
        let r = start.resize_from_edge(ResizeEdge::TopLeft, 20.0, 10.0);
        assert_eq!(r, Rect::new(120.0, 110.0, 280.0, 190.0));
        assert_eq!(r.right(), start.right());
        assert_eq!(r.bottom(), start.bottom());
    }

    #[test]
    fn left_drag_past_minimum_pins_right_edge() {
        let start = Rect::new(100.0, 100.0, 300.0, 200.0);
        let r = start.resize_from_edge(ResizeEdge::Left, 250.0, 0.0);
        assert_eq!(r.width, 200.0);
        assert_eq!(r.right(), start.right());
    }

    #[test]
    fn bottom_drag_past_minimum_keeps_origin() {
        let r = Rect::new(0.0, 0.0, 300.0, 200.0).resize_from_edge(ResizeEdge::Bottom, 0.0, -190.0);
        assert_eq!(r, Rect::new(0.0, 0.0, 300.0, 150.0));
    }
}
