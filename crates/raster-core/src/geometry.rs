//! Points, rectangles and display-to-canvas coordinate mapping

use serde::{Deserialize, Serialize};

/// A point in canvas, preview or display space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height in (possibly fractional) pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeF {
    pub width: f64,
    pub height: f64,
}

impl SizeF {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectF {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanned by two corners, whatever the drag direction
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment test, edges count as inside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// On-screen rectangle of the canvas element, in viewport pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Maps pointer coordinates between display space and canvas pixel space
///
/// The canvas backing store is usually rendered at a different size than it
/// is displayed, so each axis carries its own scale factor
/// (`backing / displayed`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    display: DisplayRect,
    backing_width: f64,
    backing_height: f64,
}

impl CoordinateMapper {
    pub fn new(display: DisplayRect, backing_width: u32, backing_height: u32) -> Self {
        Self {
            display,
            backing_width: backing_width as f64,
            backing_height: backing_height as f64,
        }
    }

    fn is_degenerate(&self) -> bool {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        !(usable(self.display.width) && usable(self.display.height))
    }

    /// Convert a viewport coordinate to canvas pixels
    ///
    /// Returns `None` when the element has no displayed area; callers treat
    /// that as a no-op.
    pub fn to_canvas(&self, client: Point) -> Option<Point> {
        if self.is_degenerate() {
            return None;
        }
        let scale_x = self.backing_width / self.display.width;
        let scale_y = self.backing_height / self.display.height;
        Some(Point::new(
            (client.x - self.display.left) * scale_x,
            (client.y - self.display.top) * scale_y,
        ))
    }

    /// Convert a canvas pixel coordinate back to viewport pixels
    pub fn to_display(&self, canvas: Point) -> Option<Point> {
        if self.is_degenerate() || self.backing_width <= 0.0 || self.backing_height <= 0.0 {
            return None;
        }
        let scale_x = self.display.width / self.backing_width;
        let scale_y = self.display.height / self.backing_height;
        Some(Point::new(
            self.display.left + canvas.x * scale_x,
            self.display.top + canvas.y * scale_y,
        ))
    }
}
