//! Dragging the fitted subject inside its placement slot

use raster_core::{Point, RectF};

/// Clamp one axis so `[start, start + extent]` stays inside `[min, max]`
///
/// A slot narrower than the extent pins the start to `min`.
fn clamp_axis(start: f64, extent: f64, min: f64, max: f64) -> f64 {
    let upper = max - extent;
    if upper < min {
        min
    } else {
        start.clamp(min, upper)
    }
}

/// Keep a subject of `target` size at `placement` inside `slot`
pub fn clamp_placement(placement: Point, target: (u32, u32), slot: RectF) -> Point {
    Point::new(
        clamp_axis(placement.x, target.0 as f64, slot.x, slot.right()),
        clamp_axis(placement.y, target.1 as f64, slot.y, slot.bottom()),
    )
}

/// Top-left position that centers a subject of `target` size in `slot`
pub fn centered_placement(target: (u32, u32), slot: RectF) -> Point {
    let centered = Point::new(
        slot.x + (slot.width - target.0 as f64) / 2.0,
        slot.y + (slot.height - target.1 as f64) / 2.0,
    );
    clamp_placement(centered, target, slot)
}

/// Tracks a drag gesture on the subject
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragController {
    dragging: bool,
    offset: Point,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Begin a drag if `pointer` lies on the subject's box (edges included)
    pub fn pointer_down(&mut self, pointer: Point, placement: Point, target: (u32, u32)) -> bool {
        let bounds = RectF::new(placement.x, placement.y, target.0 as f64, target.1 as f64);
        if !bounds.contains(pointer) {
            return false;
        }
        self.dragging = true;
        self.offset = Point::new(pointer.x - placement.x, pointer.y - placement.y);
        true
    }

    /// New placement for `pointer`, or `None` when no drag is in progress
    pub fn pointer_move(&self, pointer: Point, target: (u32, u32), slot: RectF) -> Option<Point> {
        if !self.dragging {
            return None;
        }
        let placement = Point::new(pointer.x - self.offset.x, pointer.y - self.offset.y);
        Some(clamp_placement(placement, target, slot))
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }
}
