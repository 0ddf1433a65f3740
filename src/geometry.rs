//! Geometry - safe-zone and overlap arithmetic shared by the layout rules.
//!
//! Rectangles with a negative width or height are never inside a zone and
//! never overlap anything. They are not an error.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in canvas pixels. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Negative extents or non-finite coordinates.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        !finite || self.width < 0.0 || self.height < 0.0
    }
}

/// Margins measured inwards from each canvas edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SafeZone {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl SafeZone {
    pub fn contains(&self, rect: &Rect, canvas_w: f64, canvas_h: f64) -> bool {
        is_within_safe_zone(
            rect, self.top, self.bottom, self.left, self.right, canvas_w, canvas_h,
        )
    }
}

/// True iff `rect` lies entirely inside
/// `[left, canvas_w - right] x [top, canvas_h - bottom]`.
pub fn is_within_safe_zone(
    rect: &Rect,
    top_margin: f64,
    bottom_margin: f64,
    left_margin: f64,
    right_margin: f64,
    canvas_w: f64,
    canvas_h: f64,
) -> bool {
    if rect.is_degenerate() {
        return false;
    }

    rect.x >= left_margin
        && rect.y >= top_margin
        && rect.right() <= canvas_w - right_margin
        && rect.bottom() <= canvas_h - bottom_margin
}

/// Axis-aligned overlap. Rectangles that only share an edge do not overlap.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }

    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}
