//! Minimal 2D geometry primitives used by the layout engine.
//!
//! The teacher crate leans on `iced::{Point, Rectangle, Vector}` for this kind of
//! arithmetic; this engine has no rendering surface to share a dependency with, so the
//! same small set of operations is reimplemented directly on `f64`.

/// A point in unscaled canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Contracts the rectangle by `margin` on every side (a negative margin expands it).
    #[must_use]
    pub fn contract(&self, margin: f64) -> Rect {
        Rect::new(
            self.x + margin,
            self.y + margin,
            (self.width - 2.0 * margin).max(0.0),
            (self.height - 2.0 * margin).max(0.0),
        )
    }

    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Tracks the minimum rectangle enclosing a growing set of points/rectangles.
///
/// Mirrors `regviz_app::graph::layout::BoundsTracker`.
#[derive(Debug, Clone)]
pub struct BoundsTracker {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
    has_content: bool,
}

impl Default for BoundsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            has_content: false,
        }
    }

    pub fn include_rect(&mut self, rect: Rect) {
        if !rect.x.is_finite() || !rect.y.is_finite() {
            return;
        }
        self.min_x = self.min_x.min(rect.x);
        self.min_y = self.min_y.min(rect.y);
        self.max_x = self.max_x.max(rect.x + rect.width);
        self.max_y = self.max_y.max(rect.y + rect.height);
        self.has_content = true;
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// Finishes the accumulation, returning `None` if nothing was ever included.
    #[must_use]
    pub fn finish(self) -> Option<Rect> {
        if !self.has_content {
            return None;
        }
        Some(Rect::new(
            self.min_x,
            self.min_y,
            (self.max_x - self.min_x).max(1.0),
            (self.max_y - self.min_y).max(1.0),
        ))
    }
}
