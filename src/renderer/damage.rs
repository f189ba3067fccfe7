//! Damage tracking for the frame pipeline
//!
//! The compositor only repaints what changed. Two accumulators are kept:
//!
//! 1. **Content damage**: the area the scene graph must repaint and present.
//! 2. **Background damage**: the area the base layer (wallpaper, top bar,
//!    dock) must repaint before the scene is drawn over it.
//!
//! Every invalidation feeds both, because any change to an element may expose
//! background that was hidden beneath it. Each accumulator is a single
//! bounding rectangle: cheap to union, cheap to clip against.
//!
//! # Example
//!
//! ```
//! use mithl_compositor::renderer::damage::{DamageTracker, Rect};
//!
//! let mut damage = DamageTracker::new();
//! damage.invalidate(Rect::new(10, 10, 50, 50));
//! damage.invalidate(Rect::new(100, 10, 20, 20));
//!
//! assert_eq!(damage.content(), Rect::new(10, 10, 110, 50));
//! assert_eq!(damage.background(), damage.content());
//! ```

use serde::{Deserialize, Serialize};

/// A screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offsets this point by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned integer rectangle.
///
/// A rectangle with zero (or negative) width or height is *empty*: it covers
/// no pixels, never intersects anything and never widens a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// The canonical empty rectangle.
    pub const EMPTY: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from two corners, in any order
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let x = x1.min(x2);
        let y = y1.min(y2);
        Self {
            x,
            y,
            width: x1.max(x2).saturating_sub(x),
            height: y1.max(y2).saturating_sub(y),
        }
    }

    /// Exclusive right edge, clamped at `i32::MAX`.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, clamped at `i32::MAX`.
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered (0 for empty rectangles).
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Checks if this rectangle contains a point. The right and bottom edges
    /// are exclusive.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Checks if this rectangle completely contains another one
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Two rectangles intersect if they share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Computes the overlap of two rectangles.
    ///
    /// Returns `None` if they don't intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }

        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Some(Rect::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1)))
    }

    /// Smallest rectangle covering both operands.
    ///
    /// If either operand is empty the other is returned unchanged, so an
    /// empty rectangle is the identity of this operation.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
    }

    /// Moves the rectangle by `(dx, dy)`, keeping its size.
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Same size, new origin.
    pub const fn with_origin(&self, x: i32, y: i32) -> Rect {
        Rect::new(x, y, self.width, self.height)
    }
}

/// Accumulates the content and background damage of one frame.
#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    content: Rect,
    background: Rect,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `rect` as needing repaint.
    ///
    /// Empty rectangles are ignored. Otherwise the rectangle is folded into
    /// both the content and the background accumulator.
    pub fn invalidate(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.content = self.content.union(&rect);
        self.background = self.background.union(&rect);
    }

    /// Marks only the base layer as needing repaint.
    pub fn invalidate_background(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        self.background = self.background.union(&rect);
    }

    /// Marks the area vacated and newly covered by a moved element.
    pub fn invalidate_move(&mut self, old: Rect, new: Rect) {
        self.invalidate(old.union(&new));
    }

    pub fn content(&self) -> Rect {
        self.content
    }

    pub fn background(&self) -> Rect {
        self.background
    }

    pub fn has_content_damage(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn has_background_damage(&self) -> bool {
        !self.background.is_empty()
    }

    /// Takes the background accumulator, leaving it empty.
    pub fn take_background(&mut self) -> Rect {
        std::mem::take(&mut self.background)
    }

    /// Takes the content accumulator, leaving it empty.
    pub fn take_content(&mut self) -> Rect {
        std::mem::take(&mut self.content)
    }

    /// Clears both accumulators after a present.
    pub fn clear(&mut self) {
        self.content = Rect::EMPTY;
        self.background = Rect::EMPTY;
    }
}
