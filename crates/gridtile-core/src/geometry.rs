#![forbid(unsafe_code)]

//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// A rectangle on the widget grid, measured in cells.
///
/// Used for item footprints, drop previews, push targets, and fit queries.
/// Uses grid coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    #[serde(rename = "w")]
    pub width: u16,
    /// Height in cells.
    #[serde(rename = "h")]
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.width as u32 * self.height as u32
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether two rectangles share at least one cell.
    ///
    /// Touching edges do not overlap.
    #[inline]
    pub const fn overlaps(&self, other: &Rect) -> bool {
        !(self.x >= other.right()
            || self.right() <= other.x
            || self.y >= other.bottom()
            || self.bottom() <= other.y)
    }

    /// Whether the rectangle lies entirely inside a `cols × rows` grid.
    #[inline]
    pub const fn fits_within(&self, cols: u16, rows: u16) -> bool {
        self.x as u32 + self.width as u32 <= cols as u32
            && self.y as u32 + self.height as u32 <= rows as u32
    }

    /// Same size, new origin.
    #[inline]
    #[must_use]
    pub const fn with_position(self, x: u16, y: u16) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    /// Same origin, new size.
    #[inline]
    #[must_use]
    pub const fn with_size(self, width: u16, height: u16) -> Self {
        Self::new(self.x, self.y, width, height)
    }

    /// Overlapping region, or `None` when the rectangles are disjoint.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{} {}x{})", self.x, self.y, self.width, self.height)
    }
}
