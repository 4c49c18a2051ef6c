//! Grid items, grid dimensions, and the validated [`Layout`] set.

use std::ops::Deref;

use gridtile_core::geometry::Rect;
use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::occupancy::OccupancyGrid;

/// Column count of the reference dashboard.
pub const DEFAULT_COLS: u16 = 12;

/// Fixed-column, bounded-row grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDims {
    pub cols: u16,
    pub max_rows: u16,
}

impl GridDims {
    #[must_use]
    pub const fn new(cols: u16, max_rows: u16) -> Self {
        Self { cols, max_rows }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn capacity(self) -> u32 {
        self.cols as u32 * self.max_rows as u32
    }

    /// Whether a rectangle lies entirely inside the grid.
    #[must_use]
    pub const fn contains(self, rect: &Rect) -> bool {
        rect.fits_within(self.cols, self.max_rows)
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, 10)
    }
}

fn one() -> u16 {
    1
}

/// A placed widget footprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridItem {
    pub id: String,
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
    #[serde(default = "one")]
    pub min_w: u16,
    #[serde(default = "one")]
    pub min_h: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u16>,
}

impl GridItem {
    /// Item at `rect` with minimum size 1×1 and no maximum.
    #[must_use]
    pub fn new(id: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: id.into(),
            x: rect.x,
            y: rect.y,
            w: rect.width,
            h: rect.height,
            min_w: 1,
            min_h: 1,
            max_w: None,
            max_h: None,
        }
    }

    /// Set the declared minimum size.
    #[must_use]
    pub fn with_min(mut self, min_w: u16, min_h: u16) -> Self {
        self.min_w = min_w;
        self.min_h = min_h;
        self
    }

    /// Set the declared maximum size.
    #[must_use]
    pub fn with_max(mut self, max_w: Option<u16>, max_h: Option<u16>) -> Self {
        self.max_w = max_w;
        self.max_h = max_h;
        self
    }

    /// Footprint as a zone.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Replace position and size.
    #[inline]
    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.width;
        self.h = rect.height;
    }

    /// Copy of this item moved to `(x, y)`.
    #[must_use]
    pub fn moved_to(&self, x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }

    #[inline]
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.w as u32 * self.h as u32
    }

    /// Smallest footprint the item may be shrunk to.
    #[inline]
    #[must_use]
    pub const fn min_area(&self) -> u32 {
        self.min_w as u32 * self.min_h as u32
    }

    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.h)
    }

    /// Clamp a requested size into the item's min/max declaration.
    #[must_use]
    pub fn clamp_size(&self, width: u16, height: u16) -> (u16, u16) {
        let mut w = width.max(self.min_w);
        let mut h = height.max(self.min_h);
        if let Some(max_w) = self.max_w {
            w = w.min(max_w.max(self.min_w));
        }
        if let Some(max_h) = self.max_h {
            h = h.min(max_h.max(self.min_h));
        }
        (w, h)
    }

    /// Whether the item accepts a footprint of `width × height`.
    #[must_use]
    pub fn accepts_size(&self, width: u16, height: u16) -> bool {
        self.clamp_size(width, height) == (width, height)
    }

    /// Check the item's own size declaration.
    pub fn validate_size(&self) -> Result<(), LayoutError> {
        let invalid = |reason| LayoutError::InvalidSize {
            id: self.id.clone(),
            width: self.w,
            height: self.h,
            reason,
        };
        if self.min_w == 0 || self.min_h == 0 {
            return Err(invalid("minimum size must be at least 1x1"));
        }
        if self.max_w.is_some_and(|max| max < self.min_w)
            || self.max_h.is_some_and(|max| max < self.min_h)
        {
            return Err(invalid("maximum size is below minimum size"));
        }
        if self.w < self.min_w || self.h < self.min_h {
            return Err(invalid("below minimum size"));
        }
        if self.max_w.is_some_and(|max| self.w > max) || self.max_h.is_some_and(|max| self.h > max)
        {
            return Err(invalid("above maximum size"));
        }
        Ok(())
    }

    /// Check size declaration and grid bounds.
    pub fn validate(&self, dims: GridDims) -> Result<(), LayoutError> {
        self.validate_size()?;
        if !dims.contains(&self.rect()) {
            return Err(LayoutError::OutOfBounds {
                id: self.id.clone(),
                rect: self.rect(),
                cols: dims.cols,
                max_rows: dims.max_rows,
            });
        }
        Ok(())
    }
}

/// Check every invariant a returned layout must satisfy: unique ids, valid
/// sizes, grid bounds, and no overlap.
pub fn validate_items(items: &[GridItem], dims: GridDims) -> Result<(), LayoutError> {
    let mut grid = OccupancyGrid::empty(dims.cols, dims.max_rows);
    for (index, item) in items.iter().enumerate() {
        if items[..index].iter().any(|other| other.id == item.id) {
            return Err(LayoutError::DuplicateId {
                id: item.id.clone(),
            });
        }
        item.validate(dims)?;
        let rect = item.rect();
        if !grid.can_fit(rect.x, rect.y, rect.width, rect.height) {
            let first = items[..index]
                .iter()
                .find(|other| other.rect().overlaps(&rect))
                .map(|other| other.id.clone())
                .unwrap_or_default();
            return Err(LayoutError::Overlap {
                first,
                second: item.id.clone(),
            });
        }
        grid.mark(rect);
    }
    Ok(())
}

/// Largest `y + h` across items (0 for an empty slice).
#[must_use]
pub fn max_bottom(items: &[GridItem]) -> u16 {
    items.iter().map(GridItem::bottom).max().unwrap_or(0)
}

/// Position of the item with `id`.
#[must_use]
pub fn index_of(items: &[GridItem], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id == id)
}

/// An item set keyed by unique id.
///
/// Order carries no meaning for the layout itself but is preserved so every
/// operation stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout(Vec<GridItem>);

impl Layout {
    /// Build a layout, rejecting duplicate ids.
    pub fn new(items: Vec<GridItem>) -> Result<Self, LayoutError> {
        for (index, item) in items.iter().enumerate() {
            if items[..index].iter().any(|other| other.id == item.id) {
                return Err(LayoutError::DuplicateId {
                    id: item.id.clone(),
                });
            }
        }
        Ok(Self(items))
    }

    /// Build a layout that satisfies every at-rest invariant for `dims`.
    pub fn validated(items: Vec<GridItem>, dims: GridDims) -> Result<Self, LayoutError> {
        validate_items(&items, dims)?;
        Ok(Self(items))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Check bounds, sizes, and overlap against `dims`.
    pub fn validate(&self, dims: GridDims) -> Result<(), LayoutError> {
        validate_items(&self.0, dims)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&GridItem> {
        self.0.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn items(&self) -> &[GridItem] {
        &self.0
    }

    #[must_use]
    pub fn into_items(self) -> Vec<GridItem> {
        self.0
    }

    /// Append an item, rejecting a duplicate id.
    pub fn insert(&mut self, item: GridItem) -> Result<(), LayoutError> {
        if self.contains(&item.id) {
            return Err(LayoutError::DuplicateId { id: item.id });
        }
        self.0.push(item);
        Ok(())
    }

    /// Remove and return the item with `id`.
    pub fn remove(&mut self, id: &str) -> Option<GridItem> {
        let index = index_of(&self.0, id)?;
        Some(self.0.remove(index))
    }

    #[must_use]
    pub fn max_bottom(&self) -> u16 {
        max_bottom(&self.0)
    }
}

impl Deref for Layout {
    type Target = [GridItem];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Layout> for Vec<GridItem> {
    fn from(layout: Layout) -> Self {
        layout.0
    }
}
