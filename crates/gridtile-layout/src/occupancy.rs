#![forbid(unsafe_code)]

//! Boolean cell matrix derived from placed items.
//!
//! [`OccupancyGrid::can_fit`] is the single placement-legality check of the
//! engine: fit search, repacking, pushing, swapping, and layout validation
//! all go through it instead of testing rectangle overlap ad hoc.

use gridtile_core::geometry::Rect;

use crate::item::GridItem;

/// `cols × rows` occupancy matrix, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    cols: u16,
    rows: u16,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Grid with every cell free.
    #[must_use]
    pub fn empty(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; usize::from(cols) * usize::from(rows)],
        }
    }

    /// Mark every cell covered by `items`, skipping the item whose id is
    /// `exclude`.
    #[must_use]
    pub fn build(items: &[GridItem], cols: u16, rows: u16, exclude: Option<&str>) -> Self {
        let mut grid = Self::empty(cols, rows);
        for item in items {
            if exclude.is_some_and(|id| id == item.id) {
                continue;
            }
            grid.mark(item.rect());
        }
        grid
    }

    /// Like [`build`](Self::build) but skipping every id in `exclude`.
    #[must_use]
    pub fn build_excluding(items: &[GridItem], cols: u16, rows: u16, exclude: &[&str]) -> Self {
        let mut grid = Self::empty(cols, rows);
        for item in items {
            if exclude.contains(&item.id.as_str()) {
                continue;
            }
            grid.mark(item.rect());
        }
        grid
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.cols) + usize::from(x)
    }

    /// Occupancy of one cell; `None` outside the grid.
    #[must_use]
    pub fn cell(&self, x: u16, y: u16) -> Option<bool> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(self.cells[self.index(x, y)])
    }

    /// Mark the in-bounds part of `rect` as occupied.
    pub fn mark(&mut self, rect: Rect) {
        let right = rect.right().min(self.cols);
        let bottom = rect.bottom().min(self.rows);
        for y in rect.y..bottom {
            for x in rect.x..right {
                let index = self.index(x, y);
                self.cells[index] = true;
            }
        }
    }

    /// Whether a `w × h` rectangle at `(x, y)` lies inside the grid and covers
    /// only free cells. Zero-area rectangles never fit.
    #[must_use]
    pub fn can_fit(&self, x: u16, y: u16, w: u16, h: u16) -> bool {
        if w == 0 || h == 0 {
            return false;
        }
        if u32::from(x) + u32::from(w) > u32::from(self.cols)
            || u32::from(y) + u32::from(h) > u32::from(self.rows)
        {
            return false;
        }
        (y..y + h).all(|row| {
            let start = self.index(x, row);
            self.cells[start..start + usize::from(w)]
                .iter()
                .all(|occupied| !occupied)
        })
    }

    /// [`can_fit`](Self::can_fit) for a zone.
    #[inline]
    #[must_use]
    pub fn can_fit_rect(&self, rect: Rect) -> bool {
        self.can_fit(rect.x, rect.y, rect.width, rect.height)
    }

    /// Number of free cells.
    #[must_use]
    pub fn free_cells(&self) -> u32 {
        self.cells.iter().filter(|occupied| !**occupied).count() as u32
    }

    /// Area of the largest all-free rectangle.
    ///
    /// Row-by-row histogram scan, O(cols · rows).
    #[must_use]
    pub fn largest_free_area(&self) -> u32 {
        let cols = usize::from(self.cols);
        let mut heights = vec![0u32; cols];
        let mut best = 0u32;
        let mut stack: Vec<usize> = Vec::with_capacity(cols + 1);
        for y in 0..self.rows {
            for (x, height) in heights.iter_mut().enumerate() {
                let occupied = self.cells[usize::from(y) * cols + x];
                *height = if occupied { 0 } else { *height + 1 };
            }
            stack.clear();
            for x in 0..=cols {
                let current = if x == cols { 0 } else { heights[x] };
                while let Some(&top) = stack.last() {
                    if heights[top] <= current {
                        break;
                    }
                    stack.pop();
                    let width = match stack.last() {
                        Some(&left) => x - left - 1,
                        None => x,
                    };
                    best = best.max(heights[top] * width as u32);
                }
                stack.push(x);
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, x: u16, y: u16, w: u16, h: u16) -> GridItem {
        GridItem::new(id, Rect::new(x, y, w, h))
    }

    #[test]
    fn build_marks_covered_cells() {
        let grid = OccupancyGrid::build(&[item("a", 1, 1, 2, 2)], 4, 4, None);
        assert_eq!(grid.cell(0, 0), Some(false));
        assert_eq!(grid.cell(1, 1), Some(true));
        assert_eq!(grid.cell(2, 2), Some(true));
        assert_eq!(grid.cell(3, 2), Some(false));
        assert_eq!(grid.cell(4, 0), None);
        assert_eq!(grid.free_cells(), 12);
    }

    #[test]
    fn exclude_skips_item() {
        let items = [item("a", 0, 0, 2, 2), item("b", 2, 0, 2, 2)];
        let grid = OccupancyGrid::build(&items, 4, 2, Some("a"));
        assert!(grid.can_fit(0, 0, 2, 2));
        assert!(!grid.can_fit(1, 0, 2, 2));
        let grid = OccupancyGrid::build_excluding(&items, 4, 2, &["a", "b"]);
        assert!(grid.can_fit(0, 0, 4, 2));
    }

    #[test]
    fn out_of_grid_parts_are_ignored() {
        let grid = OccupancyGrid::build(&[item("a", 3, 3, 5, 5)], 4, 4, None);
        assert_eq!(grid.free_cells(), 15);
    }

    #[test]
    fn can_fit_bounds() {
        let grid = OccupancyGrid::empty(12, 10);
        assert!(grid.can_fit(8, 6, 4, 4));
        assert!(!grid.can_fit(9, 6, 4, 4));
        assert!(!grid.can_fit(0, 7, 4, 4));
        assert!(!grid.can_fit(0, 0, 0, 4));
        assert!(!grid.can_fit(u16::MAX, 0, 1, 1));
    }

    #[test]
    fn largest_free_area_finds_maximal_rectangle() {
        // 4x3 grid with a 1x1 blocker in the middle of the top row.
        let grid = OccupancyGrid::build(&[item("a", 1, 0, 1, 1)], 4, 3, None);
        // Rows 1..3 are fully free: 4x2 = 8.
        assert_eq!(grid.largest_free_area(), 8);
        assert_eq!(OccupancyGrid::empty(5, 2).largest_free_area(), 10);
        let full = OccupancyGrid::build(&[item("a", 0, 0, 3, 3)], 3, 3, None);
        assert_eq!(full.largest_free_area(), 0);
    }
}
