//! First-fit and all-fit position search.
//!
//! Both searches scan row-major from the origin (y outer, x inner). The scan
//! order is part of the contract: identical occupancy always yields identical
//! results, so callers may assert exact positions.

use gridtile_core::geometry::Rect;

use crate::occupancy::OccupancyGrid;

/// Top-left-most position where a `w × h` rectangle fits.
#[must_use]
pub fn find_first_fit(grid: &OccupancyGrid, w: u16, h: u16) -> Option<(u16, u16)> {
    candidates(grid, w, h).find(|&(x, y)| grid.can_fit(x, y, w, h))
}

/// Every position where a `w × h` rectangle fits, in scan order.
///
/// Used to render the valid drop targets of an interactive drag.
#[must_use]
pub fn find_all_fits(grid: &OccupancyGrid, w: u16, h: u16) -> Vec<Rect> {
    candidates(grid, w, h)
        .filter(|&(x, y)| grid.can_fit(x, y, w, h))
        .map(|(x, y)| Rect::new(x, y, w, h))
        .collect()
}

fn candidates(grid: &OccupancyGrid, w: u16, h: u16) -> impl Iterator<Item = (u16, u16)> {
    let fits = w > 0 && h > 0 && w <= grid.cols() && h <= grid.rows();
    let max_x = if fits { grid.cols() - w } else { 0 };
    let rows = if fits { 0..=grid.rows() - h } else { 1..=0 };
    rows.flat_map(move |y| (0..=max_x).map(move |x| (x, y)))
}
