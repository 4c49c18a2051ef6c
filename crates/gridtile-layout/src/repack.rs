//! Gap-removal repacking.
//!
//! [`repack`] re-places items greedily (first fit, in a given order) on an
//! empty grid. [`repack_optimal`] runs a fixed set of orderings and keeps the
//! best result. Repacking never changes an item's id or size; it only
//! reassigns `x` and `y`. Total area is not pre-checked: when greedy
//! placement cannot place every item the result is `None`.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::fit::find_first_fit;
use crate::item::{GridItem, max_bottom};
use crate::occupancy::OccupancyGrid;

/// Item ordering used by one repack attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepackStrategy {
    /// Largest area first.
    AreaDesc,
    /// Widest first.
    WidthDesc,
    /// Tallest first.
    HeightDesc,
    /// Current reading order (top-to-bottom, then left-to-right).
    TopLeft,
    /// Rows whose widths sum exactly to the column count first.
    RowFill,
}

impl RepackStrategy {
    /// Strategies tried by [`repack_optimal`], in tie-break order.
    pub const ALL: [Self; 5] = [
        Self::AreaDesc,
        Self::WidthDesc,
        Self::HeightDesc,
        Self::TopLeft,
        Self::RowFill,
    ];

    /// Placement order as indices into `items`. Sorts are stable, so equal
    /// keys keep their input order.
    #[must_use]
    pub fn order(self, items: &[GridItem], cols: u16) -> Vec<usize> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        match self {
            Self::AreaDesc => order.sort_by_key(|&i| Reverse(items[i].area())),
            Self::WidthDesc => order.sort_by_key(|&i| Reverse(items[i].w)),
            Self::HeightDesc => order.sort_by_key(|&i| Reverse(items[i].h)),
            Self::TopLeft => order.sort_by_key(|&i| (items[i].y, items[i].x)),
            Self::RowFill => return row_fill_order(items, cols),
        }
        order
    }
}

/// Greedy row grouping: take the widest remaining item, add every further
/// item that still fits in the row, and emit exactly-filled rows before the
/// rest.
fn row_fill_order(items: &[GridItem], cols: u16) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..items.len()).collect();
    remaining.sort_by_key(|&i| Reverse(items[i].w));

    let mut exact = Vec::new();
    let mut partial = Vec::new();
    while !remaining.is_empty() {
        let mut row = Vec::new();
        let mut used = 0u32;
        remaining.retain(|&i| {
            let w = u32::from(items[i].w);
            if row.is_empty() || used + w <= u32::from(cols) {
                used += w;
                row.push(i);
                false
            } else {
                true
            }
        });
        if used == u32::from(cols) {
            exact.extend(row);
        } else {
            partial.extend(row);
        }
    }
    exact.extend(partial);
    exact
}

/// Place items in slice order, each at its first fit on an empty grid.
///
/// The output keeps the input order; only positions change.
#[must_use]
pub fn repack(items: &[GridItem], cols: u16, max_rows: u16) -> Option<Vec<GridItem>> {
    let order: Vec<usize> = (0..items.len()).collect();
    repack_in_order(items, &order, cols, max_rows)
}

/// Place items following `order` (indices into `items`).
#[must_use]
pub fn repack_in_order(
    items: &[GridItem],
    order: &[usize],
    cols: u16,
    max_rows: u16,
) -> Option<Vec<GridItem>> {
    let mut grid = OccupancyGrid::empty(cols, max_rows);
    let mut placed = items.to_vec();
    for &index in order {
        let item = &items[index];
        let (x, y) = find_first_fit(&grid, item.w, item.h)?;
        let moved = item.moved_to(x, y);
        grid.mark(moved.rect());
        placed[index] = moved;
    }
    Some(placed)
}

/// Best repack across [`RepackStrategy::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepackResult {
    pub items: Vec<GridItem>,
    pub strategy: RepackStrategy,
    /// `max(y + h)` over the placed items.
    pub max_bottom: u16,
    /// Largest all-free rectangle left on the grid.
    pub largest_free_area: u32,
}

/// Run every strategy and keep the result with the lowest `max(y + h)`,
/// breaking ties by the largest contiguous free rectangle, then by strategy
/// order.
#[must_use]
pub fn repack_optimal(items: &[GridItem], cols: u16, max_rows: u16) -> Option<RepackResult> {
    let _span = tracing::debug_span!(
        "repack.optimal",
        items = items.len(),
        cols = cols,
        max_rows = max_rows,
    )
    .entered();

    let mut best: Option<RepackResult> = None;
    for strategy in RepackStrategy::ALL {
        let order = strategy.order(items, cols);
        let Some(placed) = repack_in_order(items, &order, cols, max_rows) else {
            tracing::debug!(
                target: "gridtile.repack",
                strategy = ?strategy,
                "strategy could not place every item"
            );
            continue;
        };
        let bottom = max_bottom(&placed);
        let free = OccupancyGrid::build(&placed, cols, max_rows, None).largest_free_area();
        tracing::debug!(
            target: "gridtile.repack",
            strategy = ?strategy,
            max_bottom = bottom,
            largest_free_area = free,
            "strategy evaluated"
        );
        let better = best.as_ref().is_none_or(|current| {
            bottom < current.max_bottom
                || (bottom == current.max_bottom && free > current.largest_free_area)
        });
        if better {
            best = Some(RepackResult {
                items: placed,
                strategy,
                max_bottom: bottom,
                largest_free_area: free,
            });
        }
    }
    best
}
