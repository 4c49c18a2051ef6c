//! Position exchange between two items.
//!
//! A swap is all-or-nothing: each item takes the other's top-left corner and
//! keeps its own size. If the result is not legal nothing moves and no
//! push-assisted fallback is attempted.

use gridtile_core::geometry::Rect;

use crate::item::{GridDims, GridItem, index_of};
use crate::occupancy::OccupancyGrid;

/// Exchange the positions of `source_id` and `target_id`.
///
/// Checks, in order: both moved rectangles stay inside the grid; they do not
/// overlap each other; neither covers a third item. Returns `None` if any
/// check fails or either id is unknown.
#[must_use]
pub fn calculate_swap(
    items: &[GridItem],
    source_id: &str,
    target_id: &str,
    cols: u16,
    max_rows: u16,
) -> Option<Vec<GridItem>> {
    if source_id == target_id {
        return None;
    }
    let source = index_of(items, source_id)?;
    let target = index_of(items, target_id)?;
    let dims = GridDims::new(cols, max_rows);

    let source_rect = items[source].rect();
    let target_rect = items[target].rect();
    let source_moved = source_rect.with_position(target_rect.x, target_rect.y);
    let target_moved = target_rect.with_position(source_rect.x, source_rect.y);

    let verdict = check(source_moved, target_moved, dims, || {
        OccupancyGrid::build_excluding(items, cols, max_rows, &[source_id, target_id])
    });
    if let Err(reason) = verdict {
        tracing::debug!(
            target: "gridtile.swap",
            source = source_id,
            target = target_id,
            reason,
            "swap rejected"
        );
        return None;
    }

    let mut swapped = items.to_vec();
    swapped[source].set_rect(source_moved);
    swapped[target].set_rect(target_moved);
    tracing::debug!(
        target: "gridtile.swap",
        source = source_id,
        target = target_id,
        "swap resolved"
    );
    Some(swapped)
}

fn check(
    source: Rect,
    target: Rect,
    dims: GridDims,
    others: impl FnOnce() -> OccupancyGrid,
) -> Result<(), &'static str> {
    if !dims.contains(&source) || !dims.contains(&target) {
        return Err("out of bounds");
    }
    if source.overlaps(&target) {
        return Err("swapped items overlap each other");
    }
    let grid = others();
    if !grid.can_fit_rect(source) || !grid.can_fit_rect(target) {
        return Err("swapped item covers a third item");
    }
    Ok(())
}
