//! Auto-adjust: manufacture space for a new item when no free position
//! exists.
//!
//! Escalation order:
//! 1. fail fast when the minimum footprint of everything cannot fit the grid;
//! 2. first fit in the current layout;
//! 3. [`repack_optimal`], then first fit;
//! 4. graduated shrink: shrink the largest shrinkable item by one cell,
//!    repack, retry, up to a fixed iteration ceiling.
//!
//! Sizes only ever shrink down to each item's declared minimum, and no item
//! is ever removed.

use serde::{Deserialize, Serialize};

use crate::config::AdjustConfig;
use crate::error::LayoutError;
use crate::fit::find_first_fit;
use crate::item::{GridDims, GridItem, index_of, validate_items};
use crate::occupancy::OccupancyGrid;
use crate::repack::{RepackStrategy, repack_optimal};

/// How the planner found room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AdjustStrategy {
    /// A free position existed already.
    Direct,
    /// Repacking the existing items opened a position.
    Repacked { strategy: RepackStrategy },
    /// Items had to shrink.
    Shrunk { iterations: u32 },
}

/// Successful insertion plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustPlan {
    /// Existing items (possibly moved or shrunk) followed by the new item.
    pub items: Vec<GridItem>,
    /// The inserted item at its assigned position.
    pub placed: GridItem,
    pub strategy: AdjustStrategy,
    /// Items whose size changed, in first-shrink order.
    pub shrunk_ids: Vec<String>,
}

/// Find room for `request` (its `x`/`y` are ignored).
pub fn plan_insertion(
    items: &[GridItem],
    request: &GridItem,
    dims: GridDims,
    config: &AdjustConfig,
) -> Result<AdjustPlan, LayoutError> {
    let _span = tracing::debug_span!(
        "adjust.plan",
        id = %request.id,
        w = request.w,
        h = request.h,
        items = items.len(),
    )
    .entered();

    if index_of(items, &request.id).is_some() {
        return Err(LayoutError::DuplicateId {
            id: request.id.clone(),
        });
    }
    request.validate_size()?;
    for item in items {
        item.validate_size()?;
    }
    let origin = request.rect().with_position(0, 0);
    if !dims.contains(&origin) {
        return Err(LayoutError::OutOfBounds {
            id: request.id.clone(),
            rect: origin,
            cols: dims.cols,
            max_rows: dims.max_rows,
        });
    }

    let required = items.iter().map(GridItem::min_area).sum::<u32>() + request.area();
    if required > dims.capacity() {
        tracing::debug!(
            target: "gridtile.adjust",
            required,
            capacity = dims.capacity(),
            "capacity exceeded"
        );
        return Err(LayoutError::CapacityExceeded {
            required,
            capacity: dims.capacity(),
        });
    }

    if let Some(plan) = place(items, request, dims, AdjustStrategy::Direct, Vec::new()) {
        tracing::debug!(target: "gridtile.adjust", x = plan.placed.x, y = plan.placed.y, "direct fit");
        return Ok(plan);
    }

    if let Some(repacked) = repack_optimal(items, dims.cols, dims.max_rows) {
        let strategy = AdjustStrategy::Repacked {
            strategy: repacked.strategy,
        };
        if let Some(plan) = place(&repacked.items, request, dims, strategy, Vec::new()) {
            tracing::debug!(
                target: "gridtile.adjust",
                strategy = ?repacked.strategy,
                "fit after repack"
            );
            return Ok(plan);
        }
    }

    shrink_until_fit(items, request, dims, config.max_shrink_iterations)
}

fn place(
    items: &[GridItem],
    request: &GridItem,
    dims: GridDims,
    strategy: AdjustStrategy,
    shrunk_ids: Vec<String>,
) -> Option<AdjustPlan> {
    let grid = OccupancyGrid::build(items, dims.cols, dims.max_rows, None);
    let (x, y) = find_first_fit(&grid, request.w, request.h)?;
    let placed = request.moved_to(x, y);
    let mut all = items.to_vec();
    all.push(placed.clone());
    debug_assert!(validate_items(&all, dims).is_ok());
    Some(AdjustPlan {
        items: all,
        placed,
        strategy,
        shrunk_ids,
    })
}

/// Largest-area item that can still shrink; ties keep layout order.
fn shrink_candidate(items: &[GridItem]) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.w > item.min_w || item.h > item.min_h)
        .fold(None, |best: Option<(usize, u32)>, (index, item)| match best {
            Some((_, area)) if area >= item.area() => best,
            _ => Some((index, item.area())),
        })
        .map(|(index, _)| index)
}

/// Shrink one cell along the dimension with more slack (width on ties).
fn shrink_one(item: &mut GridItem) {
    let slack_w = item.w.saturating_sub(item.min_w);
    let slack_h = item.h.saturating_sub(item.min_h);
    if slack_w >= slack_h && slack_w > 0 {
        item.w -= 1;
    } else {
        item.h -= 1;
    }
}

fn shrink_until_fit(
    items: &[GridItem],
    request: &GridItem,
    dims: GridDims,
    max_iterations: u32,
) -> Result<AdjustPlan, LayoutError> {
    let mut current = items.to_vec();
    let mut shrunk_ids: Vec<String> = Vec::new();

    for iteration in 1..=max_iterations {
        let Some(index) = shrink_candidate(&current) else {
            tracing::debug!(
                target: "gridtile.adjust",
                iteration,
                "every item is at its minimum size"
            );
            return Err(LayoutError::ExceedsMinimum {
                id: request.id.clone(),
            });
        };
        shrink_one(&mut current[index]);
        if !shrunk_ids.contains(&current[index].id) {
            shrunk_ids.push(current[index].id.clone());
        }
        tracing::trace!(
            target: "gridtile.adjust",
            iteration,
            id = %current[index].id,
            w = current[index].w,
            h = current[index].h,
            "shrunk item"
        );

        // Shrinking in place never creates overlap, so `current` stays valid
        // when the repack fails.
        if let Some(repacked) = repack_optimal(&current, dims.cols, dims.max_rows) {
            let strategy = AdjustStrategy::Shrunk {
                iterations: iteration,
            };
            if let Some(plan) = place(&repacked.items, request, dims, strategy, shrunk_ids.clone())
            {
                tracing::debug!(
                    target: "gridtile.adjust",
                    iterations = iteration,
                    shrunk = plan.shrunk_ids.len(),
                    "fit after shrinking"
                );
                return Ok(plan);
            }
            current = repacked.items;
        }
    }

    tracing::warn!(
        target: "gridtile.adjust",
        id = %request.id,
        max_iterations,
        "shrink ceiling reached"
    );
    Err(LayoutError::Blocked {
        id: request.id.clone(),
    })
}

/// How [`refit_layout`] brought a layout back inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefitMode {
    /// Valid as given.
    Unchanged,
    /// Positions were repacked; sizes kept.
    Repacked,
    /// Items were reinserted one by one, shrinking where needed.
    Reinserted,
}

/// Make `items` valid for `dims`: keep them as they are, else repack, else
/// reinsert each item through [`plan_insertion`].
///
/// Used when the grid shrinks under an existing layout (viewport resize,
/// restoring a snapshot saved on a taller screen).
pub fn refit_layout(
    items: &[GridItem],
    dims: GridDims,
    config: &AdjustConfig,
) -> Result<(Vec<GridItem>, RefitMode), LayoutError> {
    if validate_items(items, dims).is_ok() {
        return Ok((items.to_vec(), RefitMode::Unchanged));
    }
    for (index, item) in items.iter().enumerate() {
        if items[..index].iter().any(|other| other.id == item.id) {
            return Err(LayoutError::DuplicateId {
                id: item.id.clone(),
            });
        }
        item.validate_size()?;
    }

    let sized: Vec<GridItem> = items.iter().map(|item| fit_size(item, dims)).collect();
    if let Some(repacked) = repack_optimal(&sized, dims.cols, dims.max_rows)
        .filter(|result| validate_items(&result.items, dims).is_ok())
    {
        tracing::debug!(
            target: "gridtile.adjust",
            strategy = ?repacked.strategy,
            "refit by repacking"
        );
        return Ok((repacked.items, RefitMode::Repacked));
    }

    let mut placed: Vec<GridItem> = Vec::with_capacity(sized.len());
    for item in &sized {
        placed = plan_insertion(&placed, item, dims, config)?.items;
    }
    tracing::debug!(target: "gridtile.adjust", items = placed.len(), "refit by reinsertion");
    Ok((placed, RefitMode::Reinserted))
}

/// Clamp an item's size into the grid without going below its minimum.
fn fit_size(item: &GridItem, dims: GridDims) -> GridItem {
    let mut sized = item.clone();
    sized.w = item.w.min(dims.cols).max(item.min_w);
    sized.h = item.h.min(dims.max_rows).max(item.min_h);
    sized
}
