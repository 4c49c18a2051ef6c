//! Drop-time push and the shared chain-push propagation.
//!
//! When a rectangle must be placed over occupied cells, every item in the
//! way is displaced outward just far enough to clear it, and whatever the
//! displaced item now covers is pushed further in the same direction
//! (breadth-first). A push is atomic: if any displaced item would leave the
//! grid, enter a reserved zone, or hit an item that may not move, nothing is
//! applied.

use std::collections::VecDeque;

use gridtile_core::geometry::Rect;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::item::{GridDims, GridItem, index_of, validate_items};
use crate::occupancy::OccupancyGrid;

/// Displacement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushDirection {
    Right,
    Down,
    Left,
    Up,
}

impl PushDirection {
    /// Order in which a drop tries to clear each colliding item.
    pub const DROP_PRIORITY: [Self; 4] = [Self::Right, Self::Down, Self::Left, Self::Up];

    /// Position that puts `item` flush against the far side of `pusher`.
    ///
    /// `None` if the position would be negative.
    #[must_use]
    pub fn flush_past(self, pusher: Rect, item: Rect) -> Option<Rect> {
        match self {
            Self::Right => Some(item.with_position(pusher.right(), item.y)),
            Self::Down => Some(item.with_position(item.x, pusher.bottom())),
            Self::Left => pusher
                .x
                .checked_sub(item.width)
                .map(|x| item.with_position(x, item.y)),
            Self::Up => pusher
                .y
                .checked_sub(item.height)
                .map(|y| item.with_position(item.x, y)),
        }
    }

    /// Shift `item` by its own extent in this direction, extended so it
    /// clears `zone` entirely.
    #[must_use]
    pub fn displace_clear_of(self, zone: Rect, item: Rect) -> Option<Rect> {
        match self {
            Self::Right => {
                let needed = zone.right().saturating_sub(item.x);
                let shift = item.width.max(needed);
                item.x
                    .checked_add(shift)
                    .map(|x| item.with_position(x, item.y))
            }
            Self::Down => {
                let needed = zone.bottom().saturating_sub(item.y);
                let shift = item.height.max(needed);
                item.y
                    .checked_add(shift)
                    .map(|y| item.with_position(item.x, y))
            }
            Self::Left => {
                let needed = item.right().saturating_sub(zone.x);
                let shift = item.width.max(needed);
                item.x
                    .checked_sub(shift)
                    .map(|x| item.with_position(x, item.y))
            }
            Self::Up => {
                let needed = item.bottom().saturating_sub(zone.y);
                let shift = item.height.max(needed);
                item.y
                    .checked_sub(shift)
                    .map(|y| item.with_position(item.x, y))
            }
        }
    }
}

/// Why a chain push stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChainBlock {
    OutOfBounds { id: String },
    Reserved { id: String },
    Immovable { id: String },
    Exhausted,
}

/// Propagate pushes breadth-first from `seeds` until nothing overlaps a
/// moved item.
///
/// Items in `skip` are invisible to the chain (e.g. the item being dragged).
/// Overlapping an item in `immovable` or any `reserved` zone blocks the chain.
/// Returns the indices of every item the chain relocated.
pub(crate) fn propagate_chain(
    work: &mut [GridItem],
    seeds: impl IntoIterator<Item = (usize, PushDirection)>,
    reserved: &[Rect],
    immovable: &FxHashSet<usize>,
    skip: &FxHashSet<usize>,
    dims: GridDims,
) -> Result<FxHashSet<usize>, ChainBlock> {
    let mut queue: VecDeque<(usize, PushDirection)> = seeds.into_iter().collect();
    let mut moved = FxHashSet::default();
    let mut budget = work.len() * work.len() + work.len();

    while let Some((pusher, direction)) = queue.pop_front() {
        let pusher_rect = work[pusher].rect();
        for other in 0..work.len() {
            if other == pusher || skip.contains(&other) {
                continue;
            }
            let other_rect = work[other].rect();
            if !other_rect.overlaps(&pusher_rect) {
                continue;
            }
            if immovable.contains(&other) {
                return Err(ChainBlock::Immovable {
                    id: work[other].id.clone(),
                });
            }
            if budget == 0 {
                return Err(ChainBlock::Exhausted);
            }
            budget -= 1;
            let relocated = direction
                .flush_past(pusher_rect, other_rect)
                .filter(|rect| dims.contains(rect))
                .ok_or_else(|| ChainBlock::OutOfBounds {
                    id: work[other].id.clone(),
                })?;
            if reserved.iter().any(|zone| zone.overlaps(&relocated)) {
                return Err(ChainBlock::Reserved {
                    id: work[other].id.clone(),
                });
            }
            work[other].set_rect(relocated);
            moved.insert(other);
            queue.push_back((other, direction));
        }
    }
    Ok(moved)
}

/// Result of [`calculate_push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub can_push: bool,
    /// New layout on success; the input items, unchanged, on failure.
    pub items: Vec<GridItem>,
    /// Ids of displaced items, in first-displacement order.
    pub pushed_ids: Vec<String>,
}

impl PushOutcome {
    fn rejected(items: &[GridItem]) -> Self {
        Self {
            can_push: false,
            items: items.to_vec(),
            pushed_ids: Vec::new(),
        }
    }
}

/// Clear `target` so a widget can be dropped there.
///
/// Every item overlapping the target (other than `exclude`, the item being
/// dropped) is displaced right, down, left, or up, whichever works first.
/// The target zone itself is reserved: no displaced item may land in it.
#[must_use]
pub fn calculate_push(
    items: &[GridItem],
    target: Rect,
    dims: GridDims,
    exclude: Option<&str>,
) -> PushOutcome {
    if target.is_empty() || !dims.contains(&target) {
        tracing::debug!(
            target: "gridtile.push",
            zone = %target,
            "push target outside grid"
        );
        return PushOutcome::rejected(items);
    }

    let excluded = exclude.and_then(|id| index_of(items, id));
    let skip: FxHashSet<usize> = excluded.into_iter().collect();
    let immovable = FxHashSet::default();
    let colliders: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(index, item)| Some(*index) != excluded && item.rect().overlaps(&target))
        .map(|(index, _)| index)
        .collect();

    let mut work = items.to_vec();
    let mut pushed: Vec<usize> = Vec::new();
    for index in colliders {
        // An earlier chain may already have carried this item out of the way.
        if !work[index].rect().overlaps(&target) {
            continue;
        }
        let mut resolved = false;
        for direction in PushDirection::DROP_PRIORITY {
            let Some(displaced) = direction
                .displace_clear_of(target, work[index].rect())
                .filter(|rect| dims.contains(rect) && !rect.overlaps(&target))
            else {
                continue;
            };
            let mut trial = work.clone();
            trial[index].set_rect(displaced);
            match propagate_chain(
                &mut trial,
                [(index, direction)],
                &[target],
                &immovable,
                &skip,
                dims,
            ) {
                Ok(chain) => {
                    tracing::trace!(
                        target: "gridtile.push",
                        id = %work[index].id,
                        direction = ?direction,
                        chained = chain.len(),
                        "displaced colliding item"
                    );
                    work = trial;
                    for moved in std::iter::once(index).chain(sorted(chain)) {
                        if !pushed.contains(&moved) {
                            pushed.push(moved);
                        }
                    }
                    resolved = true;
                    break;
                }
                Err(block) => {
                    tracing::trace!(
                        target: "gridtile.push",
                        id = %work[index].id,
                        direction = ?direction,
                        block = ?block,
                        "direction rejected"
                    );
                }
            }
        }
        if !resolved {
            tracing::debug!(
                target: "gridtile.push",
                id = %items[index].id,
                zone = %target,
                "push blocked"
            );
            return PushOutcome::rejected(items);
        }
    }

    let others: Vec<GridItem> = work
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != excluded)
        .map(|(_, item)| item.clone())
        .collect();
    let target_free = OccupancyGrid::build(&work, dims.cols, dims.max_rows, exclude)
        .can_fit_rect(target);
    if !target_free || validate_items(&others, dims).is_err() {
        return PushOutcome::rejected(items);
    }

    let pushed_ids: Vec<String> = pushed.iter().map(|&i| work[i].id.clone()).collect();
    tracing::debug!(
        target: "gridtile.push",
        zone = %target,
        pushed = pushed_ids.len(),
        "push resolved"
    );
    PushOutcome {
        can_push: true,
        items: work,
        pushed_ids,
    }
}

/// Deterministic iteration over a hash set of indices.
pub(crate) fn sorted(set: FxHashSet<usize>) -> Vec<usize> {
    let mut indices: Vec<usize> = set.into_iter().collect();
    indices.sort_unstable();
    indices
}
