//! Live-resize push: make room for an item growing under a resize handle.
//!
//! The growth directions are read off the moved edges. Every item the new
//! footprint covers is relocated flush against the moved edge, and the
//! displacement chains breadth-first through whatever it lands on. Nothing is
//! ever shrunk to make room; a push that would leave the grid rejects the
//! whole resize.

use gridtile_core::geometry::Rect;
use rustc_hash::FxHashSet;

use crate::item::{GridDims, GridItem, index_of, validate_items};
use crate::push::{PushDirection, propagate_chain, sorted};

/// Result of [`calculate_resize_space`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeOutcome {
    pub can_resize: bool,
    /// New layout (resized item included) on success; the input items,
    /// unchanged, on failure.
    pub items: Vec<GridItem>,
    /// Ids of relocated neighbors, in layout order.
    pub moved_ids: Vec<String>,
    /// Ids of neighbors shrunk to make room. Always empty: resizing never
    /// shrinks a neighbor.
    pub shrunk_ids: Vec<String>,
}

impl ResizeOutcome {
    fn rejected(items: &[GridItem]) -> Self {
        Self {
            can_resize: false,
            items: items.to_vec(),
            moved_ids: Vec::new(),
            shrunk_ids: Vec::new(),
        }
    }
}

/// Edges that moved outward between `old` and `new`, with the strip of
/// newly covered cells each one sweeps.
fn growth(old: Rect, new: Rect) -> Vec<(PushDirection, Rect)> {
    let mut grown = Vec::with_capacity(4);
    if new.right() > old.right() {
        let x = old.right().max(new.x);
        grown.push((
            PushDirection::Right,
            Rect::new(x, new.y, new.right() - x, new.height),
        ));
    }
    if new.bottom() > old.bottom() {
        let y = old.bottom().max(new.y);
        grown.push((
            PushDirection::Down,
            Rect::new(new.x, y, new.width, new.bottom() - y),
        ));
    }
    if new.x < old.x {
        let right = old.x.min(new.right());
        grown.push((
            PushDirection::Left,
            Rect::new(new.x, new.y, right - new.x, new.height),
        ));
    }
    if new.y < old.y {
        let bottom = old.y.min(new.bottom());
        grown.push((
            PushDirection::Up,
            Rect::new(new.x, new.y, new.width, bottom - new.y),
        ));
    }
    grown
}

/// Make room for `resizing_id` to occupy `new`.
///
/// Fails (returning the input unchanged) when the item is unknown, `new`
/// violates its min/max size or the grid bounds, or any push in the chain
/// would leave the grid or run into the resizing item itself.
#[must_use]
pub fn calculate_resize_space(
    items: &[GridItem],
    resizing_id: &str,
    new: Rect,
    dims: GridDims,
) -> ResizeOutcome {
    let Some(index) = index_of(items, resizing_id) else {
        tracing::debug!(target: "gridtile.resize", id = resizing_id, "unknown item");
        return ResizeOutcome::rejected(items);
    };
    let current = &items[index];
    if !current.accepts_size(new.width, new.height) || !dims.contains(&new) {
        tracing::debug!(
            target: "gridtile.resize",
            id = resizing_id,
            requested = %new,
            "requested footprint violates size or bounds"
        );
        return ResizeOutcome::rejected(items);
    }

    let grown = growth(current.rect(), new);
    let mut work = items.to_vec();
    work[index].set_rect(new);

    let mut seeds = Vec::new();
    for other in 0..work.len() {
        if other == index || !work[other].rect().overlaps(&new) {
            continue;
        }
        let other_rect = work[other].rect();
        // The swept strip the neighbor sits in decides the push direction;
        // corner cells resolve in right, down, left, up order.
        let Some((direction, relocated)) = grown
            .iter()
            .find(|(_, strip)| strip.overlaps(&other_rect))
            .and_then(|&(direction, _)| {
                direction
                    .flush_past(new, other_rect)
                    .filter(|rect| dims.contains(rect))
                    .map(|rect| (direction, rect))
            })
        else {
            tracing::debug!(
                target: "gridtile.resize",
                id = resizing_id,
                blocked_by = %work[other].id,
                "neighbor cannot be relocated"
            );
            return ResizeOutcome::rejected(items);
        };
        work[other].set_rect(relocated);
        seeds.push((other, direction));
    }

    let seeded: Vec<usize> = seeds.iter().map(|&(other, _)| other).collect();
    let immovable: FxHashSet<usize> = std::iter::once(index).collect();
    let chained = match propagate_chain(
        &mut work,
        seeds,
        &[],
        &immovable,
        &FxHashSet::default(),
        dims,
    ) {
        Ok(chained) => chained,
        Err(block) => {
            tracing::debug!(
                target: "gridtile.resize",
                id = resizing_id,
                block = ?block,
                "chain push rejected"
            );
            return ResizeOutcome::rejected(items);
        }
    };
    if let Err(err) = validate_items(&work, dims) {
        tracing::debug!(
            target: "gridtile.resize",
            id = resizing_id,
            error = %err,
            "resize result invalid"
        );
        return ResizeOutcome::rejected(items);
    }

    let mut moved: FxHashSet<usize> = chained;
    moved.extend(seeded);
    let moved_ids: Vec<String> = sorted(moved)
        .into_iter()
        .map(|i| work[i].id.clone())
        .collect();
    tracing::debug!(
        target: "gridtile.resize",
        id = resizing_id,
        footprint = %new,
        moved = moved_ids.len(),
        "resize space resolved"
    );
    ResizeOutcome {
        can_resize: true,
        items: work,
        moved_ids,
        shrunk_ids: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, x: u16, y: u16, w: u16, h: u16) -> GridItem {
        GridItem::new(id, Rect::new(x, y, w, h))
    }

    fn rect_of(items: &[GridItem], id: &str) -> Rect {
        items.iter().find(|i| i.id == id).unwrap().rect()
    }

    const DIMS: GridDims = GridDims::new(12, 10);

    #[test]
    fn growing_right_pushes_neighbor_flush() {
        let items = vec![item("a", 0, 0, 4, 4), item("b", 4, 0, 4, 4)];
        let out = calculate_resize_space(&items, "a", Rect::new(0, 0, 6, 4), DIMS);
        assert!(out.can_resize);
        assert_eq!(rect_of(&out.items, "a"), Rect::new(0, 0, 6, 4));
        assert_eq!(rect_of(&out.items, "b"), Rect::new(6, 0, 4, 4));
        assert_eq!(out.moved_ids, vec!["b".to_owned()]);
        assert!(out.shrunk_ids.is_empty());
    }

    #[test]
    fn push_past_right_edge_rejects_resize() {
        let items = vec![item("a", 0, 0, 6, 4), item("b", 6, 0, 4, 4)];
        let out = calculate_resize_space(&items, "a", Rect::new(0, 0, 9, 4), DIMS);
        assert!(!out.can_resize);
        assert_eq!(out.items, items);
        assert!(out.moved_ids.is_empty());
    }

    #[test]
    fn chain_reaches_second_neighbor() {
        let items = vec![
            item("a", 0, 0, 4, 2),
            item("b", 4, 0, 2, 2),
            item("c", 6, 0, 2, 2),
        ];
        let out = calculate_resize_space(&items, "a", Rect::new(0, 0, 5, 2), DIMS);
        assert!(out.can_resize);
        assert_eq!(rect_of(&out.items, "b"), Rect::new(5, 0, 2, 2));
        assert_eq!(rect_of(&out.items, "c"), Rect::new(7, 0, 2, 2));
        assert_eq!(out.moved_ids, vec!["b".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn growing_down_pushes_below() {
        let items = vec![item("a", 0, 0, 4, 2), item("b", 0, 2, 4, 2)];
        let out = calculate_resize_space(&items, "a", Rect::new(0, 0, 4, 3), DIMS);
        assert!(out.can_resize);
        assert_eq!(rect_of(&out.items, "b"), Rect::new(0, 3, 4, 2));
    }

    #[test]
    fn growing_left_pushes_left() {
        let items = vec![item("a", 4, 0, 4, 2), item("b", 2, 0, 2, 2)];
        let out = calculate_resize_space(&items, "a", Rect::new(3, 0, 5, 2), DIMS);
        assert!(out.can_resize);
        assert_eq!(rect_of(&out.items, "b"), Rect::new(1, 0, 2, 2));

        let out = calculate_resize_space(&items, "a", Rect::new(1, 0, 7, 2), DIMS);
        assert!(!out.can_resize, "b would need x = -1");
    }

    #[test]
    fn shrinking_needs_no_push() {
        let items = vec![item("a", 0, 0, 4, 4), item("b", 4, 0, 4, 4)];
        let out = calculate_resize_space(&items, "a", Rect::new(0, 0, 2, 2), DIMS);
        assert!(out.can_resize);
        assert!(out.moved_ids.is_empty());
    }

    #[test]
    fn size_limits_and_unknown_ids_reject() {
        let items = vec![item("a", 0, 0, 4, 4).with_min(3, 3)];
        assert!(!calculate_resize_space(&items, "a", Rect::new(0, 0, 2, 4), DIMS).can_resize);
        assert!(!calculate_resize_space(&items, "a", Rect::new(0, 0, 13, 4), DIMS).can_resize);
        assert!(!calculate_resize_space(&items, "zz", Rect::new(0, 0, 4, 4), DIMS).can_resize);
    }
}
