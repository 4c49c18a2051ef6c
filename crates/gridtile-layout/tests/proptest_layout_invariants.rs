//! Property-based invariant tests for the placement engine.
//!
//! 1. First fit is deterministic, legal, and the head of the all-fit scan.
//! 2. Repack preserves sizes and ids, never overlaps, and is idempotent,
//!    for packed and scattered layouts alike.
//! 3. The best repack, when one exists, is a valid layout.
//! 4. A rejected push leaves the items exactly as they were.
//! 5. An accepted push clears the target and keeps the layout valid.
//! 6. Swapping a with b equals swapping b with a.
//! 7. Resize space is all-or-nothing.
//! 8. Insertion plans keep every existing item and respect minimums.

use gridtile_layout::{
    AdjustConfig, GridDims, GridItem, OccupancyGrid, Rect, calculate_push,
    calculate_resize_space, calculate_swap, find_all_fits, find_first_fit, plan_insertion, repack,
    repack_optimal, validate_items,
};
use proptest::prelude::*;

const DIMS: GridDims = GridDims::new(12, 10);

// ── Helpers ─────────────────────────────────────────────────────────────

/// A valid layout built by first-fitting random sizes onto an empty grid.
fn arb_layout() -> impl Strategy<Value = Vec<GridItem>> {
    proptest::collection::vec((1u16..=6, 1u16..=4, 1u16..=3, 1u16..=3), 0..=14).prop_map(
        |sizes| {
            let mut grid = OccupancyGrid::empty(DIMS.cols, DIMS.max_rows);
            let mut items = Vec::new();
            for (n, (w, h, min_w, min_h)) in sizes.into_iter().enumerate() {
                let Some((x, y)) = find_first_fit(&grid, w, h) else {
                    continue;
                };
                let item = GridItem::new(format!("i{n}"), Rect::new(x, y, w, h))
                    .with_min(min_w.min(w), min_h.min(h));
                grid.mark(item.rect());
                items.push(item);
            }
            items
        },
    )
}

/// A valid layout with gaps: random sizes at random positions, dropping any
/// item that would collide with one already placed.
fn arb_scattered_layout() -> impl Strategy<Value = Vec<GridItem>> {
    proptest::collection::vec((0u16..12, 0u16..10, 1u16..=5, 1u16..=4), 0..=14).prop_map(
        |candidates| {
            let mut grid = OccupancyGrid::empty(DIMS.cols, DIMS.max_rows);
            let mut items = Vec::new();
            for (n, (x, y, w, h)) in candidates.into_iter().enumerate() {
                let rect = Rect::new(x, y, w, h);
                if !grid.can_fit_rect(rect) {
                    continue;
                }
                grid.mark(rect);
                items.push(GridItem::new(format!("s{n}"), rect).with_min(1, 1));
            }
            items
        },
    )
}

/// Either generator; scattered layouts exercise gaps and out-of-order ids.
fn arb_any_layout() -> impl Strategy<Value = Vec<GridItem>> {
    prop_oneof![arb_layout(), arb_scattered_layout()]
}

fn arb_zone() -> impl Strategy<Value = Rect> {
    (0u16..12, 0u16..10, 1u16..=6, 1u16..=5).prop_map(|(x, y, w, h)| {
        let w = w.min(DIMS.cols - x);
        let h = h.min(DIMS.max_rows - y);
        Rect::new(x, y, w, h)
    })
}

fn sizes(items: &[GridItem]) -> Vec<(String, u16, u16)> {
    items.iter().map(|i| (i.id.clone(), i.w, i.h)).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Fit finder
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn first_fit_is_deterministic_and_legal(
        items in arb_layout(),
        w in 1u16..=12,
        h in 1u16..=10,
    ) {
        let grid = OccupancyGrid::build(&items, DIMS.cols, DIMS.max_rows, None);
        let first = find_first_fit(&grid, w, h);
        prop_assert_eq!(first, find_first_fit(&grid, w, h));

        let all = find_all_fits(&grid, w, h);
        prop_assert_eq!(first.map(|(x, y)| Rect::new(x, y, w, h)), all.first().copied());
        for zone in &all {
            prop_assert!(grid.can_fit_rect(*zone));
            prop_assert!(items.iter().all(|i| !i.rect().overlaps(zone)));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-3. Repacker
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repack_is_idempotent_and_size_preserving(items in arb_layout()) {
        let once = repack(&items, DIMS.cols, DIMS.max_rows);
        // Input came from the same greedy order, so it always repacks.
        prop_assert!(once.is_some());
        let once = once.unwrap();
        prop_assert_eq!(sizes(&once), sizes(&items));
        prop_assert!(validate_items(&once, DIMS).is_ok());

        let twice = repack(&once, DIMS.cols, DIMS.max_rows);
        prop_assert_eq!(twice.as_ref(), Some(&once));
    }

    #[test]
    fn scattered_repack_is_idempotent(items in arb_scattered_layout()) {
        prop_assert!(validate_items(&items, DIMS).is_ok());
        if let Some(once) = repack(&items, DIMS.cols, DIMS.max_rows) {
            prop_assert_eq!(sizes(&once), sizes(&items));
            prop_assert!(validate_items(&once, DIMS).is_ok());
            let twice = repack(&once, DIMS.cols, DIMS.max_rows);
            prop_assert_eq!(twice.as_ref(), Some(&once));
        }
    }

    #[test]
    fn optimal_repack_is_valid(items in arb_any_layout()) {
        // Greedy orderings may fail on a tight grid; a result that exists
        // must be valid.
        if let Some(best) = repack_optimal(&items, DIMS.cols, DIMS.max_rows) {
            prop_assert_eq!(sizes(&best.items), sizes(&items));
            prop_assert!(validate_items(&best.items, DIMS).is_ok());
            prop_assert!(best.max_bottom <= DIMS.max_rows);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4-5. Push engine
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn push_is_atomic(items in arb_any_layout(), zone in arb_zone()) {
        let outcome = calculate_push(&items, zone, DIMS, None);
        if outcome.can_push {
            prop_assert!(validate_items(&outcome.items, DIMS).is_ok());
            prop_assert!(outcome.items.iter().all(|i| !i.rect().overlaps(&zone)));
            prop_assert_eq!(sizes(&outcome.items), sizes(&items));
        } else {
            prop_assert_eq!(&outcome.items, &items);
            prop_assert!(outcome.pushed_ids.is_empty());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Swap resolver
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig { max_global_rejects: 16384, ..ProptestConfig::default() })]
    #[test]
    fn swap_is_symmetric(items in arb_any_layout(), a in 0usize..14, b in 0usize..14) {
        prop_assume!(a < items.len() && b < items.len());
        let (ia, ib) = (&items[a].id, &items[b].id);
        let forward = calculate_swap(&items, ia, ib, DIMS.cols, DIMS.max_rows);
        let backward = calculate_swap(&items, ib, ia, DIMS.cols, DIMS.max_rows);
        prop_assert_eq!(&forward, &backward);
        if let Some(swapped) = forward {
            prop_assert!(validate_items(&swapped, DIMS).is_ok());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Resize space
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resize_space_is_all_or_nothing(
        items in arb_any_layout(),
        pick in 0usize..14,
        grow_w in 0u16..=6,
        grow_h in 0u16..=4,
    ) {
        prop_assume!(pick < items.len());
        let target = &items[pick];
        let new = Rect::new(
            target.x,
            target.y,
            (target.w + grow_w).min(DIMS.cols - target.x),
            (target.h + grow_h).min(DIMS.max_rows - target.y),
        );
        let outcome = calculate_resize_space(&items, &target.id, new, DIMS);
        if outcome.can_resize {
            prop_assert!(validate_items(&outcome.items, DIMS).is_ok());
            let resized = outcome.items.iter().find(|i| i.id == target.id).unwrap();
            prop_assert_eq!(resized.rect(), new);
            prop_assert!(outcome.shrunk_ids.is_empty());
        } else {
            prop_assert_eq!(&outcome.items, &items);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Auto-adjust
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn insertion_plans_keep_every_item(
        items in arb_layout(),
        w in 1u16..=8,
        h in 1u16..=6,
    ) {
        let request = GridItem::new("new", Rect::new(0, 0, w, h));
        if let Ok(plan) = plan_insertion(&items, &request, DIMS, &AdjustConfig::default()) {
            prop_assert!(validate_items(&plan.items, DIMS).is_ok());
            prop_assert_eq!(plan.items.len(), items.len() + 1);
            for original in &items {
                let kept = plan.items.iter().find(|i| i.id == original.id);
                prop_assert!(kept.is_some());
                let kept = kept.unwrap();
                prop_assert!(kept.w >= kept.min_w && kept.h >= kept.min_h);
                prop_assert!(kept.w <= original.w && kept.h <= original.h);
            }
            prop_assert_eq!(plan.placed.rect().width, w);
            prop_assert_eq!(plan.placed.rect().height, h);
        }
    }
}
