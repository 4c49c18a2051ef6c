//! Benchmarks for fit search, repacking, and push calculation.
//!
//! Run with: cargo bench -p gridtile-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gridtile_layout::{
    AdjustConfig, GridDims, GridItem, OccupancyGrid, Rect, calculate_push, find_all_fits,
    find_first_fit, plan_insertion, repack_optimal,
};
use std::hint::black_box;

/// `n` items of mixed sizes, first-fitted onto a `cols x rows` grid.
fn make_layout(n: usize, cols: u16, rows: u16) -> Vec<GridItem> {
    let mut grid = OccupancyGrid::empty(cols, rows);
    let mut items = Vec::with_capacity(n);
    for i in 0..n {
        let (w, h) = match i % 4 {
            0 => (4, 3),
            1 => (2, 2),
            2 => (3, 4),
            _ => (1, 2),
        };
        let Some((x, y)) = find_first_fit(&grid, w, h) else {
            break;
        };
        let item = GridItem::new(format!("w{i}"), Rect::new(x, y, w, h));
        grid.mark(item.rect());
        items.push(item);
    }
    items
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/fit");
    for n in [4, 16, 32] {
        let items = make_layout(n, 12, 40);
        let grid = OccupancyGrid::build(&items, 12, 40, None);
        group.bench_with_input(BenchmarkId::new("first_fit", n), &grid, |b, grid| {
            b.iter(|| black_box(find_first_fit(grid, 4, 4)))
        });
        group.bench_with_input(BenchmarkId::new("all_fits", n), &grid, |b, grid| {
            b.iter(|| black_box(find_all_fits(grid, 4, 4)))
        });
    }
    group.finish();
}

fn bench_repack(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/repack_optimal");
    for n in [4, 16, 32] {
        let items = make_layout(n, 12, 40);
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter(|| black_box(repack_optimal(items, 12, 40)))
        });
    }
    group.finish();
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/push");
    let dims = GridDims::new(12, 40);
    for n in [4, 16, 32] {
        let items = make_layout(n, dims.cols, dims.max_rows);
        let target = Rect::new(2, 0, 4, 4);
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter(|| black_box(calculate_push(items, target, dims, None)))
        });
    }
    group.finish();
}

fn bench_adjust(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/plan_insertion");
    let dims = GridDims::new(12, 10);
    let config = AdjustConfig::default();
    let request = GridItem::new("new", Rect::new(0, 0, 4, 4));
    for n in [8, 16] {
        let items: Vec<GridItem> = make_layout(n, dims.cols, dims.max_rows)
            .into_iter()
            .map(|item| item.with_min(1, 1))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter(|| black_box(plan_insertion(items, &request, dims, &config)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit, bench_repack, bench_push, bench_adjust);
criterion_main!(benches);
