//! Benchmarks for agglomerative color ordering.
//!
//! Run with: cargo bench -p tileforge-palette --bench cluster_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use tileforge_palette::{
    ClusterConfig, ClusterSorter, Color, ColorData, Palette, RgbSpace, sorted_palette,
};

fn spread(n: usize) -> Vec<Color> {
    (0..n as u32)
        .map(|i| Color::new(i.wrapping_mul(0x0009_e377) ^ 0x00a5_a5a5))
        .collect()
}

fn bench_order(c: &mut Criterion) {
    let sorter = ClusterSorter::new(RgbSpace, ClusterConfig::seeded(7));
    let mut group = c.benchmark_group("cluster/order");
    for n in [16usize, 64, 256] {
        let colors = spread(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(sorter.order(black_box(&colors))));
        });
    }
    group.finish();
}

fn bench_sorted_palette(c: &mut Criterion) {
    let sorter = ClusterSorter::new(RgbSpace, ClusterConfig::seeded(7));
    let mut entries = vec![ColorData::new(Color::MAGENTA, 0)];
    entries.extend(spread(40).into_iter().map(|color| ColorData::new(color, 1)));
    let palette = Palette::from_entries(0, entries);
    c.bench_function("cluster/sorted_palette_41", |b| {
        b.iter(|| black_box(sorted_palette(black_box(&palette), &sorter).unwrap()));
    });
}

criterion_group!(benches, bench_order, bench_sorted_palette);
criterion_main!(benches);
