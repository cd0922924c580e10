//! Criterion benchmarks for chunk-grid lookups.
//!
//! Benchmarks:
//!   - chunk_at at center and corner of a 256x256 world
//!   - tile_at world-coordinate lookup
//!   - tile_index chunk-local index computation
//!   - mark_dirty_at dirty-bit set on a hot chunk
//!
//! Budget: all lookups < 100ns.
//!
//! Run with: cargo bench -p simcore --bench world_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use simcore::world::WorldGrid;

// ---------------------------------------------------------------------------
// Benchmark: chunk lookup
// ---------------------------------------------------------------------------

fn bench_chunk_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_chunk_lookup");
    group.sample_size(1000);

    let world = WorldGrid::new(256, 256).expect("valid dims");

    group.bench_function("chunk_at_center", |b| {
        b.iter(|| black_box(world.chunk_at(black_box(8), black_box(8))));
    });

    group.bench_function("chunk_at_corner", |b| {
        b.iter(|| black_box(world.chunk_at(black_box(0), black_box(0))));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: tile addressing
// ---------------------------------------------------------------------------

fn bench_tile_addressing(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_tile_addressing");
    group.sample_size(1000);

    let world = WorldGrid::new(256, 256).expect("valid dims");

    group.bench_function("tile_at", |b| {
        b.iter(|| black_box(world.tile_at(black_box(137), black_box(201))));
    });

    group.bench_function("tile_index", |b| {
        b.iter(|| black_box(WorldGrid::tile_index(black_box(137), black_box(201))));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: dirty marking
// ---------------------------------------------------------------------------

fn bench_mark_dirty(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_mark_dirty");
    group.sample_size(1000);

    let mut world = WorldGrid::new(256, 256).expect("valid dims");

    group.bench_function("mark_dirty_at", |b| {
        b.iter(|| black_box(world.mark_dirty_at(black_box(137), black_box(201))));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Register groups
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_chunk_lookup,
    bench_tile_addressing,
    bench_mark_dirty
);
criterion_main!(benches);
