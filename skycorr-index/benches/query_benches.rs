use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skycorr_core::Source;
use skycorr_index::quadtree::{SkyBounds, SkyQuadTree, TreeConfig};

fn rng() -> StdRng {
    StdRng::seed_from_u64(0xdead_beef)
}

fn filled_tree(rng: &mut StdRng, depth: u32, size: usize) -> SkyQuadTree {
    let bounds = SkyBounds::new(0.0, 10.0, 0.0, 10.0).unwrap();
    let mut tree = SkyQuadTree::new(TreeConfig::new(depth, bounds)).unwrap();
    tree.extend((0..size).map(|_| {
        Source::new(
            rng.random_range(0.0..10.0),
            rng.random_range(0.0..10.0),
        )
    }));
    tree.aggregate();
    tree
}

fn find_sources_by_catalog_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree find_sources");
    for size in [1 << 10, 1 << 12, 1 << 14, 1 << 16] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = rng();
            let tree = filled_tree(&mut rng, 5, size);

            b.iter(|| {
                let target = Source::new(
                    rng.random_range(0.0..10.0),
                    rng.random_range(0.0..10.0),
                );
                let matches = tree.find_sources(&target, 0.25).unwrap();
                black_box(matches.len())
            })
        });
    }
    group.finish();
}

fn find_sources_by_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree find_sources by depth");
    for depth in [2u32, 4, 6, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let mut rng = rng();
            let tree = filled_tree(&mut rng, depth, 1 << 14);

            b.iter(|| {
                let target = Source::new(
                    rng.random_range(0.0..10.0),
                    rng.random_range(0.0..10.0),
                );
                let matches = tree.find_sources(&target, 0.25).unwrap();
                black_box(matches.len())
            })
        });
    }
    group.finish();
}

fn fill_and_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree fill + aggregate");
    for size in [1 << 12, 1 << 14, 1 << 16] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut rng = rng();
            let catalog: Vec<Source> = (0..size)
                .map(|_| {
                    Source::new(
                        rng.random_range(0.0..10.0),
                        rng.random_range(0.0..10.0),
                    )
                })
                .collect();

            b.iter(|| {
                let bounds = SkyBounds::new(0.0, 10.0, 0.0, 10.0).unwrap();
                let mut tree = SkyQuadTree::new(TreeConfig::new(5, bounds)).unwrap();
                tree.extend(catalog.iter().copied());
                tree.aggregate();
                black_box(tree.root_count())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    find_sources_by_catalog_size,
    find_sources_by_depth,
    fill_and_aggregate
);
criterion_main!(benches);
