use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use mesh_locate::geometry::Aabb;
use mesh_locate::mesh_generation::tet_mesh;
use mesh_locate::prelude::*;

fn unit() -> Aabb<3> {
    Aabb {
        min: [0.0; 3],
        max: [1.0; 3],
    }
}

fn queries(n: usize, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|_| std::array::from_fn(|_| rng.gen_range(0.0..1.0)))
        .collect()
}

fn bench_celltree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("celltree_build");
    group.sample_size(10);
    for &n in &[8usize, 16, 32] {
        let mesh = tet_mesh([n, n, n], unit()).unwrap().jitter(0.2, 1);
        let complex = CellComplex::unstructured(mesh.points.len(), mesh.counts, mesh.indices).unwrap();
        let points = ExplicitPoints::new(mesh.points).unwrap();
        group.bench_with_input(BenchmarkId::new("tets", 6 * n * n * n), &n, |b, _| {
            b.iter(|| {
                let tree = Celltree::build(&complex, &points, &CelltreeConfig::default()).unwrap();
                black_box(tree);
            });
        });
    }
    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");
    let points = queries(1024, 7);

    for &n in &[8usize, 16, 32] {
        let grid = tet_mesh([n, n, n], unit()).unwrap().jitter(0.2, 2).into_grid().unwrap();
        group.bench_with_input(BenchmarkId::new("celltree", grid.num_cells()), &n, |b, _| {
            b.iter(|| {
                for p in &points {
                    black_box(grid.locate(p));
                }
            });
        });
    }

    let structured = StructuredGrid::uniform([33, 33, 33], [0.0; 3], [1.0 / 32.0; 3]).unwrap();
    group.bench_function("structured", |b| {
        b.iter(|| {
            for p in &points {
                black_box(structured.locate(p));
            }
        });
    });
    group.finish();
}

fn bench_interpolator(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolator");
    let grid = tet_mesh([16, 16, 16], unit()).unwrap().jitter(0.2, 3).into_grid().unwrap();
    let values: Vec<f64> = (0..grid.num_points()).map(|i| grid.points().point(i)[0]).collect();
    // a stream line: consecutive points are close together
    let walk: Vec<[f64; 3]> = (0..1024)
        .map(|i| {
            let t = i as f64 / 1024.0;
            [t, 0.5 + 0.3 * (6.0 * t).sin(), 0.5]
        })
        .collect();

    group.bench_function("cached_walk", |b| {
        b.iter(|| {
            let mut ip = grid.interpolator(DomainPart::Points);
            let mut sum = 0.0;
            for p in &walk {
                if ip.reset(p) {
                    sum += ip.value().map(|w| w.combine(&values)).unwrap_or(0.0);
                }
            }
            black_box(sum);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_celltree_build, bench_locate, bench_interpolator);
criterion_main!(benches);
