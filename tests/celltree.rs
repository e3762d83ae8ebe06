use mesh_locate::geometry::Aabb;
use mesh_locate::mesh_generation::{hex_mesh, tet_mesh, triangle_mesh};
use mesh_locate::prelude::*;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn unit<const D: usize>() -> Aabb<D> {
    Aabb {
        min: [0.0; D],
        max: [1.0; D],
    }
}

/// Containment test against every cell, in storage order.
fn brute_force<const D: usize, G: Grid<D>>(grid: &G, p: &[f64; D]) -> Vec<usize> {
    grid.complex()
        .cells()
        .enumerate()
        .filter(|(_, c)| grid.contains(c, p))
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn leaves_partition_the_cells() {
    let grid = tet_mesh([5, 4, 3], unit()).unwrap().jitter(0.1, 9).into_grid().unwrap();
    let tree = grid.celltree();
    assert_eq!(tree.num_cells(), grid.num_cells());
    let mut all: Vec<u32> = tree.leaves().to_vec();
    all.sort_unstable();
    assert!(all.iter().enumerate().all(|(i, &c)| i == c as usize));

    let mut covered = 0;
    for node in tree.nodes().iter().filter(|n| n.is_leaf()) {
        covered += tree.leaf_cells(node).len();
        assert!(node.size() < CelltreeConfig::default().leaf_size);
    }
    assert_eq!(covered, grid.num_cells());
    assert!(tree.depth() <= mesh_locate::locate::MAX_DEPTH);
    tree.validate_invariants().unwrap();
}

/// Average number of candidate cells per query on a jittered `n³` hex mesh.
fn average_candidates(n: usize, queries: &[[f64; 3]]) -> f64 {
    let grid = hex_mesh([n, n, n], unit()).unwrap().jitter(0.2, 4).into_grid().unwrap();
    let mut tests = 0;
    for p in queries {
        tests += grid.containment_tests(p);
        assert!(grid.locate(p).is_some());
    }
    tests as f64 / queries.len() as f64
}

#[test]
fn query_cost_grows_sublinearly() {
    let mut rng = SmallRng::seed_from_u64(17);
    let queries: Vec<[f64; 3]> = (0..200)
        .map(|_| std::array::from_fn(|_| rng.gen_range(0.0..1.0)))
        .collect();

    let sizes = [8usize, 16, 24];
    let costs: Vec<f64> = sizes.iter().map(|&n| average_candidates(n, &queries)).collect();
    for (k, &n) in sizes.iter().enumerate().skip(1) {
        let cell_ratio = (n as f64 / sizes[0] as f64).powi(3);
        let cost_ratio = costs[k] / costs[0];
        assert!(
            cost_ratio < 0.5 * cell_ratio,
            "cost grew {cost_ratio:.2}x for {cell_ratio}x the cells ({costs:?})"
        );
    }
    let largest = sizes[2].pow(3) as f64;
    assert!(costs[2] < 0.01 * largest, "{} tests per query for {largest} cells", costs[2]);
}

#[test]
fn geometric_segments_exceed_the_depth_limit() {
    // each split can only separate the longest segment from the rest
    let points: Vec<[f64; 1]> = (0..=80).map(|i| [2f64.powi(i)]).collect();
    let indices: Vec<usize> = (0..80).flat_map(|i| [i, i + 1]).collect();
    let err = UnstructuredGrid::from_cells(points, vec![(CellType::Line, 80)], indices).unwrap_err();
    match err {
        GridError::CelltreeTooDeep { depth, limit } => {
            assert_eq!(limit, mesh_locate::locate::MAX_DEPTH);
            assert!(depth > limit);
        }
        other => panic!("expected a depth error, got {other:?}"),
    }
}

#[test]
fn located_cell_agrees_with_brute_force() {
    let grid = triangle_mesh([10, 10], unit()).unwrap().jitter(0.2, 8).into_grid().unwrap();
    let mut rng = SmallRng::seed_from_u64(3);
    for _ in 0..300 {
        let p = [rng.gen_range(-0.1..1.1), rng.gen_range(-0.1..1.1)];
        let expected = brute_force(&grid, &p);
        match grid.locate(&p) {
            Some(cell) => assert!(expected.contains(&grid.complex().index(&cell))),
            None => assert!(expected.is_empty(), "{p:?} missed cells {expected:?}"),
        }
    }
}

#[test]
fn serialized_tree_round_trips() {
    let grid = tet_mesh([3, 3, 3], unit()).unwrap().into_grid().unwrap();
    let json = serde_json::to_string(grid.celltree()).unwrap();
    let tree: Celltree = serde_json::from_str(&json).unwrap();
    assert_eq!(&tree, grid.celltree());
    tree.validate_invariants().unwrap();
    let p = [0.4, 0.4, 0.6];
    assert_eq!(
        tree.candidates(&p).collect::<Vec<_>>(),
        grid.celltree().candidates(&p).collect::<Vec<_>>()
    );

    let config: CelltreeConfig = serde_json::from_str(r#"{"buckets":8,"leaf_size":6,"parallel_threshold":1}"#).unwrap();
    assert_eq!(config.buckets, 8);
}

#[test]
fn persisted_tree_serves_a_new_grid() {
    let mesh = tet_mesh([4, 4, 4], unit()).unwrap().jitter(0.15, 12);
    let complex = || CellComplex::unstructured(mesh.points.len(), mesh.counts.clone(), mesh.indices.clone()).unwrap();
    let points = std::sync::Arc::new(ExplicitPoints::new(mesh.points.clone()).unwrap());
    let built = UnstructuredGrid::new(points.clone(), complex()).unwrap();
    let json = serde_json::to_string(built.celltree()).unwrap();

    let tree: Celltree = serde_json::from_str(&json).unwrap();
    let restored = UnstructuredGrid::with_celltree(points.clone(), complex(), tree).unwrap();
    let mut rng = SmallRng::seed_from_u64(5);
    for _ in 0..100 {
        let p: [f64; 3] = std::array::from_fn(|_| rng.gen_range(0.0..1.0));
        let a = built.locate(&p).map(|c| built.complex().index(&c));
        let b = restored.locate(&p).map(|c| restored.complex().index(&c));
        assert_eq!(a, b);
    }

    // a tree over a different mesh is refused
    let other = tet_mesh([2, 2, 2], unit()).unwrap().into_grid().unwrap();
    let err = UnstructuredGrid::with_celltree(points, complex(), other.celltree().clone()).unwrap_err();
    assert!(matches!(err, GridError::CelltreeMismatch { found_cells: 48, .. }), "{err:?}");
}

#[test]
fn corrupt_trees_do_not_deserialize() {
    let json = r#"{"nodes":[{"index":3,"a":0,"b":5}],"leaves":[0],"depth":0,"dimension":1}"#;
    assert!(serde_json::from_str::<Celltree>(json).is_err());
}

#[test]
fn invalid_configuration_is_rejected() {
    let mesh = triangle_mesh([2, 2], unit()).unwrap();
    let complex = CellComplex::unstructured(mesh.points.len(), mesh.counts, mesh.indices).unwrap();
    let points = std::sync::Arc::new(ExplicitPoints::new(mesh.points).unwrap());
    let config = CelltreeConfig {
        leaf_size: 1,
        ..Default::default()
    };
    assert!(matches!(
        UnstructuredGrid::with_config(points, complex, &config),
        Err(GridError::InvalidCelltreeConfig(_))
    ));
}

#[test]
fn build_parameters_do_not_change_results() {
    let mesh = tet_mesh([6, 6, 6], unit()).unwrap().jitter(0.15, 21);
    let complex = CellComplex::unstructured(mesh.points.len(), mesh.counts.clone(), mesh.indices.clone()).unwrap();
    let points = std::sync::Arc::new(ExplicitPoints::new(mesh.points.clone()).unwrap());
    let coarse = UnstructuredGrid::with_config(
        points,
        complex,
        &CelltreeConfig {
            buckets: 2,
            leaf_size: 32,
            parallel_threshold: 64,
        },
    )
    .unwrap();
    let fine = mesh.into_grid().unwrap();
    let mut rng = SmallRng::seed_from_u64(99);
    for _ in 0..200 {
        let p: [f64; 3] = std::array::from_fn(|_| rng.gen_range(0.0..1.0));
        let a = coarse.locate(&p).map(|c| coarse.complex().index(&c)).unwrap();
        let b = fine.locate(&p).map(|c| fine.complex().index(&c)).unwrap();
        assert!(a == b || (coarse.contains(&coarse.complex().cell(b), &p)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_points_are_located_iff_some_cell_contains_them(
        seed in any::<u64>(),
        x in -0.2f64..1.2,
        y in -0.2f64..1.2,
        z in -0.2f64..1.2,
    ) {
        let grid = tet_mesh([3, 3, 3], unit()).unwrap().jitter(0.2, seed).into_grid().unwrap();
        let p = [x, y, z];
        let expected = brute_force(&grid, &p);
        match grid.locate_local(&p) {
            Some((cell, local)) => {
                prop_assert!(expected.contains(&grid.complex().index(&cell)));
                prop_assert!(cell.cell_type().reference_domain().contains(&local, 1e-6));
            }
            None => prop_assert!(expected.is_empty()),
        }
    }

    #[test]
    fn structured_lookup_matches_brute_force(
        nx in 2usize..6,
        ny in 2usize..6,
        x in -0.5f64..2.5,
        y in -0.5f64..2.5,
    ) {
        let grid = StructuredGrid::uniform([nx, ny], [0.0, 0.0], [2.0 / (nx - 1) as f64, 2.0 / (ny - 1) as f64]).unwrap();
        let p = [x, y];
        let expected = brute_force(&grid, &p);
        match grid.locate(&p) {
            Some(cell) => prop_assert!(expected.contains(&grid.complex().index(&cell))),
            None => prop_assert!(expected.is_empty()),
        }
    }
}
