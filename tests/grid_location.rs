use mesh_locate::geometry::{Aabb, CurvilinearPoints};
use mesh_locate::mesh_generation::{hex_mesh, quad_mesh, tet_mesh, triangle_mesh};
use mesh_locate::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn unit<const D: usize>() -> Aabb<D> {
    Aabb {
        min: [0.0; D],
        max: [1.0; D],
    }
}

fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "{a} != {b} (tol {tol})");
}

#[test]
fn single_hexahedron_boundary_example() {
    let grid = StructuredGrid::uniform([2, 2, 2], [0.0; 3], [1.0; 3]).unwrap();
    assert_eq!(grid.num_cells(), 1);

    let mut ip = grid.interpolator(DomainPart::Points);
    assert!(ip.reset(&[0.5, 0.5, 0.5]));
    assert_eq!(ip.cell().unwrap().cell_type(), CellType::Hexahedron);
    for x in ip.local_coords().unwrap() {
        assert_close(x, 0.5, 1e-14);
    }
    let w = ip.value().unwrap();
    assert_eq!(w.len(), 8);
    for &wi in w.weights() {
        assert_close(wi, 0.125, 1e-14);
    }

    assert!(!ip.reset(&[1.5, 0.5, 0.5]));
    assert_eq!(ip.state(), EvaluatorState::OutOfDomain);
    assert_eq!(ip.value().unwrap_err(), GridError::OutsideDomain);
}

#[test]
fn explicit_hexahedron_matches_the_structured_one() {
    let mesh = hex_mesh([1, 1, 1], unit()).unwrap();
    let unstructured = mesh.into_grid().unwrap();
    let structured = StructuredGrid::uniform([2, 2, 2], [0.0; 3], [1.0; 3]).unwrap();
    let p = [0.2, 0.7, 0.4];
    let (_, a) = unstructured.locate_local(&p).unwrap();
    let (_, b) = structured.locate_local(&p).unwrap();
    for d in 0..3 {
        assert_close(a[d], b[d], 1e-9);
    }
}

#[test]
fn cell_index_round_trip() {
    let grid = triangle_mesh([4, 3], unit()).unwrap().into_grid().unwrap();
    let complex = grid.complex();
    for i in 0..complex.num_cells() {
        assert_eq!(complex.index(&complex.cell(i)), i);
    }
    let grid = StructuredGrid::uniform([4, 3, 5], [0.0; 3], [1.0; 3]).unwrap();
    let complex = grid.complex();
    for i in 0..complex.num_cells() {
        assert_eq!(complex.index(&complex.cell(i)), i);
    }
}

#[test]
fn lattice_vertices_resolve_alike_in_both_storages() {
    let structured = StructuredGrid::uniform([4, 4, 4], [0.1; 3], [0.1; 3]).unwrap();
    let positions: Vec<[f64; 3]> = (0..structured.num_points())
        .map(|i| structured.points().point(i))
        .collect();
    let explicit = UnstructuredGrid::new(
        Arc::new(ExplicitPoints::new(positions.clone()).unwrap()),
        CellComplex::structured(&[4, 4, 4]).unwrap(),
    )
    .unwrap();

    for p in &positions {
        let a = structured.locate(p).expect("structured lookup missed a vertex");
        let b = explicit.locate(p).expect("celltree lookup missed a vertex");
        assert!(structured.contains(&b, p));
        assert!(explicit.contains(&a, p));
    }

    let corner = [0.4, 0.4, 0.4];
    let mut ip = structured.interpolator(DomainPart::Points);
    assert!(ip.reset(&corner));
    let q = ip.value().unwrap().combine_vectors(&positions);
    for d in 0..3 {
        assert_close(q[d], corner[d], 1e-12);
    }
}

#[test]
fn located_cells_contain_the_query() {
    let grid = tet_mesh([4, 4, 4], unit()).unwrap().jitter(0.2, 11).into_grid().unwrap();
    let mut rng = SmallRng::seed_from_u64(42);
    for _ in 0..500 {
        let p: [f64; 3] = std::array::from_fn(|_| rng.gen_range(0.0..1.0));
        let cell = grid.locate(&p).expect("interior point must be located");
        assert!(grid.contains(&cell, &p));
        let b = grid.cell_bounds(&cell);
        assert!((0..3).all(|d| p[d] >= b.min[d] - 1e-9 && p[d] <= b.max[d] + 1e-9));
    }
}

#[test]
fn affine_fields_are_reproduced_on_irregular_meshes() {
    let field = |p: &[f64; 2]| 3.0 * p[0] - 2.0 * p[1] + 1.0;
    let grids = [
        quad_mesh([6, 5], unit()).unwrap().jitter(0.2, 1).into_grid().unwrap(),
        triangle_mesh([6, 5], unit()).unwrap().jitter(0.2, 2).into_grid().unwrap(),
    ];
    let mut rng = SmallRng::seed_from_u64(7);
    for grid in &grids {
        let values: Vec<f64> = (0..grid.num_points()).map(|i| field(&grid.points().point(i))).collect();
        let mut ip = grid.interpolator(DomainPart::Points);
        for _ in 0..200 {
            let p = [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)];
            assert!(ip.reset(&p));
            let w = ip.value().unwrap();
            assert_close(w.weights().iter().sum::<f64>(), 1.0, 1e-9);
            assert_close(w.combine(&values), field(&p), 1e-8);
        }
    }
}

#[test]
fn identity_field_on_a_rectilinear_grid() {
    let grid = StructuredGrid::rectilinear([vec![0.0, 0.1, 0.5, 2.0], vec![-1.0, 0.0, 3.0]]).unwrap();
    let positions: Vec<[f64; 2]> = (0..grid.num_points()).map(|i| grid.points().point(i)).collect();
    let mut ip = grid.interpolator(DomainPart::Points);
    for p in [[0.05, -0.5], [1.9, 2.9], [0.5, 0.0], [2.0, 3.0]] {
        assert!(ip.reset(&p));
        let q = ip.value().unwrap().combine_vectors(&positions);
        assert_close(q[0], p[0], 1e-12);
        assert_close(q[1], p[1], 1e-12);
    }
}

#[test]
fn cached_and_fresh_queries_agree() {
    let grid = quad_mesh([8, 8], unit()).unwrap().jitter(0.2, 5).into_grid().unwrap();
    let mut ip = grid.interpolator(DomainPart::Points);
    // a slow walk along a diagonal mostly stays in the cached cell
    let steps = 400;
    for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let p = [t, 0.3 + 0.4 * t];
        assert!(ip.reset(&p));
        let cached = ip.cell().unwrap();
        assert!(grid.contains(&cached, &p));
        let fresh = grid.locate(&p).unwrap();
        if cached != fresh {
            // only on a shared face may the two disagree
            assert!(grid.contains(&fresh, &p));
        }
    }
    assert!(ip.cache_hits() > steps / 2, "{} cache hits", ip.cache_hits());
}

#[test]
fn cell_data_uses_the_containing_cell() {
    let grid = StructuredGrid::uniform([5, 5], [0.0; 2], [0.25; 2]).unwrap();
    let cell_values: Vec<f64> = (0..grid.num_cells()).map(|i| i as f64).collect();
    let mut ip = grid.interpolator(DomainPart::Cells);
    assert!(ip.reset(&[0.6, 0.8]));
    // x cell 2, y cell 3
    assert_eq!(ip.value().unwrap().combine(&cell_values), 14.0);
}

#[test]
fn curvilinear_annulus_sector() {
    let (nr, nt) = (4, 9);
    let mut pts = Vec::new();
    for j in 0..nt {
        let theta = std::f64::consts::FRAC_PI_2 * j as f64 / (nt - 1) as f64;
        for i in 0..nr {
            let r = 1.0 + i as f64 / (nr - 1) as f64;
            pts.push([r * theta.cos(), r * theta.sin()]);
        }
    }
    let grid = UnstructuredGrid::curvilinear(CurvilinearPoints::new(vec![nr, nt], pts).unwrap()).unwrap();
    assert_eq!(grid.complex().topology_type(), TopologyType::Structured);
    assert!(grid.locate(&[1.2, 1.2]).is_some());
    // inside the inner radius
    assert!(grid.locate(&[0.5, 0.5]).is_none());
    // outside the outer radius
    assert!(grid.locate(&[1.6, 1.6]).is_none());
}
