use mesh_locate::geometry::shape::node_coordinates;
use mesh_locate::geometry::LOCAL_TOLERANCE;
use mesh_locate::prelude::*;

/// An affine map with a non-trivial linear part.
fn warp(p: [f64; 3]) -> [f64; 3] {
    [
        2.0 * p[0] + 0.3 * p[1] - 0.1 * p[2] + 1.0,
        -0.2 * p[0] + 1.5 * p[1] + 0.4 * p[2] - 2.0,
        0.1 * p[0] - 0.3 * p[1] + 0.8 * p[2] + 0.5,
    ]
}

/// A grid holding one reference cell of `cell_type`, mapped by `map`.
fn single_cell<const D: usize>(cell_type: CellType, map: impl Fn([f64; 3]) -> [f64; D]) -> UnstructuredGrid<D>
where
    [f64; D]: Embedding,
{
    let points = node_coordinates(cell_type).iter().map(|&p| map(p)).collect::<Vec<_>>();
    let n = points.len();
    assert_eq!(n, cell_type.num_values());
    UnstructuredGrid::from_cells(points, vec![(cell_type, 1)], (0..n).collect()).unwrap()
}

fn reference_centroid(cell_type: CellType) -> [f64; 3] {
    let nodes = &node_coordinates(cell_type.geometry_type())[..cell_type.num_vertices()];
    let mut c = [0.0; 3];
    for p in nodes {
        for d in 0..3 {
            c[d] += p[d] / nodes.len() as f64;
        }
    }
    c
}

fn check_centroid<const D: usize>(grid: &UnstructuredGrid<D>, cell_type: CellType)
where
    [f64; D]: Embedding,
{
    let cell = grid.complex().cell(0);
    let c = grid.cell_centroid(&cell);
    let (found, local) = grid
        .locate_local(&c)
        .unwrap_or_else(|| panic!("centroid of {cell_type} not located"));
    assert_eq!(found, cell);
    let expected = reference_centroid(cell_type);
    for d in 0..cell_type.dimension() {
        assert!(
            (local[d] - expected[d]).abs() < 1e-8,
            "{cell_type}: local {local:?}, expected {expected:?}"
        );
    }
    assert!(cell_type.reference_domain().contains(&local, LOCAL_TOLERANCE));
}

#[test]
fn centroids_are_contained_in_three_dimensions() {
    let mut tested = 0;
    for cell_type in CellType::ALL {
        if !<[f64; 3]>::supports(cell_type) {
            continue;
        }
        check_centroid(&single_cell(cell_type, warp), cell_type);
        tested += 1;
    }
    assert!(tested >= 10);
}

#[test]
fn centroids_are_contained_in_two_dimensions() {
    for cell_type in CellType::ALL.into_iter().filter(|t| t.dimension() == 2) {
        let grid = single_cell(cell_type, |p| [1.5 * p[0] - 0.5 * p[1], 0.25 * p[0] + p[1]]);
        check_centroid(&grid, cell_type);
    }
}

#[test]
fn centroids_are_contained_in_one_dimension() {
    for cell_type in CellType::ALL.into_iter().filter(|t| t.dimension() == 1) {
        let grid = single_cell(cell_type, |p| [3.0 * p[0] - 1.0]);
        check_centroid(&grid, cell_type);
    }
}

#[test]
fn unsupported_shapes_are_never_located() {
    // curved surface cells have no containment test in space
    let grid = single_cell(CellType::QuadraticTriangle, |p| [p[0], p[1], 0.0]);
    assert!(<[f64; 3]>::supports(CellType::Triangle));
    assert!(!<[f64; 3]>::supports(CellType::QuadraticTriangle));
    assert!(grid.locate(&[0.2, 0.2, 0.0]).is_none());
}

#[test]
fn surface_cells_in_space_reject_off_plane_points() {
    let grid = single_cell(CellType::Quad, warp);
    let cell = grid.complex().cell(0);
    let mut c = grid.cell_centroid(&cell);
    assert!(grid.contains(&cell, &c));
    c[2] += 0.1;
    assert!(!grid.contains(&cell, &c));
}

#[test]
fn subparametric_cells_interpolate_with_the_quadratic_basis() {
    let grid = single_cell(CellType::SubparametricQuadraticTriangle, |p| [p[0], p[1]]);
    // quadratic field sampled at the six nodes
    let field = |p: [f64; 3]| p[0] * p[0] + p[0] * p[1];
    let values: Vec<f64> = node_coordinates(CellType::QuadraticTriangle).iter().map(|&p| field(p)).collect();
    let mut ip = grid.interpolator(DomainPart::Points);
    let p = [0.3, 0.2];
    assert!(ip.reset(&p));
    let w = ip.value().unwrap();
    assert_eq!(w.len(), 6);
    assert!((w.combine(&values) - field([0.3, 0.2, 0.0])).abs() < 1e-12);
}

#[test]
fn faces_share_the_parent_indices() {
    let indices = vec![3, 7, 1, 10, 2, 5, 11, 0];
    let complex = CellComplex::unstructured(12, vec![(CellType::Hexahedron, 1)], indices.clone()).unwrap();
    let cell = complex.cell(0);
    for (f, face) in cell.faces().enumerate() {
        let table = CellType::Hexahedron.faces()[f];
        assert_eq!(face.cell_type(), CellType::Quad);
        let expected: Vec<usize> = table.local.iter().map(|&l| indices[l]).collect();
        assert_eq!(face.vertex_indices().collect::<Vec<_>>(), expected);
        // edges of the face
        for (e, edge) in face.faces().enumerate() {
            let edge_local = CellType::Quad.faces()[e].local;
            let expected: Vec<usize> = edge_local.iter().map(|&l| indices[table.local[l]]).collect();
            assert_eq!(edge.vertex_indices().collect::<Vec<_>>(), expected);
        }
    }
    assert!(cell.try_face(6).is_err());
}

#[derive(Default)]
struct Census {
    hexahedra: usize,
    tetrahedra: usize,
    quadratic: usize,
}

impl CellVisitor for Census {
    fn visit_hexahedron(&mut self, _: &Cell<'_>) {
        self.hexahedra += 1;
    }
    fn visit_tetrahedron(&mut self, _: &Cell<'_>) {
        self.tetrahedra += 1;
    }
    fn visit_quadratic_tetrahedron(&mut self, cell: &Cell<'_>) {
        assert_eq!(cell.num_values(), 10);
        self.quadratic += 1;
    }
}

#[test]
fn visitor_dispatches_on_the_cell_type() {
    let counts = vec![
        (CellType::Tetrahedron, 2),
        (CellType::Hexahedron, 1),
        (CellType::QuadraticTetrahedron, 1),
        (CellType::Tetrahedron, 1),
    ];
    let n: usize = counts.iter().map(|&(t, c)| t.num_values() * c).sum();
    let complex = CellComplex::unstructured(n, counts, (0..n).collect()).unwrap();
    assert_eq!(complex.num_cell_types(), 4);
    assert!(!complex.is_simplicial());
    let mut census = Census::default();
    for cell in complex.cells() {
        cell.apply(&mut census);
    }
    assert_eq!((census.tetrahedra, census.hexahedra, census.quadratic), (3, 1, 1));
}

#[test]
fn codes_names_and_display() {
    for (code, cell_type) in CellType::ALL.into_iter().enumerate() {
        assert_eq!(CellType::try_from(code as u8).unwrap(), cell_type);
        assert_eq!(cell_type as u8, code as u8);
        assert!(cell_type.to_string().starts_with(cell_type.name()));
    }
    assert_eq!(CellType::try_from(18), Err(GridError::UnknownCellType(18)));
}
