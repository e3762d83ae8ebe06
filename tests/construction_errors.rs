//! Malformed input is reported through `GridError`. The vertex-range and
//! finiteness checks only run with invariant checking enabled, which test
//! builds always have.

use mesh_locate::prelude::*;

#[test]
fn complex_counts_must_match_the_index_array() {
    let err = CellComplex::unstructured(4, vec![(CellType::Triangle, 2)], vec![0, 1, 2]).unwrap_err();
    assert_eq!(err, GridError::IndexCountMismatch { expected: 6, found: 3 });

    let err = CellComplex::unstructured(4, vec![(CellType::Triangle, 0)], vec![]).unwrap_err();
    assert!(matches!(err, GridError::EmptyCellGroup { group: 0, .. }));
}

#[cfg(any(debug_assertions, feature = "strict-invariants"))]
#[test]
fn vertices_must_exist() {
    let err = CellComplex::unstructured(3, vec![(CellType::Line, 2)], vec![0, 1, 1, 3]).unwrap_err();
    assert_eq!(
        err,
        GridError::VertexOutOfRange {
            cell: 1,
            vertex: 3,
            num_points: 3
        }
    );
}

#[cfg(any(debug_assertions, feature = "strict-invariants"))]
#[test]
fn coordinates_must_be_finite() {
    let err = ExplicitPoints::new(vec![[0.0, 0.0], [1.0, f64::INFINITY]]).unwrap_err();
    assert!(matches!(err, GridError::NonFiniteCoordinate { point: 1, dimension: 1, .. }));
}

#[test]
fn structured_geometry_is_validated() {
    assert!(matches!(
        StructuredGrid::uniform([1, 4], [0.0; 2], [1.0; 2]),
        Err(GridError::InvalidExtent { dimension: 0, extent: 1 })
    ));
    assert!(matches!(
        StructuredGrid::uniform([3, 4], [0.0; 2], [1.0, 0.0]),
        Err(GridError::InvalidSpacing { dimension: 1, .. })
    ));
    assert_eq!(
        StructuredGrid::rectilinear([vec![0.0, 1.0, 1.0]]).unwrap_err(),
        GridError::NonMonotonicAxis { dimension: 0, position: 2 }
    );
    assert_eq!(
        StructuredGrid::<4>::uniform([2; 4], [0.0; 4], [1.0; 4]).unwrap_err(),
        GridError::UnsupportedStructuredDimension(4)
    );
}

#[test]
fn curvilinear_points_must_fill_the_extent() {
    let err = CurvilinearPoints::new(vec![2, 2], vec![[0.0, 0.0]; 3]).unwrap_err();
    assert_eq!(err, GridError::PointCountMismatch { expected: 4, found: 3 });
    let err = CurvilinearPoints::<2>::new(vec![2, 2, 2], vec![[0.0, 0.0]; 8]).unwrap_err();
    assert!(matches!(err, GridError::TopologyExceedsEmbedding { topological: 3, spatial: 2 }));
}

#[test]
fn errors_render_readable_messages() {
    let msg = GridError::FaceOutOfRange {
        cell_type: CellType::Triangle,
        index: 3,
        num_faces: 3,
    }
    .to_string();
    assert!(msg.contains("Face index 3"), "{msg}");
}
