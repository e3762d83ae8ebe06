//! GridError: Unified error type for mesh-locate public APIs
//!
//! Construction-time violations (malformed complexes, bad geometry, invalid
//! configuration) and contract violations at evaluation time are reported
//! through this type. A point outside the grid is *not* an error; it is a
//! normal query outcome (see [`crate::grid::EvaluatorState`]).

use crate::topology::cell_type::CellType;
use thiserror::Error;

/// Unified error type for mesh-locate operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    /// The index array does not hold exactly the number of indices the
    /// declared cell groups require.
    #[error(
        "Topology error: cell groups require {expected} indices, but {found} were provided"
    )]
    IndexCountMismatch { expected: usize, found: usize },
    /// A cell group was declared with zero cells.
    #[error("Topology error: cell group {group} ({cell_type}) declares zero cells")]
    EmptyCellGroup { group: usize, cell_type: CellType },
    /// A cell references a vertex that does not exist in the point set.
    #[error("Topology error: cell {cell} references vertex {vertex}, but only {num_points} points exist")]
    VertexOutOfRange {
        cell: usize,
        vertex: usize,
        num_points: usize,
    },
    /// A point coordinate is infinite or NaN.
    #[error("Geometry error: point {point} has non-finite coordinate {value} in dimension {dimension}")]
    NonFiniteCoordinate {
        point: usize,
        dimension: usize,
        value: f64,
    },
    /// A structured extent has fewer than two points along some dimension.
    #[error("Structure error: extent {extent} along dimension {dimension} (need at least 2 points)")]
    InvalidExtent { dimension: usize, extent: usize },
    /// Structured topology requested for an unsupported number of dimensions.
    #[error("Structure error: {0}-dimensional structured complexes are not supported (1..=3)")]
    UnsupportedStructuredDimension(usize),
    /// Rectilinear axis coordinates are not strictly increasing.
    #[error("Geometry error: axis {dimension} is not strictly increasing at position {position}")]
    NonMonotonicAxis { dimension: usize, position: usize },
    /// Uniform spacing is zero, negative or not finite.
    #[error("Geometry error: spacing {spacing} along dimension {dimension} must be positive and finite")]
    InvalidSpacing { dimension: usize, spacing: f64 },
    /// A curvilinear point array does not match the product of its extent.
    #[error("Structure error: extent describes {expected} points, but {found} were provided")]
    PointCountMismatch { expected: usize, found: usize },
    /// The topological dimension of a structured complex exceeds the spatial one.
    #[error("Structure error: topological dimension {topological} exceeds spatial dimension {spatial}")]
    TopologyExceedsEmbedding { topological: usize, spatial: usize },
    /// Celltree construction parameters are unusable.
    #[error("Celltree configuration error: {0}")]
    InvalidCelltreeConfig(String),
    /// The celltree is deeper than the fixed traversal stack allows.
    #[error("Celltree error: depth {depth} exceeds the traversal limit of {limit}")]
    CelltreeTooDeep { depth: usize, limit: usize },
    /// A prebuilt celltree does not index the grid it is attached to.
    #[error("Celltree error: tree indexes {found_cells} cells in {found_dimension}D, grid has {expected_cells} cells in {expected_dimension}D")]
    CelltreeMismatch {
        expected_cells: usize,
        found_cells: usize,
        expected_dimension: usize,
        found_dimension: usize,
    },
    /// A leaf range or permutation entry of a celltree is inconsistent.
    #[error("Celltree error: {0}")]
    CorruptCelltree(String),
    /// A value was requested from an evaluator that is not located inside the grid.
    #[error("Evaluation at invalid position: the evaluator is not located inside the domain")]
    OutsideDomain,
    /// Face index beyond the number of faces of a cell.
    #[error("Face index {index} out of bounds for {cell_type} with {num_faces} faces")]
    FaceOutOfRange {
        cell_type: CellType,
        index: usize,
        num_faces: usize,
    },
    /// A numeric cell-type code outside the catalog.
    #[error("Unknown cell type code {0}")]
    UnknownCellType(u8),
}
