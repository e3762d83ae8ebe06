//! Cell type catalog: the fixed topology of every supported cell shape.
//!
//! Vertex numbering (local indices) used throughout the crate:
//!
//! ```text
//! Triangle    Quad
//!
//!    0       0----3
//!   / \      |    |
//!  /   \     |    |
//! 1-----2    1----2
//!
//!   Tetrahedron        Prism        Pyramid       Hexahedron
//!
//!                         3                        4--------5
//!        3              / |\             4        /|       /|
//!       /|\           /   | \          //|\      / |      / |
//!      / | \        5--------4        // | \    7--------6  |
//!     /  |  \       |     |  |       //  |  \   |  |     |  |
//!    /   2   \      |     2  |      /3---|--2   |  3-----|--2
//!   /  /   \  \     |   /  \ |     //    | /    | /      | /
//!  / /       \ \    | /     \|    //     |/     |/       |/
//! 0-------------1   0--------1   0-------1      0--------1
//! ```
//!
//! Quadratic cells append one node per edge after the corner vertices: edge
//! `k` of a triangle or quad runs from corner `k` to corner `k + 1` and its
//! midpoint is node `n + k`, where `n` is the number of corners. Tetrahedron
//! edges are numbered `(0,1) (1,2) (2,0) (0,3) (1,3) (2,3)`, hexahedron edges
//! `(0,1) (1,2) (2,3) (3,0) (4,5) (5,6) (6,7) (7,4) (0,7) (1,6) (2,5) (3,4)`.
//! A quadratic line is `0--2--1`.
//!
//! Subparametric cells share the geometry of their linear counterpart but
//! carry the values of the quadratic one: they have the linear vertex count
//! and the quadratic value count.

use crate::grid_error::GridError;
use std::fmt;

/// Largest number of values a single cell carries (the 20-node hexahedron).
pub const MAX_VALUES_PER_CELL: usize = 20;

/// Largest topological dimension of any cell.
pub const MAX_CELL_DIMENSION: usize = 3;

/// Every supported cell shape.
///
/// The discriminants are stable and used by [`TryFrom<u8>`].
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(u8)]
pub enum CellType {
    /// 0D vertex.
    #[default]
    Point = 0,
    /// 1D segment.
    Line = 1,
    /// 2D simplex.
    Triangle = 2,
    /// 2D tensor-product cell.
    Quad = 3,
    /// 3D simplex.
    Tetrahedron = 4,
    /// 3D pyramid with a quadrilateral base.
    Pyramid = 5,
    /// 3D wedge.
    Prism = 6,
    /// 3D tensor-product cell.
    Hexahedron = 7,
    /// Linear segment with an extra value at the edge center.
    SubparametricQuadraticLine = 8,
    /// Linear triangle with values at the edge centers.
    SubparametricQuadraticTriangle = 9,
    /// Linear quad with values at the edge centers.
    SubparametricQuadraticQuad = 10,
    /// Linear tetrahedron with values at the edge centers.
    SubparametricQuadraticTetrahedron = 11,
    /// Linear hexahedron with values at the edge centers.
    SubparametricQuadraticHexahedron = 12,
    /// 3-node isoparametric segment.
    QuadraticLine = 13,
    /// 6-node isoparametric triangle.
    QuadraticTriangle = 14,
    /// 8-node (serendipity) isoparametric quad.
    QuadraticQuad = 15,
    /// 10-node isoparametric tetrahedron.
    QuadraticTetrahedron = 16,
    /// 20-node (serendipity) isoparametric hexahedron.
    QuadraticHexahedron = 17,
}

/// The reference domain a cell's local coordinates live in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReferenceDomain {
    /// A single point; no local coordinates.
    Point,
    /// `r` in `[0, 1]`.
    Interval,
    /// `r, s >= 0`, `r + s <= 1`.
    Triangle,
    /// `r, s` in `[0, 1]`.
    Square,
    /// `r, s, t >= 0`, `r + s + t <= 1`.
    Tetrahedron,
    /// `r, s, t` in `[0, 1]`, base quad collapsed to the apex as `t -> 1`.
    Pyramid,
    /// `r, s` in the unit triangle, `t` in `[0, 1]`.
    Prism,
    /// `r, s, t` in `[0, 1]`.
    Cube,
}

impl ReferenceDomain {
    /// Tests whether `local` lies in the domain, allowing an overshoot of `tol`.
    pub fn contains(self, local: &[f64; 3], tol: f64) -> bool {
        let [r, s, t] = *local;
        let unit = |x: f64| x >= -tol && x <= 1.0 + tol;
        match self {
            ReferenceDomain::Point => true,
            ReferenceDomain::Interval => unit(r),
            ReferenceDomain::Triangle => r >= -tol && s >= -tol && r + s <= 1.0 + tol,
            ReferenceDomain::Square => unit(r) && unit(s),
            ReferenceDomain::Tetrahedron => {
                r >= -tol && s >= -tol && t >= -tol && r + s + t <= 1.0 + tol
            }
            ReferenceDomain::Pyramid | ReferenceDomain::Cube => unit(r) && unit(s) && unit(t),
            ReferenceDomain::Prism => r >= -tol && s >= -tol && r + s <= 1.0 + tol && unit(t),
        }
    }

    /// A point well inside the domain, used to seed Newton iterations.
    pub fn center(self) -> [f64; 3] {
        match self {
            ReferenceDomain::Point => [0.0; 3],
            ReferenceDomain::Interval => [0.5, 0.0, 0.0],
            ReferenceDomain::Triangle => [1.0 / 3.0, 1.0 / 3.0, 0.0],
            ReferenceDomain::Square => [0.5, 0.5, 0.0],
            ReferenceDomain::Tetrahedron => [0.25, 0.25, 0.25],
            ReferenceDomain::Pyramid => [0.5, 0.5, 0.2],
            ReferenceDomain::Prism => [1.0 / 3.0, 1.0 / 3.0, 0.5],
            ReferenceDomain::Cube => [0.5, 0.5, 0.5],
        }
    }
}

/// One face of a cell: its shape and the local value positions it uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Face {
    pub cell_type: CellType,
    pub local: &'static [usize],
}

const fn face(cell_type: CellType, local: &'static [usize]) -> Face {
    Face { cell_type, local }
}

use CellType::*;

const LINE_FACES: [Face; 2] = [face(Point, &[0]), face(Point, &[1])];
const TRIANGLE_FACES: [Face; 3] = [face(Line, &[0, 1]), face(Line, &[1, 2]), face(Line, &[2, 0])];
const QUAD_FACES: [Face; 4] = [
    face(Line, &[0, 1]),
    face(Line, &[1, 2]),
    face(Line, &[2, 3]),
    face(Line, &[3, 0]),
];
const TETRAHEDRON_FACES: [Face; 4] = [
    face(Triangle, &[1, 2, 3]),
    face(Triangle, &[0, 3, 2]),
    face(Triangle, &[0, 1, 3]),
    face(Triangle, &[0, 2, 1]),
];
const PYRAMID_FACES: [Face; 5] = [
    face(Quad, &[0, 3, 2, 1]),
    face(Triangle, &[0, 1, 4]),
    face(Triangle, &[1, 2, 4]),
    face(Triangle, &[2, 3, 4]),
    face(Triangle, &[3, 0, 4]),
];
const PRISM_FACES: [Face; 5] = [
    face(Triangle, &[0, 2, 1]),
    face(Triangle, &[3, 4, 5]),
    face(Quad, &[0, 1, 4, 5]),
    face(Quad, &[1, 2, 3, 4]),
    face(Quad, &[2, 0, 5, 3]),
];
const HEXAHEDRON_FACES: [Face; 6] = [
    face(Quad, &[0, 3, 2, 1]),
    face(Quad, &[4, 5, 6, 7]),
    face(Quad, &[0, 1, 6, 7]),
    face(Quad, &[3, 2, 5, 4]),
    face(Quad, &[0, 7, 4, 3]),
    face(Quad, &[1, 2, 5, 6]),
];

const SUB_TRIANGLE_FACES: [Face; 3] = [
    face(SubparametricQuadraticLine, &[0, 1, 3]),
    face(SubparametricQuadraticLine, &[1, 2, 4]),
    face(SubparametricQuadraticLine, &[2, 0, 5]),
];
const QUADRATIC_TRIANGLE_FACES: [Face; 3] = [
    face(QuadraticLine, &[0, 1, 3]),
    face(QuadraticLine, &[1, 2, 4]),
    face(QuadraticLine, &[2, 0, 5]),
];
const SUB_QUAD_FACES: [Face; 4] = [
    face(SubparametricQuadraticLine, &[0, 1, 4]),
    face(SubparametricQuadraticLine, &[1, 2, 5]),
    face(SubparametricQuadraticLine, &[2, 3, 6]),
    face(SubparametricQuadraticLine, &[3, 0, 7]),
];
const QUADRATIC_QUAD_FACES: [Face; 4] = [
    face(QuadraticLine, &[0, 1, 4]),
    face(QuadraticLine, &[1, 2, 5]),
    face(QuadraticLine, &[2, 3, 6]),
    face(QuadraticLine, &[3, 0, 7]),
];

const TET_EDGE_FACES: [&[usize]; 4] = [
    &[1, 2, 3, 5, 9, 8],
    &[0, 3, 2, 7, 9, 6],
    &[0, 1, 3, 4, 8, 7],
    &[0, 2, 1, 6, 5, 4],
];
const SUB_TETRAHEDRON_FACES: [Face; 4] = [
    face(SubparametricQuadraticTriangle, TET_EDGE_FACES[0]),
    face(SubparametricQuadraticTriangle, TET_EDGE_FACES[1]),
    face(SubparametricQuadraticTriangle, TET_EDGE_FACES[2]),
    face(SubparametricQuadraticTriangle, TET_EDGE_FACES[3]),
];
const QUADRATIC_TETRAHEDRON_FACES: [Face; 4] = [
    face(QuadraticTriangle, TET_EDGE_FACES[0]),
    face(QuadraticTriangle, TET_EDGE_FACES[1]),
    face(QuadraticTriangle, TET_EDGE_FACES[2]),
    face(QuadraticTriangle, TET_EDGE_FACES[3]),
];

const HEX_EDGE_FACES: [&[usize]; 6] = [
    &[0, 3, 2, 1, 11, 10, 9, 8],
    &[4, 5, 6, 7, 12, 13, 14, 15],
    &[0, 1, 6, 7, 8, 17, 14, 16],
    &[3, 2, 5, 4, 10, 18, 12, 19],
    &[0, 7, 4, 3, 16, 15, 19, 11],
    &[1, 2, 5, 6, 9, 18, 13, 17],
];
const SUB_HEXAHEDRON_FACES: [Face; 6] = [
    face(SubparametricQuadraticQuad, HEX_EDGE_FACES[0]),
    face(SubparametricQuadraticQuad, HEX_EDGE_FACES[1]),
    face(SubparametricQuadraticQuad, HEX_EDGE_FACES[2]),
    face(SubparametricQuadraticQuad, HEX_EDGE_FACES[3]),
    face(SubparametricQuadraticQuad, HEX_EDGE_FACES[4]),
    face(SubparametricQuadraticQuad, HEX_EDGE_FACES[5]),
];
const QUADRATIC_HEXAHEDRON_FACES: [Face; 6] = [
    face(QuadraticQuad, HEX_EDGE_FACES[0]),
    face(QuadraticQuad, HEX_EDGE_FACES[1]),
    face(QuadraticQuad, HEX_EDGE_FACES[2]),
    face(QuadraticQuad, HEX_EDGE_FACES[3]),
    face(QuadraticQuad, HEX_EDGE_FACES[4]),
    face(QuadraticQuad, HEX_EDGE_FACES[5]),
];

impl CellType {
    /// Every cell type, in code order.
    pub const ALL: [CellType; 18] = [
        Point,
        Line,
        Triangle,
        Quad,
        Tetrahedron,
        Pyramid,
        Prism,
        Hexahedron,
        SubparametricQuadraticLine,
        SubparametricQuadraticTriangle,
        SubparametricQuadraticQuad,
        SubparametricQuadraticTetrahedron,
        SubparametricQuadraticHexahedron,
        QuadraticLine,
        QuadraticTriangle,
        QuadraticQuad,
        QuadraticTetrahedron,
        QuadraticHexahedron,
    ];

    /// Human-readable name of the cell type.
    pub fn name(self) -> &'static str {
        match self {
            Point => "Points",
            Line => "Lines",
            Triangle => "Triangles",
            Quad => "Quads",
            Tetrahedron => "Tetrahedra",
            Pyramid => "Pyramids",
            Prism => "Prisms",
            Hexahedron => "Hexahedra",
            SubparametricQuadraticLine => "Subparametric Quadratic Line",
            SubparametricQuadraticTriangle => "Subparametric Quadratic Triangle",
            SubparametricQuadraticQuad => "Subparametric Quadratic Quad",
            SubparametricQuadraticTetrahedron => "Subparametric Quadratic Tetrahedron",
            SubparametricQuadraticHexahedron => "Subparametric Quadratic Hexahedron",
            QuadraticLine => "Quadratic Line",
            QuadraticTriangle => "Quadratic Triangle",
            QuadraticQuad => "Quadratic Quad",
            QuadraticTetrahedron => "Quadratic Tetrahedron",
            QuadraticHexahedron => "Quadratic Hexahedron",
        }
    }

    /// Returns the topological dimension of the cell.
    pub const fn dimension(self) -> usize {
        match self {
            Point => 0,
            Line | SubparametricQuadraticLine | QuadraticLine => 1,
            Triangle
            | Quad
            | SubparametricQuadraticTriangle
            | SubparametricQuadraticQuad
            | QuadraticTriangle
            | QuadraticQuad => 2,
            Tetrahedron
            | Pyramid
            | Prism
            | Hexahedron
            | SubparametricQuadraticTetrahedron
            | SubparametricQuadraticHexahedron
            | QuadraticTetrahedron
            | QuadraticHexahedron => 3,
        }
    }

    /// Number of geometric control points.
    pub const fn num_vertices(self) -> usize {
        match self {
            Point => 1,
            Line | SubparametricQuadraticLine => 2,
            Triangle | SubparametricQuadraticTriangle => 3,
            Quad | Tetrahedron | SubparametricQuadraticQuad | SubparametricQuadraticTetrahedron => 4,
            Pyramid => 5,
            Prism => 6,
            Hexahedron | SubparametricQuadraticHexahedron => 8,
            QuadraticLine => 3,
            QuadraticTriangle => 6,
            QuadraticQuad => 8,
            QuadraticTetrahedron => 10,
            QuadraticHexahedron => 20,
        }
    }

    /// Number of values (data positions) stored per cell; never less than
    /// [`num_vertices`](Self::num_vertices).
    pub const fn num_values(self) -> usize {
        match self {
            SubparametricQuadraticLine => 3,
            SubparametricQuadraticTriangle => 6,
            SubparametricQuadraticQuad => 8,
            SubparametricQuadraticTetrahedron => 10,
            SubparametricQuadraticHexahedron => 20,
            other => other.num_vertices(),
        }
    }

    /// The faces of the cell, in face-index order.
    pub fn faces(self) -> &'static [Face] {
        match self {
            Point => &[],
            Line | SubparametricQuadraticLine | QuadraticLine => &LINE_FACES,
            Triangle => &TRIANGLE_FACES,
            Quad => &QUAD_FACES,
            Tetrahedron => &TETRAHEDRON_FACES,
            Pyramid => &PYRAMID_FACES,
            Prism => &PRISM_FACES,
            Hexahedron => &HEXAHEDRON_FACES,
            SubparametricQuadraticTriangle => &SUB_TRIANGLE_FACES,
            SubparametricQuadraticQuad => &SUB_QUAD_FACES,
            SubparametricQuadraticTetrahedron => &SUB_TETRAHEDRON_FACES,
            SubparametricQuadraticHexahedron => &SUB_HEXAHEDRON_FACES,
            QuadraticTriangle => &QUADRATIC_TRIANGLE_FACES,
            QuadraticQuad => &QUADRATIC_QUAD_FACES,
            QuadraticTetrahedron => &QUADRATIC_TETRAHEDRON_FACES,
            QuadraticHexahedron => &QUADRATIC_HEXAHEDRON_FACES,
        }
    }

    /// Number of faces.
    pub fn num_faces(self) -> usize {
        self.faces().len()
    }

    /// The shape whose functions map local coordinates to space.
    ///
    /// Subparametric cells are geometrically linear.
    pub const fn geometry_type(self) -> CellType {
        match self {
            SubparametricQuadraticLine => Line,
            SubparametricQuadraticTriangle => Triangle,
            SubparametricQuadraticQuad => Quad,
            SubparametricQuadraticTetrahedron => Tetrahedron,
            SubparametricQuadraticHexahedron => Hexahedron,
            other => other,
        }
    }

    /// The shape whose functions interpolate the cell's values.
    pub const fn value_type(self) -> CellType {
        match self {
            SubparametricQuadraticLine => QuadraticLine,
            SubparametricQuadraticTriangle => QuadraticTriangle,
            SubparametricQuadraticQuad => QuadraticQuad,
            SubparametricQuadraticTetrahedron => QuadraticTetrahedron,
            SubparametricQuadraticHexahedron => QuadraticHexahedron,
            other => other,
        }
    }

    /// The reference domain of the local coordinates.
    pub const fn reference_domain(self) -> ReferenceDomain {
        match self.geometry_type() {
            Point => ReferenceDomain::Point,
            Line | QuadraticLine => ReferenceDomain::Interval,
            Triangle | QuadraticTriangle => ReferenceDomain::Triangle,
            Quad | QuadraticQuad => ReferenceDomain::Square,
            Tetrahedron | QuadraticTetrahedron => ReferenceDomain::Tetrahedron,
            Pyramid => ReferenceDomain::Pyramid,
            Prism => ReferenceDomain::Prism,
            _ => ReferenceDomain::Cube,
        }
    }

    /// Whether the cell is a simplex (point, line, triangle or tetrahedron
    /// of any order).
    pub const fn is_simplex(self) -> bool {
        matches!(
            self.reference_domain(),
            ReferenceDomain::Point
                | ReferenceDomain::Interval
                | ReferenceDomain::Triangle
                | ReferenceDomain::Tetrahedron
        )
    }

    /// Whether values beyond the corners are interpolated quadratically.
    pub const fn is_quadratic(self) -> bool {
        (self as u8) >= (SubparametricQuadraticLine as u8)
    }

    /// The D-linear tensor-product cell of topological dimension `d`, used by
    /// structured complexes.
    pub const fn hyper_cell(d: usize) -> Option<CellType> {
        match d {
            0 => Some(Point),
            1 => Some(Line),
            2 => Some(Quad),
            3 => Some(Hexahedron),
            _ => None,
        }
    }
}

impl TryFrom<u8> for CellType {
    type Error = GridError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        CellType::ALL
            .get(code as usize)
            .copied()
            .ok_or(GridError::UnknownCellType(code))
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u8)
    }
}
