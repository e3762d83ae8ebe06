//! Lightweight cell views into a [`CellComplex`].

use super::cell_type::CellType;
use super::complex::CellComplex;
use super::strategy::StrategyId;
use crate::debug_invariants::inv_assert;
use crate::grid_error::GridError;
use std::fmt;

/// A cell of a complex: a strategy id plus a base offset.
///
/// Copying a `Cell` is free. Two cells are equal when they come from the
/// same complex and share strategy and base.
#[derive(Clone, Copy)]
pub struct Cell<'a> {
    complex: &'a CellComplex,
    strategy: StrategyId,
    base: usize,
}

impl<'a> Cell<'a> {
    pub(crate) fn new(complex: &'a CellComplex, strategy: StrategyId, base: usize) -> Self {
        Self {
            complex,
            strategy,
            base,
        }
    }

    /// The complex this cell belongs to.
    pub fn complex(&self) -> &'a CellComplex {
        self.complex
    }

    pub fn strategy_id(&self) -> StrategyId {
        self.strategy
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn cell_type(&self) -> CellType {
        self.complex.strategy(self.strategy).cell_type
    }

    pub fn dimension(&self) -> usize {
        self.cell_type().dimension()
    }

    pub fn num_vertices(&self) -> usize {
        self.cell_type().num_vertices()
    }

    pub fn num_values(&self) -> usize {
        self.cell_type().num_values()
    }

    pub fn num_faces(&self) -> usize {
        self.cell_type().num_faces()
    }

    /// Global index of the `i`-th value (vertices come first).
    #[inline]
    pub fn index(&self, i: usize) -> usize {
        let offsets = &self.complex.strategy(self.strategy).offsets;
        inv_assert!(i < offsets.len(), "value {i} out of range for {}", self.cell_type());
        self.complex.resolve(self.base + offsets[i])
    }

    /// Global indices of the geometric vertices.
    pub fn vertex_indices(&self) -> impl ExactSizeIterator<Item = usize> + 'a {
        let cell = *self;
        (0..cell.num_vertices()).map(move |i| cell.index(i))
    }

    /// Global indices of all values.
    pub fn value_indices(&self) -> impl ExactSizeIterator<Item = usize> + 'a {
        let cell = *self;
        (0..cell.num_values()).map(move |i| cell.index(i))
    }

    /// The `i`-th face as a cell of one dimension lower.
    ///
    /// `i` must be below [`num_faces`](Self::num_faces); this is checked in
    /// debug builds and with `strict-invariants`.
    #[inline]
    pub fn face(&self, i: usize) -> Cell<'a> {
        let faces = &self.complex.strategy(self.strategy).faces;
        inv_assert!(
            i < faces.len(),
            "face {i} out of range for {} with {} faces",
            self.cell_type(),
            faces.len()
        );
        Cell::new(self.complex, faces[i], self.base)
    }

    /// Checked variant of [`face`](Self::face).
    pub fn try_face(&self, i: usize) -> Result<Cell<'a>, GridError> {
        let num_faces = self.num_faces();
        if i >= num_faces {
            return Err(GridError::FaceOutOfRange {
                cell_type: self.cell_type(),
                index: i,
                num_faces,
            });
        }
        Ok(self.face(i))
    }

    pub fn faces(&self) -> impl ExactSizeIterator<Item = Cell<'a>> + 'a {
        let cell = *self;
        (0..cell.num_faces()).map(move |i| cell.face(i))
    }

    /// Dispatches to the visitor method matching this cell's type.
    pub fn apply<V: CellVisitor + ?Sized>(&self, visitor: &mut V) {
        use CellType::*;
        match self.cell_type() {
            Point => visitor.visit_point(self),
            Line => visitor.visit_line(self),
            Triangle => visitor.visit_triangle(self),
            Quad => visitor.visit_quad(self),
            Tetrahedron => visitor.visit_tetrahedron(self),
            Pyramid => visitor.visit_pyramid(self),
            Prism => visitor.visit_prism(self),
            Hexahedron => visitor.visit_hexahedron(self),
            SubparametricQuadraticLine => visitor.visit_subparametric_quadratic_line(self),
            SubparametricQuadraticTriangle => visitor.visit_subparametric_quadratic_triangle(self),
            SubparametricQuadraticQuad => visitor.visit_subparametric_quadratic_quad(self),
            SubparametricQuadraticTetrahedron => {
                visitor.visit_subparametric_quadratic_tetrahedron(self)
            }
            SubparametricQuadraticHexahedron => {
                visitor.visit_subparametric_quadratic_hexahedron(self)
            }
            QuadraticLine => visitor.visit_quadratic_line(self),
            QuadraticTriangle => visitor.visit_quadratic_triangle(self),
            QuadraticQuad => visitor.visit_quadratic_quad(self),
            QuadraticTetrahedron => visitor.visit_quadratic_tetrahedron(self),
            QuadraticHexahedron => visitor.visit_quadratic_hexahedron(self),
        }
    }
}

impl PartialEq for Cell<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.complex, other.complex)
            && self.strategy == other.strategy
            && self.base == other.base
    }
}

impl Eq for Cell<'_> {}

impl fmt::Debug for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("type", &self.cell_type())
            .field("strategy", &self.strategy)
            .field("base", &self.base)
            .finish()
    }
}

/// Per-type callbacks for [`Cell::apply`]. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait CellVisitor {
    fn visit_point(&mut self, cell: &Cell<'_>) {}
    fn visit_line(&mut self, cell: &Cell<'_>) {}
    fn visit_triangle(&mut self, cell: &Cell<'_>) {}
    fn visit_quad(&mut self, cell: &Cell<'_>) {}
    fn visit_tetrahedron(&mut self, cell: &Cell<'_>) {}
    fn visit_pyramid(&mut self, cell: &Cell<'_>) {}
    fn visit_prism(&mut self, cell: &Cell<'_>) {}
    fn visit_hexahedron(&mut self, cell: &Cell<'_>) {}
    fn visit_subparametric_quadratic_line(&mut self, cell: &Cell<'_>) {}
    fn visit_subparametric_quadratic_triangle(&mut self, cell: &Cell<'_>) {}
    fn visit_subparametric_quadratic_quad(&mut self, cell: &Cell<'_>) {}
    fn visit_subparametric_quadratic_tetrahedron(&mut self, cell: &Cell<'_>) {}
    fn visit_subparametric_quadratic_hexahedron(&mut self, cell: &Cell<'_>) {}
    fn visit_quadratic_line(&mut self, cell: &Cell<'_>) {}
    fn visit_quadratic_triangle(&mut self, cell: &Cell<'_>) {}
    fn visit_quadratic_quad(&mut self, cell: &Cell<'_>) {}
    fn visit_quadratic_tetrahedron(&mut self, cell: &Cell<'_>) {}
    fn visit_quadratic_hexahedron(&mut self, cell: &Cell<'_>) {}
}
