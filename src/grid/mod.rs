//! Grids: point geometry plus a cell complex, with point location.
//!
//! [`StructuredGrid`] locates arithmetically in `O(D)`; [`UnstructuredGrid`]
//! goes through a [`Celltree`](crate::locate::Celltree) and exact
//! containment tests. Both implement [`Grid`], and an [`Interpolator`] turns
//! a located point into `(index, weight)` pairs.

pub mod interpolator;
pub mod structured;
pub mod unstructured;

pub use interpolator::{DomainPart, EvaluatorState, Interpolator, Weights};
pub use structured::{StructuredGrid, StructuredPoints};
pub use unstructured::UnstructuredGrid;

use crate::geometry::{Aabb, Embedding, PointSet};
use crate::topology::{Cell, CellComplex, MAX_VALUES_PER_CELL};

/// A located domain. Immutable and shareable across threads.
pub trait Grid<const D: usize>: Send + Sync {
    fn points(&self) -> &dyn PointSet<D>;

    fn complex(&self) -> &CellComplex;

    /// Local coordinates of `p` in `cell`, or `None` if `p` is outside it.
    fn local_coords(&self, cell: &Cell<'_>, p: &[f64; D]) -> Option<[f64; 3]>;

    /// Full search for the cell containing `p`, with its local coordinates.
    fn locate_local(&self, p: &[f64; D]) -> Option<(Cell<'_>, [f64; 3])>;

    /// Full search for the cell containing `p`.
    fn locate(&self, p: &[f64; D]) -> Option<Cell<'_>> {
        self.locate_local(p).map(|(c, _)| c)
    }

    fn contains(&self, cell: &Cell<'_>, p: &[f64; D]) -> bool {
        self.local_coords(cell, p).is_some()
    }

    fn num_cells(&self) -> usize {
        self.complex().num_cells()
    }

    fn num_points(&self) -> usize {
        self.points().len()
    }

    fn bounding_box(&self) -> Aabb<D> {
        self.points().bounding_box()
    }

    /// Average of the geometric vertices.
    fn cell_centroid(&self, cell: &Cell<'_>) -> [f64; D] {
        let mut c = [0.0; D];
        let n = cell.num_vertices();
        for v in cell.vertex_indices() {
            let p = self.points().point(v);
            for d in 0..D {
                c[d] += p[d];
            }
        }
        c.map(|x| x / n as f64)
    }

    fn cell_bounds(&self, cell: &Cell<'_>) -> Aabb<D> {
        let mut b = Aabb::empty();
        for v in cell.vertex_indices() {
            b.extend(&self.points().point(v));
        }
        b
    }

    /// A fresh evaluator over this grid.
    fn interpolator(&self, part: DomainPart) -> Interpolator<'_, D, Self>
    where
        Self: Sized,
    {
        Interpolator::new(self, part)
    }
}

/// Gathers the geometric vertices of `cell` and runs the containment test.
pub(crate) fn cell_local_coords<const D: usize>(
    points: &dyn PointSet<D>,
    cell: &Cell<'_>,
    p: &[f64; D],
) -> Option<[f64; 3]>
where
    [f64; D]: Embedding,
{
    let cell_type = cell.cell_type();
    if !<[f64; D]>::supports(cell_type) {
        return None;
    }
    let mut vertices = [[0.0; D]; MAX_VALUES_PER_CELL];
    let n = cell.num_vertices();
    for (slot, v) in vertices.iter_mut().zip(cell.vertex_indices()) {
        *slot = points.point(v);
    }
    <[f64; D]>::locate_in_cell(cell_type, &vertices[..n], p)
}
