//! Structured grids over uniform or rectilinear lattices.

use super::{cell_local_coords, Grid};
use crate::geometry::{Aabb, Embedding, LOCAL_TOLERANCE, PointSet, RectilinearPoints, UniformPoints};
use crate::grid_error::GridError;
use crate::topology::{Cell, CellComplex};

/// Lattice geometry whose cells can be found arithmetically.
#[derive(Clone, Debug, PartialEq)]
pub enum StructuredPoints<const D: usize> {
    Uniform(UniformPoints<D>),
    Rectilinear(RectilinearPoints<D>),
}

impl<const D: usize> StructuredPoints<D> {
    pub fn dims(&self) -> &[usize; D] {
        match self {
            StructuredPoints::Uniform(u) => u.dims(),
            StructuredPoints::Rectilinear(r) => r.dims(),
        }
    }

    /// Cell position and local coordinate along axis `d`.
    ///
    /// Points up to `LOCAL_TOLERANCE` (in cell units) outside the lattice are
    /// snapped onto it, matching the slack of the cell containment test.
    fn locate_axis(&self, d: usize, x: f64) -> Option<(usize, f64)> {
        let n = self.dims()[d];
        match self {
            StructuredPoints::Uniform(u) => {
                let last = (n - 1) as f64;
                let t = (x - u.origin()[d]) / u.spacing()[d];
                if !(t >= -LOCAL_TOLERANCE && t <= last + LOCAL_TOLERANCE) {
                    return None;
                }
                let t = t.clamp(0.0, last);
                let i = (t.floor() as usize).min(n - 2);
                Some((i, (t - i as f64).clamp(0.0, 1.0)))
            }
            StructuredPoints::Rectilinear(r) => {
                let axis = r.axis(d);
                let lo = axis[0] - LOCAL_TOLERANCE * (axis[1] - axis[0]);
                let hi = axis[n - 1] + LOCAL_TOLERANCE * (axis[n - 1] - axis[n - 2]);
                if !(x >= lo && x <= hi) {
                    return None;
                }
                let x = x.clamp(axis[0], axis[n - 1]);
                let i = axis[1..n - 1].partition_point(|&a| a < x);
                let t = (x - axis[i]) / (axis[i + 1] - axis[i]);
                Some((i, t.clamp(0.0, 1.0)))
            }
        }
    }
}

impl<const D: usize> PointSet<D> for StructuredPoints<D> {
    fn len(&self) -> usize {
        match self {
            StructuredPoints::Uniform(u) => u.len(),
            StructuredPoints::Rectilinear(r) => r.len(),
        }
    }

    fn point(&self, i: usize) -> [f64; D] {
        match self {
            StructuredPoints::Uniform(u) => u.point(i),
            StructuredPoints::Rectilinear(r) => r.point(i),
        }
    }

    fn bounding_box(&self) -> Aabb<D> {
        match self {
            StructuredPoints::Uniform(u) => u.bounding_box(),
            StructuredPoints::Rectilinear(r) => r.bounding_box(),
        }
    }

    fn extent(&self) -> Option<&[usize]> {
        Some(self.dims())
    }
}

/// A grid whose topology and geometry are both implied by a lattice.
#[derive(Clone, Debug)]
pub struct StructuredGrid<const D: usize> {
    points: StructuredPoints<D>,
    complex: CellComplex,
}

impl<const D: usize> StructuredGrid<D> {
    pub fn new(points: StructuredPoints<D>) -> Result<Self, GridError> {
        let complex = CellComplex::structured(points.dims())?;
        log::debug!(
            "structured grid: extent {:?}, {} cells",
            points.dims(),
            complex.num_cells()
        );
        Ok(Self { points, complex })
    }

    pub fn uniform(extent: [usize; D], origin: [f64; D], spacing: [f64; D]) -> Result<Self, GridError> {
        Self::new(StructuredPoints::Uniform(UniformPoints::new(extent, origin, spacing)?))
    }

    pub fn rectilinear(axes: [Vec<f64>; D]) -> Result<Self, GridError> {
        Self::new(StructuredPoints::Rectilinear(RectilinearPoints::new(axes)?))
    }

    pub fn structured_points(&self) -> &StructuredPoints<D> {
        &self.points
    }

    /// The cell at lattice position `at` (lower-left point coordinates).
    pub fn cell_at(&self, at: [usize; D]) -> Cell<'_> {
        let dims = self.points.dims();
        let mut index = 0;
        let mut stride = 1;
        for d in 0..D {
            index += at[d] * stride;
            stride *= dims[d] - 1;
        }
        self.complex.cell(index)
    }
}

impl<const D: usize> Grid<D> for StructuredGrid<D>
where
    [f64; D]: Embedding,
{
    fn points(&self) -> &dyn PointSet<D> {
        &self.points
    }

    fn complex(&self) -> &CellComplex {
        &self.complex
    }

    fn local_coords(&self, cell: &Cell<'_>, p: &[f64; D]) -> Option<[f64; 3]> {
        cell_local_coords(&self.points, cell, p)
    }

    fn locate_local(&self, p: &[f64; D]) -> Option<(Cell<'_>, [f64; 3])> {
        let mut at = [0; D];
        let mut local = [0.0; 3];
        for d in 0..D {
            let (i, t) = self.points.locate_axis(d, p[d])?;
            at[d] = i;
            local[d] = t;
        }
        Some((self.cell_at(at), local))
    }
}
