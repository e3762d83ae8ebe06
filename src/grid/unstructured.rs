//! Unstructured and curvilinear grids located through a celltree.
//!
//! A query walks the celltree leaves whose region holds the point and runs
//! the exact containment test on each candidate, returning the first cell
//! that accepts it. Points on a shared face may therefore resolve to either
//! neighbour; both yield the same interpolated value for continuous data.

use super::{cell_local_coords, Grid};
use crate::geometry::{CurvilinearPoints, Embedding, ExplicitPoints, PointSet};
use crate::grid_error::GridError;
use crate::locate::{Celltree, CelltreeConfig};
use crate::topology::{Cell, CellComplex, CellType};
use std::sync::Arc;

pub struct UnstructuredGrid<const D: usize> {
    points: Arc<dyn PointSet<D>>,
    complex: CellComplex,
    celltree: Celltree,
}

impl<const D: usize> UnstructuredGrid<D>
where
    [f64; D]: Embedding,
{
    /// Grid over `complex` with the default celltree parameters.
    pub fn new(points: Arc<dyn PointSet<D>>, complex: CellComplex) -> Result<Self, GridError> {
        Self::with_config(points, complex, &CelltreeConfig::default())
    }

    pub fn with_config(
        points: Arc<dyn PointSet<D>>,
        complex: CellComplex,
        config: &CelltreeConfig,
    ) -> Result<Self, GridError> {
        Self::check_embedding(points.as_ref(), &complex)?;
        let celltree = Celltree::build(&complex, points.as_ref(), config)?;
        Ok(Self::assemble(points, complex, celltree))
    }

    /// Grid over `complex` using a previously built (e.g. deserialized)
    /// celltree.
    pub fn with_celltree(
        points: Arc<dyn PointSet<D>>,
        complex: CellComplex,
        celltree: Celltree,
    ) -> Result<Self, GridError> {
        Self::check_embedding(points.as_ref(), &complex)?;
        if celltree.num_cells() != complex.num_cells() || celltree.dimension() != D {
            return Err(GridError::CelltreeMismatch {
                expected_cells: complex.num_cells(),
                found_cells: celltree.num_cells(),
                expected_dimension: D,
                found_dimension: celltree.dimension(),
            });
        }
        Ok(Self::assemble(points, complex, celltree))
    }

    fn check_embedding(points: &dyn PointSet<D>, complex: &CellComplex) -> Result<(), GridError> {
        if complex.num_points() != points.len() {
            return Err(GridError::PointCountMismatch {
                expected: complex.num_points(),
                found: points.len(),
            });
        }
        let topological = complex.max_cell_dimension();
        if topological > D {
            return Err(GridError::TopologyExceedsEmbedding {
                topological,
                spatial: D,
            });
        }
        Ok(())
    }

    fn assemble(points: Arc<dyn PointSet<D>>, complex: CellComplex, celltree: Celltree) -> Self {
        log::debug!(
            "unstructured grid: {} points, {} cells in {} groups, celltree depth {}",
            points.len(),
            complex.num_cells(),
            complex.num_cell_types(),
            celltree.depth()
        );
        Self {
            points,
            complex,
            celltree,
        }
    }

    /// Grid from raw point positions and grouped cell connectivity.
    pub fn from_cells(
        points: Vec<[f64; D]>,
        counts: Vec<(CellType, usize)>,
        indices: Vec<usize>,
    ) -> Result<Self, GridError> {
        let complex = CellComplex::unstructured(points.len(), counts, indices)?;
        Self::new(Arc::new(ExplicitPoints::new(points)?), complex)
    }

    /// Structured topology over explicit (possibly distorted) positions.
    pub fn curvilinear(points: CurvilinearPoints<D>) -> Result<Self, GridError> {
        let complex = match points.extent() {
            Some(extent) => CellComplex::structured(extent)?,
            None => return Err(GridError::UnsupportedStructuredDimension(0)),
        };
        Self::new(Arc::new(points), complex)
    }
}

impl<const D: usize> UnstructuredGrid<D> {
    pub fn celltree(&self) -> &Celltree {
        &self.celltree
    }

    /// Number of candidate cells a query for `p` would test in the worst
    /// case.
    pub fn containment_tests(&self, p: &[f64; D]) -> usize {
        self.celltree.candidates(p).count()
    }
}

impl<const D: usize> Grid<D> for UnstructuredGrid<D>
where
    [f64; D]: Embedding,
{
    fn points(&self) -> &dyn PointSet<D> {
        self.points.as_ref()
    }

    fn complex(&self) -> &CellComplex {
        &self.complex
    }

    fn local_coords(&self, cell: &Cell<'_>, p: &[f64; D]) -> Option<[f64; 3]> {
        cell_local_coords(self.points.as_ref(), cell, p)
    }

    fn locate_local(&self, p: &[f64; D]) -> Option<(Cell<'_>, [f64; 3])> {
        self.celltree.candidates(p).find_map(|i| {
            let cell = self.complex.cell(i);
            self.local_coords(&cell, p).map(|local| (cell, local))
        })
    }
}

impl<const D: usize> std::fmt::Debug for UnstructuredGrid<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnstructuredGrid")
            .field("num_points", &self.points.len())
            .field("complex", &self.complex)
            .field("celltree_depth", &self.celltree.depth())
            .finish()
    }
}
