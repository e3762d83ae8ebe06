//! Stateful evaluation: locate a point once, then read its weights.
//!
//! An [`Interpolator`] starts `Unbound`. Every `reset` moves it to
//! `Located` or `OutOfDomain` depending on whether the point was found.
//!
//! `reset` tries the previously located cell before running a full search,
//! so consecutive nearby queries (stream lines, probes along a ray) mostly
//! skip the celltree.

use super::Grid;
use crate::geometry::shape;
use crate::grid_error::GridError;
use crate::topology::{Cell, MAX_VALUES_PER_CELL};
use std::marker::PhantomData;

/// Where the data combined with the weights lives.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DomainPart {
    /// One value per point; weights come from the cell's shape functions.
    #[default]
    Points,
    /// One value per cell; the containing cell gets weight 1.
    Cells,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EvaluatorState {
    /// No query yet.
    Unbound,
    /// The last query point lies in a cell; weights are available.
    Located,
    /// The last query point lies outside every cell.
    OutOfDomain,
}

/// Interpolation weights of one located point.
#[derive(Clone, Copy, Debug)]
pub struct Weights<'a> {
    indices: &'a [usize],
    weights: &'a [f64],
}

impl<'a> Weights<'a> {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Point (or cell) indices the weights refer to.
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    pub fn weights(&self) -> &'a [f64] {
        self.weights
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, f64)> + 'a {
        self.indices.iter().copied().zip(self.weights.iter().copied())
    }

    /// Weighted sum of scalar data indexed like the grid's points (or cells).
    pub fn combine(&self, values: &[f64]) -> f64 {
        self.iter().map(|(i, w)| w * values[i]).sum()
    }

    /// Weighted sum of vector data.
    pub fn combine_vectors<const N: usize>(&self, values: &[[f64; N]]) -> [f64; N] {
        let mut out = [0.0; N];
        for (i, w) in self.iter() {
            for (o, v) in out.iter_mut().zip(values[i].iter()) {
                *o += w * v;
            }
        }
        out
    }
}

/// Reusable evaluator over a shared grid.
///
/// Cheap to create; each thread builds its own over the same `Grid`.
pub struct Interpolator<'g, const D: usize, G: Grid<D> + ?Sized> {
    grid: &'g G,
    part: DomainPart,
    state: EvaluatorState,
    cell: Option<Cell<'g>>,
    local: [f64; 3],
    len: usize,
    indices: [usize; MAX_VALUES_PER_CELL],
    weights: [f64; MAX_VALUES_PER_CELL],
    cache_hits: usize,
    _dim: PhantomData<[f64; D]>,
}

impl<'g, const D: usize, G: Grid<D> + ?Sized> Interpolator<'g, D, G> {
    pub fn new(grid: &'g G, part: DomainPart) -> Self {
        Self {
            grid,
            part,
            state: EvaluatorState::Unbound,
            cell: None,
            local: [0.0; 3],
            len: 0,
            indices: [0; MAX_VALUES_PER_CELL],
            weights: [0.0; MAX_VALUES_PER_CELL],
            cache_hits: 0,
            _dim: PhantomData,
        }
    }

    /// Moves the evaluator to `p`. Returns whether `p` was located.
    pub fn reset(&mut self, p: &[f64; D]) -> bool {
        if let Some(cell) = self.cell {
            if let Some(local) = self.grid.local_coords(&cell, p) {
                self.cache_hits += 1;
                self.bind(cell, local);
                return true;
            }
        }
        match self.grid.locate_local(p) {
            Some((cell, local)) => {
                self.bind(cell, local);
                true
            }
            None => {
                self.state = EvaluatorState::OutOfDomain;
                self.len = 0;
                false
            }
        }
    }

    fn bind(&mut self, cell: Cell<'g>, local: [f64; 3]) {
        self.cell = Some(cell);
        self.local = local;
        self.state = EvaluatorState::Located;
        match self.part {
            DomainPart::Points => {
                let eval = shape::evaluate(cell.cell_type(), &local);
                self.len = cell.num_values();
                for (i, w) in eval.values().iter().enumerate() {
                    self.indices[i] = cell.index(i);
                    self.weights[i] = *w;
                }
            }
            DomainPart::Cells => {
                self.len = 1;
                self.indices[0] = self.grid.complex().index(&cell);
                self.weights[0] = 1.0;
            }
        }
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    pub fn is_located(&self) -> bool {
        self.state == EvaluatorState::Located
    }

    pub fn part(&self) -> DomainPart {
        self.part
    }

    pub fn grid(&self) -> &'g G {
        self.grid
    }

    /// The cell of the last successful query. Kept after an out-of-domain
    /// query so the next `reset` can still try it first.
    pub fn cell(&self) -> Option<Cell<'g>> {
        if self.is_located() { self.cell } else { None }
    }

    /// Local coordinates of the current point in its cell.
    pub fn local_coords(&self) -> Option<[f64; 3]> {
        self.is_located().then_some(self.local)
    }

    /// Number of queries answered by the cached cell.
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Weights of the current point.
    ///
    /// Fails with [`GridError::OutsideDomain`] unless the evaluator is
    /// [`Located`](EvaluatorState::Located).
    pub fn value(&self) -> Result<Weights<'_>, GridError> {
        if !self.is_located() {
            return Err(GridError::OutsideDomain);
        }
        Ok(Weights {
            indices: &self.indices[..self.len],
            weights: &self.weights[..self.len],
        })
    }
}
