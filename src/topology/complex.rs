//! CellComplex: all cells of a mesh, grouped by type.
//!
//! A complex is either *structured* (cells implied by an N-D extent of
//! points; nothing is stored per cell) or *unstructured* (a flat index array
//! concatenated by type group). Both hand out [`Cell`] views through the same
//! interface and are immutable after construction.
//!
//! # Invariants
//! - Declared cell counts are non-zero.
//! - The index array holds exactly `sum(num_values(type) * count)` entries.
//! - Every index refers to an existing point.
//!
//! The first two checks are `O(types)` and always run. The index range check
//! is `O(n)` and runs in debug builds or with the `strict-invariants`
//! feature.

use super::cell::Cell;
use super::cell_type::CellType;
use super::strategy::{Strategy, StrategyArena, StrategyId};
use crate::debug_invariants::{checks_enabled, DebugInvariants};
use crate::grid_error::GridError;
use itertools::Itertools;

/// Whether cells are implicit or stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TopologyType {
    Structured,
    Unstructured,
}

#[derive(Clone, Debug)]
enum Layout {
    Structured {
        /// Points per axis.
        extent: Vec<usize>,
        root: StrategyId,
    },
    Unstructured {
        indices: Vec<usize>,
        /// Global index of the first cell of each group, plus the total.
        group_first: Vec<usize>,
        /// Index-array position of the first cell of each group.
        group_base: Vec<usize>,
        /// Root strategy of each group.
        group_strategy: Vec<StrategyId>,
    },
}

/// The collection of all cells of a mesh.
#[derive(Clone, Debug)]
pub struct CellComplex {
    layout: Layout,
    counts: Vec<(CellType, usize)>,
    num_points: usize,
    strategies: StrategyArena,
}

impl CellComplex {
    /// Implicit D-linear cells over a lattice with `extent` points per axis
    /// (1 to 3 axes, at least 2 points each).
    pub fn structured(extent: &[usize]) -> Result<Self, GridError> {
        let dim = extent.len();
        let cell_type = match CellType::hyper_cell(dim) {
            Some(t) if dim > 0 => t,
            _ => return Err(GridError::UnsupportedStructuredDimension(dim)),
        };
        for (dimension, &e) in extent.iter().enumerate() {
            if e < 2 {
                return Err(GridError::InvalidExtent { dimension, extent: e });
            }
        }

        // Offsets of the 2^D corners relative to the lower-left point, in
        // catalog order.
        let mut strides = vec![0usize; 1 << dim];
        let mut size = 1;
        for (d, &e) in extent.iter().enumerate() {
            for i in 0..(1usize << d) {
                strides[(2 << d) - 1 - i] = size + strides[i];
            }
            size *= e;
        }

        let mut strategies = StrategyArena::default();
        let root = strategies.insert(cell_type, strides);
        let num_cells = extent.iter().map(|e| e - 1).product();
        Ok(Self {
            layout: Layout::Structured {
                extent: extent.to_vec(),
                root,
            },
            counts: vec![(cell_type, num_cells)],
            num_points: size,
            strategies,
        })
    }

    /// Explicit cells: `counts` lists `(type, count)` groups in storage order
    /// and `indices` holds `num_values(type)` point indices per cell.
    pub fn unstructured(
        num_points: usize,
        counts: Vec<(CellType, usize)>,
        indices: Vec<usize>,
    ) -> Result<Self, GridError> {
        let mut expected = 0usize;
        for (group, &(cell_type, count)) in counts.iter().enumerate() {
            if count == 0 {
                return Err(GridError::EmptyCellGroup { group, cell_type });
            }
            expected += cell_type.num_values() * count;
        }
        if expected != indices.len() {
            return Err(GridError::IndexCountMismatch {
                expected,
                found: indices.len(),
            });
        }

        let mut strategies = StrategyArena::default();
        let mut roots: Vec<(CellType, StrategyId)> = Vec::new();
        let mut group_first = Vec::with_capacity(counts.len() + 1);
        let mut group_base = Vec::with_capacity(counts.len());
        let mut group_strategy = Vec::with_capacity(counts.len());
        let (mut first, mut base) = (0, 0);
        for &(cell_type, count) in &counts {
            let root = match roots.iter().find(|(t, _)| *t == cell_type) {
                Some(&(_, id)) => id,
                None => {
                    let id = strategies.insert(cell_type, (0..cell_type.num_values()).collect());
                    roots.push((cell_type, id));
                    id
                }
            };
            group_first.push(first);
            group_base.push(base);
            group_strategy.push(root);
            first += count;
            base += count * cell_type.num_values();
        }
        group_first.push(first);

        let complex = Self {
            layout: Layout::Unstructured {
                indices,
                group_first,
                group_base,
                group_strategy,
            },
            counts,
            num_points,
            strategies,
        };
        if checks_enabled() {
            complex.validate_invariants()?;
            complex.warn_degenerate();
        }
        Ok(complex)
    }

    pub fn topology_type(&self) -> TopologyType {
        match self.layout {
            Layout::Structured { .. } => TopologyType::Structured,
            Layout::Unstructured { .. } => TopologyType::Unstructured,
        }
    }

    /// Points per axis of a structured complex.
    pub fn extent(&self) -> Option<&[usize]> {
        match &self.layout {
            Layout::Structured { extent, .. } => Some(extent),
            Layout::Unstructured { .. } => None,
        }
    }

    /// Number of points the cells index into.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn num_cells(&self) -> usize {
        self.counts.iter().map(|&(_, n)| n).sum()
    }

    /// Number of `(type, count)` groups.
    pub fn num_cell_types(&self) -> usize {
        self.counts.len()
    }

    /// Cell type of the `i`-th group.
    pub fn cell_type(&self, i: usize) -> CellType {
        self.counts[i].0
    }

    /// Cell count of the `i`-th group.
    pub fn cell_count(&self, i: usize) -> usize {
        self.counts[i].1
    }

    pub fn cell_type_dimension(&self, i: usize) -> usize {
        self.counts[i].0.dimension()
    }

    pub fn cell_counts(&self) -> &[(CellType, usize)] {
        &self.counts
    }

    pub fn max_cell_dimension(&self) -> usize {
        self.counts
            .iter()
            .map(|(t, _)| t.dimension())
            .max()
            .unwrap_or(0)
    }

    /// Whether every cell is a simplex.
    pub fn is_simplicial(&self) -> bool {
        self.counts.iter().all(|(t, _)| t.is_simplex())
    }

    /// The cell with global index `i`. `O(1)` for structured complexes,
    /// `O(log types)` for unstructured ones.
    ///
    /// Panics if `i >= num_cells()`.
    pub fn cell(&self, i: usize) -> Cell<'_> {
        match &self.layout {
            Layout::Structured { extent, root } => {
                assert!(i < self.num_cells(), "cell index {i} out of range");
                let mut rest = i;
                let (mut base, mut size) = (0, 1);
                for &e in extent {
                    base += size * (rest % (e - 1));
                    rest /= e - 1;
                    size *= e;
                }
                Cell::new(self, *root, base)
            }
            Layout::Unstructured {
                group_first,
                group_base,
                group_strategy,
                ..
            } => {
                assert!(i < self.num_cells(), "cell index {i} out of range");
                let g = group_first.partition_point(|&f| f <= i) - 1;
                let nv = self.counts[g].0.num_values();
                Cell::new(self, group_strategy[g], group_base[g] + (i - group_first[g]) * nv)
            }
        }
    }

    /// Inverse of [`cell`](Self::cell). For face views, the index of the cell
    /// the face belongs to.
    pub fn index(&self, cell: &Cell<'_>) -> usize {
        let base = cell.base();
        match &self.layout {
            Layout::Structured { extent, .. } => {
                let mut rest = base;
                let (mut index, mut size) = (0, 1);
                for &e in extent {
                    index += size * (rest % e);
                    rest /= e;
                    size *= e - 1;
                }
                index
            }
            Layout::Unstructured {
                group_first,
                group_base,
                ..
            } => {
                let g = group_base.partition_point(|&b| b <= base) - 1;
                let nv = self.counts[g].0.num_values();
                group_first[g] + (base - group_base[g]) / nv
            }
        }
    }

    /// All cells in index order.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = Cell<'_>> + '_ {
        (0..self.num_cells()).map(move |i| self.cell(i))
    }

    #[inline]
    pub(crate) fn strategy(&self, id: StrategyId) -> &Strategy {
        self.strategies.get(id)
    }

    /// Turns a strategy slot into a point index.
    #[inline]
    pub(crate) fn resolve(&self, slot: usize) -> usize {
        match &self.layout {
            Layout::Structured { .. } => slot,
            Layout::Unstructured { indices, .. } => indices[slot],
        }
    }

    /// Logs cells that repeat a vertex; they have no interior and are never
    /// located.
    fn warn_degenerate(&self) {
        let degenerate = self
            .cells()
            .filter(|c| !c.vertex_indices().all_unique())
            .count();
        if degenerate > 0 {
            log::warn!("cell complex contains {degenerate} degenerate cells with repeated vertices");
        }
    }
}

impl DebugInvariants for CellComplex {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "CellComplex");
    }

    fn validate_invariants(&self) -> Result<(), GridError> {
        let Layout::Unstructured {
            indices,
            group_first,
            group_base,
            ..
        } = &self.layout
        else {
            return Ok(());
        };
        let expected: usize = self
            .counts
            .iter()
            .map(|(t, n)| t.num_values() * n)
            .sum();
        if expected != indices.len() {
            return Err(GridError::IndexCountMismatch {
                expected,
                found: indices.len(),
            });
        }
        if let Some(pos) = indices.iter().position(|&v| v >= self.num_points) {
            let g = group_base.partition_point(|&b| b <= pos) - 1;
            let nv = self.counts[g].0.num_values();
            let cell = group_first[g] + (pos - group_base[g]) / nv;
            return Err(GridError::VertexOutOfRange {
                cell,
                vertex: indices[pos],
                num_points: self.num_points,
            });
        }
        Ok(())
    }
}
