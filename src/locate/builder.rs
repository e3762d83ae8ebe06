//! Celltree construction.
//!
//! Each node buckets its cells' centers along every axis and picks the
//! bucket boundary minimizing `lvol * lcount + rvol * rcount`, where the
//! volumes are the extents reached by the cells on either side. When no
//! boundary separates the cells, the node is split at the median center
//! along its longest axis instead.
//!
//! With the `rayon` feature, bounding boxes are computed in parallel and
//! large subtrees are built concurrently; nodes are appended to a shared
//! array under a lock and re-laid out breadth first at the end.

use super::celltree::{Celltree, CelltreeConfig, Node, MAX_DEPTH};
use crate::debug_invariants::DebugInvariants;
use crate::geometry::PointSet;
use crate::grid_error::GridError;
use crate::topology::CellComplex;
use parking_lot::Mutex;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Node links keep 30 bits; two nodes per cell at most.
const MAX_CELLS: usize = 1 << 28;

struct PerCell<const D: usize> {
    ind: u32,
    min: [f32; D],
    max: [f32; D],
}

impl<const D: usize> PerCell<D> {
    /// Twice the center along `d`.
    #[inline]
    fn center2(&self, d: usize) -> f32 {
        self.min[d] + self.max[d]
    }
}

#[derive(Clone, Copy)]
struct Bucket {
    min: f32,
    max: f32,
    cnt: usize,
}

impl Default for Bucket {
    fn default() -> Self {
        Self {
            min: f32::MAX,
            max: -f32::MAX,
            cnt: 0,
        }
    }
}

impl Bucket {
    fn add(&mut self, min: f32, max: f32) {
        self.cnt += 1;
        self.min = self.min.min(min);
        self.max = self.max.max(max);
    }
}

fn next_up(f: f32) -> f32 {
    if f.is_nan() || f == f32::INFINITY {
        return f;
    }
    if f == 0.0 {
        return f32::from_bits(1);
    }
    let bits = f.to_bits();
    f32::from_bits(if f > 0.0 { bits + 1 } else { bits - 1 })
}

fn next_down(f: f32) -> f32 {
    -next_up(-f)
}

/// Largest `f32` not above `x`.
pub(crate) fn round_down(x: f64) -> f32 {
    let f = x as f32;
    if f64::from(f) > x { next_down(f) } else { f }
}

/// Smallest `f32` not below `x`.
pub(crate) fn round_up(x: f64) -> f32 {
    let f = x as f32;
    if f64::from(f) < x { next_up(f) } else { f }
}

fn cell_bounds<const D: usize>(
    complex: &CellComplex,
    points: &dyn PointSet<D>,
    i: usize,
) -> PerCell<D> {
    let mut min = [f64::INFINITY; D];
    let mut max = [f64::NEG_INFINITY; D];
    for v in complex.cell(i).vertex_indices() {
        let p = points.point(v);
        for d in 0..D {
            min[d] = min[d].min(p[d]);
            max[d] = max[d].max(p[d]);
        }
    }
    PerCell {
        ind: i as u32,
        min: min.map(round_down),
        max: max.map(round_up),
    }
}

struct Splitter<'a> {
    nodes: &'a Mutex<Vec<Node>>,
    buckets: usize,
    leaf_size: usize,
    #[cfg(feature = "rayon")]
    parallel_threshold: usize,
}

struct Split {
    dim: usize,
    plane: f32,
}

impl Splitter<'_> {
    /// Splits node `index`, which covers `cells` starting at `offset` in the
    /// permutation. Returns the depth of the subtree below it.
    fn split<const D: usize>(
        &self,
        index: usize,
        offset: usize,
        level: usize,
        cells: &mut [PerCell<D>],
    ) -> Result<usize, GridError> {
        let size = cells.len();
        if size < self.leaf_size {
            return Ok(0);
        }
        if level >= MAX_DEPTH {
            return Err(GridError::CelltreeTooDeep {
                depth: level + 1,
                limit: MAX_DEPTH,
            });
        }

        let mut min = [f32::MAX; D];
        let mut max = [-f32::MAX; D];
        for c in cells.iter() {
            for d in 0..D {
                min[d] = min[d].min(c.min[d]);
                max[d] = max[d].max(c.max[d]);
            }
        }
        let ext: [f32; D] = std::array::from_fn(|d| max[d] - min[d]);

        let nb = self.buckets;
        let mut buckets = vec![Bucket::default(); D * nb];
        for c in cells.iter() {
            for d in 0..D {
                if ext[d] == 0.0 {
                    continue;
                }
                let cen = 0.5 * c.center2(d);
                // ceil(..) - 1 keeps a center sitting on the lower bound in bucket 0
                let ind = ((nb as f32 * (cen - min[d]) / ext[d]).ceil() as isize - 1)
                    .clamp(0, nb as isize - 1) as usize;
                buckets[d * nb + ind].add(c.min[d], c.max[d]);
            }
        }

        let mut best: Option<Split> = None;
        let mut cost = f32::MAX;
        for d in 0..D {
            if ext[d] == 0.0 {
                continue;
            }
            let b = &buckets[d * nb..(d + 1) * nb];
            let mut sum = 0;
            for n in 0..nb - 1 {
                let lmax = b[..=n].iter().fold(-f32::MAX, |m, x| m.max(x.max));
                let rmin = b[n + 1..].iter().fold(f32::MAX, |m, x| m.min(x.min));
                sum += b[n].cnt;
                let lvol = (lmax - min[d]) / ext[d];
                let rvol = (max[d] - rmin) / ext[d];
                let c = lvol * sum as f32 + rvol * (size - sum) as f32;
                if sum > 0 && sum < size && c < cost {
                    cost = c;
                    best = Some(Split {
                        dim: d,
                        plane: min[d] + (n + 1) as f32 * ext[d] / nb as f32,
                    });
                }
            }
        }

        let mut mid = 0;
        let mut dim = 0;
        if let Some(s) = best {
            dim = s.dim;
            let twice = 2.0 * s.plane;
            mid = itertools::partition(cells.iter_mut(), |c| c.center2(dim) < twice);
        }
        if mid == 0 || mid == size {
            dim = (0..D)
                .max_by(|&a, &b| ext[a].total_cmp(&ext[b]))
                .unwrap_or(0);
            mid = size / 2;
            cells.select_nth_unstable_by(mid, |a, b| a.center2(dim).total_cmp(&b.center2(dim)));
            log::trace!("celltree: no bucket separates {size} cells, median split on axis {dim}");
        }

        let lmax = cells[..mid].iter().fold(-f32::MAX, |m, c| m.max(c.max[dim]));
        let rmin = cells[mid..].iter().fold(f32::MAX, |m, c| m.min(c.min[dim]));

        let left = {
            let mut nodes = self.nodes.lock();
            let left = nodes.len();
            nodes[index].make_inner(left as u32, dim as u32, lmax, rmin);
            nodes.push(Node::leaf(offset as u32, mid as u32));
            nodes.push(Node::leaf((offset + mid) as u32, (size - mid) as u32));
            left
        };

        let (lc, rc) = cells.split_at_mut(mid);
        let (dl, dr) = self.recurse(left, offset, level, lc, rc);
        Ok(1 + dl?.max(dr?))
    }

    /// Builds both children of a node; `left` is the left child's slot.
    #[cfg(feature = "rayon")]
    fn recurse<const D: usize>(
        &self,
        left: usize,
        offset: usize,
        level: usize,
        lc: &mut [PerCell<D>],
        rc: &mut [PerCell<D>],
    ) -> (Result<usize, GridError>, Result<usize, GridError>) {
        let mid = lc.len();
        if mid + rc.len() >= self.parallel_threshold {
            rayon::join(
                || self.split(left, offset, level + 1, lc),
                || self.split(left + 1, offset + mid, level + 1, rc),
            )
        } else {
            (
                self.split(left, offset, level + 1, lc),
                self.split(left + 1, offset + mid, level + 1, rc),
            )
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn recurse<const D: usize>(
        &self,
        left: usize,
        offset: usize,
        level: usize,
        lc: &mut [PerCell<D>],
        rc: &mut [PerCell<D>],
    ) -> (Result<usize, GridError>, Result<usize, GridError>) {
        let mid = lc.len();
        (
            self.split(left, offset, level + 1, lc),
            self.split(left + 1, offset + mid, level + 1, rc),
        )
    }
}

pub(crate) fn build<const D: usize>(
    complex: &CellComplex,
    points: &dyn PointSet<D>,
    config: &CelltreeConfig,
) -> Result<Celltree, GridError> {
    config.validate()?;
    if D == 0 || D > 3 {
        return Err(GridError::InvalidCelltreeConfig(format!(
            "celltrees support 1 to 3 dimensions, got {}",
            D
        )));
    }
    let n = complex.num_cells();
    if n > MAX_CELLS {
        return Err(GridError::InvalidCelltreeConfig(format!(
            "{n} cells exceed the celltree capacity of {MAX_CELLS}"
        )));
    }

    #[cfg(feature = "rayon")]
    let mut cells: Vec<PerCell<D>> = (0..n)
        .into_par_iter()
        .map(|i| cell_bounds(complex, points, i))
        .collect();
    #[cfg(not(feature = "rayon"))]
    let mut cells: Vec<PerCell<D>> = (0..n).map(|i| cell_bounds(complex, points, i)).collect();

    let nodes = Mutex::new(vec![Node::leaf(0, n as u32)]);
    let splitter = Splitter {
        nodes: &nodes,
        buckets: config.buckets,
        leaf_size: config.leaf_size,
        #[cfg(feature = "rayon")]
        parallel_threshold: config.parallel_threshold,
    };
    let depth = splitter.split(0, 0, 0, &mut cells)?;
    let built = nodes.into_inner();

    // Breadth-first re-layout; children are still linked by their build
    // position until `set_children` rewrites them.
    let mut layout = Vec::with_capacity(built.len());
    layout.push(built[0]);
    let mut i = 0;
    while i < layout.len() {
        if !layout[i].is_leaf() {
            let left = layout[i].left();
            let at = layout.len() as u32;
            layout.push(built[left]);
            layout.push(built[left + 1]);
            layout[i].set_children(at);
        }
        i += 1;
    }

    let tree = Celltree {
        nodes: layout,
        leaves: cells.iter().map(|c| c.ind).collect(),
        depth,
        dimension: D,
    };
    log::debug!(
        "built celltree over {n} cells: {} nodes, depth {depth}",
        tree.nodes.len()
    );
    tree.debug_assert_invariants();
    Ok(tree)
}
