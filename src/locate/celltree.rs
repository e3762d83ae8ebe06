//! Celltree: a bounding interval hierarchy over cell bounding boxes.
//!
//! The tree is a flat array of [`Node`]s with the two children of an inner
//! node stored next to each other, and a `leaves` permutation of cell
//! indices. Every leaf owns the contiguous range `leaves[start..start+size]`;
//! the leaf ranges partition `0..num_cells` exactly once.
//!
//! Inner nodes split along one axis and store two clip planes: `lmax`, the
//! largest coordinate reached by any cell on the left, and `rmin`, the
//! smallest reached on the right. Planes are `f32`, rounded outward from the
//! `f64` geometry so a point on a cell boundary is never clipped away.
//!
//! See C. Garth and K. I. Joy, "Fast, Memory-Efficient Cell Location in
//! Unstructured Grids for Visualization", IEEE TVCG 16(6), 2010.

use super::builder;
use super::traversal::PointTraversal;
use crate::debug_invariants::DebugInvariants;
use crate::geometry::PointSet;
use crate::grid_error::GridError;
use crate::topology::CellComplex;
use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;

/// Entries of the fixed traversal stack.
pub const TRAVERSAL_STACK_SIZE: usize = 32;

/// Deepest leaf level the traversal stack can serve (the root is level 0).
pub const MAX_DEPTH: usize = TRAVERSAL_STACK_SIZE - 1;

const LEAF: u32 = 3;

/// One tree node, 12 bytes.
///
/// `index` packs `left_child << 2 | split_dim`, with `split_dim == 3`
/// marking a leaf. The two data words are the clip planes of an inner node
/// (as `f32` bits) or `start` and `size` of a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(C)]
pub struct Node {
    index: u32,
    a: u32,
    b: u32,
}

assert_eq_size!(Node, [u32; 3]);

impl Node {
    pub(crate) fn leaf(start: u32, size: u32) -> Self {
        Self {
            index: LEAF,
            a: start,
            b: size,
        }
    }

    pub(crate) fn make_inner(&mut self, left: u32, dim: u32, lmax: f32, rmin: f32) {
        debug_assert!(dim < LEAF);
        self.index = (left << 2) | dim;
        self.a = lmax.to_bits();
        self.b = rmin.to_bits();
    }

    pub(crate) fn set_children(&mut self, left: u32) {
        self.index = (left << 2) | (self.index & 3);
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.index & 3 == LEAF
    }

    /// Position of the left child; the right child follows it.
    #[inline]
    pub fn left(&self) -> usize {
        (self.index >> 2) as usize
    }

    #[inline]
    pub fn right(&self) -> usize {
        self.left() + 1
    }

    /// Split axis of an inner node.
    #[inline]
    pub fn dim(&self) -> usize {
        (self.index & 3) as usize
    }

    #[inline]
    pub fn lmax(&self) -> f32 {
        f32::from_bits(self.a)
    }

    #[inline]
    pub fn rmin(&self) -> f32 {
        f32::from_bits(self.b)
    }

    /// First position of a leaf's range in the permutation.
    #[inline]
    pub fn start(&self) -> usize {
        self.a as usize
    }

    /// Number of cells in a leaf.
    #[inline]
    pub fn size(&self) -> usize {
        self.b as usize
    }
}

/// Build parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CelltreeConfig {
    /// Candidate split planes per axis are `buckets - 1`; at least 2.
    pub buckets: usize,
    /// Nodes with fewer cells become leaves; at least 2.
    pub leaf_size: usize,
    /// Subtrees with at least this many cells are built concurrently.
    pub parallel_threshold: usize,
}

impl Default for CelltreeConfig {
    fn default() -> Self {
        Self {
            buckets: 5,
            leaf_size: 4,
            parallel_threshold: 4096,
        }
    }
}

impl CelltreeConfig {
    pub fn validate(&self) -> Result<(), GridError> {
        if self.buckets < 2 {
            return Err(GridError::InvalidCelltreeConfig(format!(
                "buckets must be at least 2, got {}",
                self.buckets
            )));
        }
        if self.leaf_size < 2 {
            return Err(GridError::InvalidCelltreeConfig(format!(
                "leaf_size must be at least 2, got {}",
                self.leaf_size
            )));
        }
        Ok(())
    }
}

/// Spatial index answering "which cells may contain `p`".
///
/// A deserialized tree is checked with
/// [`validate_invariants`](DebugInvariants::validate_invariants) before it
/// is handed out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCelltree")]
pub struct Celltree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) leaves: Vec<u32>,
    pub(crate) depth: usize,
    pub(crate) dimension: usize,
}

/// Unchecked wire form of a [`Celltree`].
#[derive(Deserialize)]
struct RawCelltree {
    nodes: Vec<Node>,
    leaves: Vec<u32>,
    depth: usize,
    dimension: usize,
}

impl TryFrom<RawCelltree> for Celltree {
    type Error = GridError;

    fn try_from(raw: RawCelltree) -> Result<Self, GridError> {
        let tree = Celltree {
            nodes: raw.nodes,
            leaves: raw.leaves,
            depth: raw.depth,
            dimension: raw.dimension,
        };
        tree.validate_invariants()?;
        Ok(tree)
    }
}

impl Celltree {
    /// Builds the tree over every cell of `complex`, using the geometric
    /// vertices' positions from `points`.
    pub fn build<const D: usize>(
        complex: &CellComplex,
        points: &dyn PointSet<D>,
        config: &CelltreeConfig,
    ) -> Result<Self, GridError> {
        builder::build(complex, points, config)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Cell indices, grouped by leaf.
    pub fn leaves(&self) -> &[u32] {
        &self.leaves
    }

    /// Level of the deepest leaf.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Spatial dimension the tree was built in.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn num_cells(&self) -> usize {
        self.leaves.len()
    }

    /// Cells of a leaf node.
    pub fn leaf_cells(&self, node: &Node) -> &[u32] {
        &self.leaves[node.start()..node.start() + node.size()]
    }

    /// Leaves whose region may contain `p`.
    pub fn point_traversal<const D: usize>(&self, p: &[f64; D]) -> PointTraversal<'_, D> {
        PointTraversal::new(self, p)
    }

    /// Every candidate cell index for `p`, leaf by leaf.
    pub fn candidates<const D: usize>(&self, p: &[f64; D]) -> impl Iterator<Item = usize> + '_ {
        self.point_traversal(p)
            .flat_map(move |n| self.leaf_cells(n).iter().map(|&c| c as usize))
    }
}

impl DebugInvariants for Celltree {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Celltree");
    }

    fn validate_invariants(&self) -> Result<(), GridError> {
        if self.nodes.is_empty() {
            return Err(GridError::CorruptCelltree("no root node".into()));
        }
        if !(1..=3).contains(&self.dimension) {
            return Err(GridError::CorruptCelltree(format!(
                "unsupported dimension {}",
                self.dimension
            )));
        }
        let n = self.leaves.len();
        let mut seen = vec![false; n];
        for &c in &self.leaves {
            match seen.get_mut(c as usize) {
                Some(s) if !*s => *s = true,
                _ => {
                    return Err(GridError::CorruptCelltree(format!(
                        "leaves are not a permutation (cell {c})"
                    )));
                }
            }
        }

        // Walk from the root; leaf ranges must tile 0..n and every node must
        // be reached once.
        let mut ranges = Vec::new();
        let mut reached = 0usize;
        let mut max_level = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((i, level)) = stack.pop() {
            reached += 1;
            max_level = max_level.max(level);
            let node = &self.nodes[i];
            if node.is_leaf() {
                ranges.push((node.start(), node.size()));
                continue;
            }
            if node.dim() >= self.dimension || node.left() <= i || node.right() >= self.nodes.len() {
                return Err(GridError::CorruptCelltree(format!(
                    "inner node {i} has invalid children or axis"
                )));
            }
            stack.push((node.left(), level + 1));
            stack.push((node.right(), level + 1));
        }
        if reached != self.nodes.len() {
            return Err(GridError::CorruptCelltree(format!(
                "{} of {} nodes are unreachable",
                self.nodes.len() - reached,
                self.nodes.len()
            )));
        }
        ranges.sort_unstable();
        let mut next = 0;
        for (start, size) in ranges {
            if start != next {
                return Err(GridError::CorruptCelltree(format!(
                    "leaf ranges leave a gap or overlap at {start}"
                )));
            }
            next += size;
        }
        if next != n {
            return Err(GridError::CorruptCelltree(format!(
                "leaf ranges cover {next} of {n} cells"
            )));
        }
        if max_level > MAX_DEPTH {
            return Err(GridError::CelltreeTooDeep {
                depth: max_level,
                limit: MAX_DEPTH,
            });
        }
        if max_level != self.depth {
            return Err(GridError::CorruptCelltree(format!(
                "recorded depth {} differs from actual depth {max_level}",
                self.depth
            )));
        }
        Ok(())
    }
}
