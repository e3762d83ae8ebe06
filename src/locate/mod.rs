//! Point location for unstructured geometry.
//!
//! The [`Celltree`] narrows a query point down to a few candidate cells;
//! callers then test each candidate exactly.

mod builder;
pub mod celltree;
pub mod traversal;

pub use celltree::{Celltree, CelltreeConfig, Node, MAX_DEPTH, TRAVERSAL_STACK_SIZE};
pub use traversal::PointTraversal;
