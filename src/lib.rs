#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-locate
//!
//! mesh-locate finds the cell of a grid that contains a query point and turns
//! that location into interpolation weights. It is meant for probing,
//! resampling and particle tracing in scientific visualization and PDE
//! post-processing.
//!
//! ## Features
//! - A catalog of 18 linear and quadratic cell types with face tables,
//!   shape functions and exact point-in-cell tests
//! - Structured and unstructured [`CellComplex`](topology::CellComplex)es
//!   handing out zero-cost [`Cell`](topology::Cell) views
//! - A flat, bounding-interval [`Celltree`](locate::Celltree) built in
//!   parallel with Rayon, for sub-linear point location
//! - Uniform, rectilinear, curvilinear and explicit point sets
//! - A stateful [`Interpolator`](grid::Interpolator) with cell caching for
//!   point- and cell-centered data
//!
//! ## Dimensions
//!
//! Spatial dimension is a const parameter `D` (1, 2 or 3). Cells of lower
//! topological dimension may be embedded in higher-dimensional space, e.g.
//! triangles in 3D.
//!
//! ## Invariant checking
//!
//! Constructors always run the cheap consistency checks. Linear-time checks
//! (vertex ranges, finite coordinates, celltree structure) run in debug
//! builds and whenever the `strict-invariants` feature is enabled; see
//! [`DebugInvariants`].
//!
//! ## Usage
//!
//! ```
//! use mesh_locate::prelude::*;
//!
//! let grid = StructuredGrid::uniform([3, 3, 3], [0.0; 3], [1.0; 3]).unwrap();
//! let mut ip = grid.interpolator(DomainPart::Points);
//! assert!(ip.reset(&[0.5, 0.5, 0.5]));
//! let weights = ip.value().unwrap();
//! assert_eq!(weights.len(), 8);
//! ```

pub mod debug_invariants;
pub mod geometry;
pub mod grid;
pub mod grid_error;
pub mod locate;
pub mod mesh_generation;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use grid_error::GridError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{
        Aabb, CurvilinearPoints, Embedding, ExplicitPoints, PointSet, RectilinearPoints,
        UniformPoints,
    };
    pub use crate::grid::{
        DomainPart, EvaluatorState, Grid, Interpolator, StructuredGrid, UnstructuredGrid, Weights,
    };
    pub use crate::grid_error::GridError;
    pub use crate::locate::{Celltree, CelltreeConfig};
    pub use crate::topology::{Cell, CellComplex, CellType, CellVisitor, TopologyType};
}
