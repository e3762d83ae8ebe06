//! Geometry for cell location.
//!
//! This module provides point sets, the shape functions of every cell type,
//! and the point-in-cell tests built on them.

pub(crate) mod linalg;
pub mod contains;
pub mod points;
pub mod shape;

pub use contains::{Embedding, LOCAL_TOLERANCE};
pub use linalg::lift;
pub use points::{
    Aabb, CurvilinearPoints, ExplicitPoints, PointSet, RectilinearPoints, UniformPoints,
};
