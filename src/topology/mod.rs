//! Top-level module for cell topology.
//!
//! This module provides:
//! - the catalog of cell shapes ([`CellType`]) with their faces and orderings,
//! - [`CellComplex`], the structured or unstructured collection of cells,
//! - [`Cell`], a borrowed view of one cell, and [`CellVisitor`] for per-type dispatch.
//!
//! Cells never own data. They refer to a strategy in their complex's arena
//! and a base offset, so creating and copying them is free.

pub mod cell;
pub mod cell_type;
pub mod complex;
pub mod strategy;

pub use cell::{Cell, CellVisitor};
pub use cell_type::{CellType, Face, ReferenceDomain, MAX_VALUES_PER_CELL};
pub use complex::{CellComplex, TopologyType};
pub use strategy::StrategyId;
