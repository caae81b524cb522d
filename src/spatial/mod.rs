//! Spatial data structures for one pipeline run
//!
//! This module contains the attributed polygon collection and the
//! fixed-resolution grid the rasterizer paints:
//! - Polygon records with population, land area, and derived density
//! - The immutable per-run attribute store
//! - The density grid and its planar affine transform

/// Density grid storage and coordinate transforms
pub mod grid;
/// Attributed polygon records and the per-run store
pub mod records;

pub use grid::DensityGrid;
pub use records::{PolygonAttributeStore, PolygonRecord};
