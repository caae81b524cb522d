//! Core pipeline stages
//!
//! The stages form a strict sequential chain with one fan-out and one
//! fan-in: the store feeds rasterization and seed sampling independently,
//! sampling feeds tessellation, and the zonal pass joins the grid with the
//! tessellation cells. The executor owns the ordering.

/// Pipeline orchestration and run configuration
pub mod executor;
/// Density burn-in onto the fixed-resolution grid
pub mod rasterize;
/// Population-weighted seed selection
pub mod sampling;
/// Boundary-clipped Voronoi tessellation
pub mod tessellation;

pub use executor::{Pipeline, PipelineConfig, PipelineOutput};
pub use rasterize::CoverageMode;
pub use tessellation::{Tessellation, TessellationCell};
