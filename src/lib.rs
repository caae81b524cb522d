//! Population density gridding and population-balanced Voronoi tessellation
//!
//! The crate turns an attributed administrative polygon dataset into a
//! fixed-resolution population-density raster and a density-weighted Voronoi
//! tessellation whose cells carry raster-derived statistics. The stages form
//! a strict sequential chain: load records, burn densities onto the grid,
//! select population-weighted seeds, build the boundary-clipped tessellation,
//! and aggregate per-cell zonal statistics.

#![forbid(unsafe_code)]

/// Core pipeline stages: rasterization, seed sampling, tessellation, orchestration
pub mod algorithm;
/// Zonal aggregation and summary statistics over the density grid
pub mod analysis;
/// Input/output operations, CLI surface, and error handling
pub mod io;
/// Projection and clipping primitives shared by the pipeline stages
pub mod math;
/// Downstream grid consumers: point sampling and mosaicking
pub mod services;
/// Polygon records, the per-run store, and the density grid
pub mod spatial;

pub use io::error::{PipelineError, Result};
