//! Zonal aggregation over the density grid
//!
//! This module contains the statistics attached to tessellation cells:
//! - Summary statistics over a sample of density values
//! - The parallel per-cell zonal pass joining cells with the grid

/// Summary statistics over included density values
pub mod statistics;
/// Per-cell zonal aggregation against the density grid
pub mod zonal;

pub use statistics::ZonalStatistics;
pub use zonal::aggregate_cells;
