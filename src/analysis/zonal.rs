//! Per-cell zonal aggregation against the density grid
//!
//! Each tessellation cell scans the grid cells its bounding rectangle may
//! touch, includes the ones passing the same coverage test used at
//! rasterization, and summarizes the included density values. The grid is
//! shared read-only and cells are independent, so the pass fans out across
//! a worker pool; collection is the only join point.

use crate::algorithm::rasterize::CoverageMode;
use crate::algorithm::tessellation::TessellationCell;
use crate::analysis::statistics::summarize;
use crate::spatial::grid::{DensityGrid, NODATA};
use geo::{Area, BoundingRect};
use rayon::prelude::*;

/// Attach zonal statistics and population estimates to every cell
///
/// Included are grid cells covered under `mode` whose value differs from the
/// nodata sentinel. The population estimate assumes each grid cell's density
/// is locally uniform: sum of included densities times the cell area in
/// square kilometers. A cell including no grid cell keeps `statistics` as
/// `None` ("no coverage") and a zero population estimate. Cell geometry is
/// never mutated.
pub fn aggregate_cells(cells: &mut [TessellationCell], grid: &DensityGrid, mode: CoverageMode) {
    cells.par_iter_mut().for_each(|cell| {
        let values = covered_values(cell, grid, mode);

        cell.area_km2 = cell.geometry.unsigned_area() / 1e6;
        cell.population_estimate = values.iter().sum::<f64>() * grid.cell_area_km2();
        cell.statistics = summarize(values);
    });
}

/// Density values of the grid cells covered by one tessellation cell
fn covered_values(cell: &TessellationCell, grid: &DensityGrid, mode: CoverageMode) -> Vec<f64> {
    let Some(bbox) = cell.geometry.bounding_rect() else {
        return Vec::new();
    };

    let (rows, cols) = grid.region_spans(&bbox);
    let mut values = Vec::new();

    for row in rows {
        for col in cols.clone() {
            if !mode.covers(grid, row, col, &cell.geometry) {
                continue;
            }
            let Some(value) = grid.value(row, col) else {
                continue;
            };
            if value != NODATA {
                values.push(value);
            }
        }
    }

    values
}
