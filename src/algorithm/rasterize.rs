//! Density burn-in onto the fixed-resolution grid

use crate::io::error::Result;
use crate::spatial::grid::DensityGrid;
use crate::spatial::records::PolygonAttributeStore;
use geo::{BoundingRect, Contains, Intersects, MultiPolygon, Point};

/// Cell inclusion policy shared by rasterization and zonal aggregation
///
/// `Broad` counts a cell as covered when any part of its rectangle touches
/// the polygon; `Strict` requires the cell's center point. Broad coverage
/// never drops thin polygons between cell centers at the cost of painting
/// past the true boundary by up to one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverageMode {
    /// Cover a cell when its rectangle intersects the polygon
    #[default]
    Broad,
    /// Cover a cell only when its center point lies inside the polygon
    Strict,
}

impl CoverageMode {
    /// Test whether the grid cell at (row, col) counts as covered by `geometry`
    pub fn covers(
        self,
        grid: &DensityGrid,
        row: usize,
        col: usize,
        geometry: &MultiPolygon<f64>,
    ) -> bool {
        match self {
            Self::Broad => grid.cell_rect(row, col).to_polygon().intersects(geometry),
            Self::Strict => geometry.contains(&Point::from(grid.cell_center(row, col))),
        }
    }
}

/// Burn per-record density values into a grid covering the store bounds
///
/// Records paint in input order in a single pass, so a later record
/// overwrites an earlier one at any contested cell. Partitioned inputs do
/// not overlap in practice, but the contract must hold for malformed ones,
/// and the fixed order makes the output bit-identical across runs. Cells no
/// record covers keep the nodata fill.
///
/// # Errors
///
/// Returns `InvalidInput` when the cell size is not positive or the grid
/// would exceed the dimension cap.
pub fn rasterize_density(
    store: &PolygonAttributeStore,
    cell_size: f64,
    mode: CoverageMode,
) -> Result<DensityGrid> {
    let mut grid = DensityGrid::from_bounds(store.bounds(), cell_size)?;

    for record in store.records() {
        let Some(bbox) = record.geometry.bounding_rect() else {
            continue;
        };

        let (rows, cols) = grid.region_spans(&bbox);
        for row in rows {
            for col in cols.clone() {
                if mode.covers(&grid, row, col, &record.geometry) {
                    grid.set(row, col, record.density);
                }
            }
        }
    }

    Ok(grid)
}
