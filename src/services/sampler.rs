//! Geographic point sampling over a catalog of grid artifacts
//!
//! The catalog indexes each artifact's reference system, transform, and
//! values once per process and answers lon/lat queries against the indexed
//! grids in listed order. Index construction is single-flighted: concurrent
//! first callers block on one build instead of duplicating it. The catalog
//! is an owned value created by the process entry point, not module state.

use crate::io::error::Result;
use crate::io::raster::{GridCrs, read_grid_artifact};
use crate::math::projection::AlbersEqualArea;
use crate::spatial::grid::{DensityGrid, NODATA};
use geo::{Coord, coord};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

struct IndexedGrid {
    grid: DensityGrid,
    crs: GridCrs,
}

/// Lazily indexed collection of grid artifacts
pub struct GridCatalog {
    paths: Vec<PathBuf>,
    projection: AlbersEqualArea,
    index: OnceCell<Vec<IndexedGrid>>,
}

impl GridCatalog {
    /// Create a catalog over artifact paths; nothing is read until the
    /// first query
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            projection: AlbersEqualArea::conus(),
            index: OnceCell::new(),
        }
    }

    /// Number of artifacts the catalog indexes
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the catalog lists no artifacts
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Sample the value covering a geographic point
    ///
    /// Transforms the point into each indexed grid's reference system in
    /// listed order, checks bounding-box containment via the inverse
    /// transform, and returns the covering cell's value unless it equals
    /// nodata. `None` means no indexed grid covers the point.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` when the index build hits an unreadable
    /// artifact; the build runs at most once per catalog.
    pub fn sample(&self, longitude: f64, latitude: f64) -> Result<Option<f64>> {
        let index = self.index.get_or_try_init(|| self.build_index())?;
        let geographic = coord! { x: longitude, y: latitude };

        for entry in index {
            let point: Coord<f64> = match entry.crs {
                GridCrs::PlanarAlbersConus => self.projection.forward(geographic),
                GridCrs::Geographic => geographic,
            };

            let Some((row, col)) = entry.grid.world_to_cell(point) else {
                continue;
            };
            if let Some(value) = entry.grid.value(row, col) {
                if value != NODATA {
                    return Ok(Some(value));
                }
            }
        }

        Ok(None)
    }

    fn build_index(&self) -> Result<Vec<IndexedGrid>> {
        self.paths
            .iter()
            .map(|path| {
                let (grid, crs) = read_grid_artifact(path)?;
                Ok(IndexedGrid { grid, crs })
            })
            .collect()
    }
}
