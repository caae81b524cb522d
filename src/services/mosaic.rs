//! Grid mosaicking with nearest-neighbor reprojection
//!
//! Reads multiple grid artifacts, reprojects each to geographic lon/lat,
//! and merges them into one raster covering the union of their footprints.
//! Each target cell takes the value of the first listed source that covers
//! it with data, so overlaps favor earlier inputs and nodata stays
//! transparent.

use crate::io::error::{Result, invalid_parameter};
use crate::io::raster::{GridCrs, read_grid_artifact, write_grid_artifact};
use crate::math::projection::AlbersEqualArea;
use crate::spatial::grid::{DensityGrid, NODATA};
use geo::{Coord, Rect, coord};
use std::path::{Path, PathBuf};

/// Perimeter samples taken per grid edge when projecting a footprint
const FOOTPRINT_EDGE_SAMPLES: usize = 64;

/// Merge grid artifacts into one geographic raster and write it
///
/// `cell_size_deg` is the target resolution in decimal degrees. Sources are
/// sampled nearest-neighbor: every target cell center is transformed into
/// each source's reference system and takes the covering cell's value from
/// the first source that has data there.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty input list or non-positive cell
/// size, `Serialization` for an unreadable source artifact, and
/// `OutputWrite` when the merged artifact cannot be persisted.
pub fn build_mosaic(
    inputs: &[PathBuf],
    cell_size_deg: f64,
    output: &Path,
) -> Result<DensityGrid> {
    if inputs.is_empty() {
        return Err(invalid_parameter(
            "inputs",
            &0,
            &"mosaic requires at least one grid artifact",
        ));
    }

    let projection = AlbersEqualArea::conus();
    let sources: Vec<(DensityGrid, GridCrs)> = inputs
        .iter()
        .map(|path| read_grid_artifact(path))
        .collect::<Result<_>>()?;

    let mut footprint: Option<Rect<f64>> = None;
    for (grid, crs) in &sources {
        let bounds = geographic_footprint(grid, *crs, &projection);
        footprint = Some(match footprint {
            None => bounds,
            Some(current) => merge_rects(current, bounds),
        });
    }
    let Some(footprint) = footprint else {
        return Err(invalid_parameter(
            "inputs",
            &inputs.len(),
            &"no source carries a usable extent",
        ));
    };

    let mut merged = DensityGrid::from_bounds(footprint, cell_size_deg)?;

    for row in 0..merged.height() {
        for col in 0..merged.width() {
            let center = merged.cell_center(row, col);
            if let Some(value) = sample_sources(&sources, &projection, center) {
                merged.set(row, col, value);
            }
        }
    }

    write_grid_artifact(&merged, GridCrs::Geographic, output)?;
    Ok(merged)
}

/// Value of the first listed source covering a geographic point with data
fn sample_sources(
    sources: &[(DensityGrid, GridCrs)],
    projection: &AlbersEqualArea,
    geographic: Coord<f64>,
) -> Option<f64> {
    for (grid, crs) in sources {
        let point = match crs {
            GridCrs::PlanarAlbersConus => projection.forward(geographic),
            GridCrs::Geographic => geographic,
        };

        let Some((row, col)) = grid.world_to_cell(point) else {
            continue;
        };
        match grid.value(row, col) {
            Some(value) if value != NODATA => return Some(value),
            _ => {}
        }
    }

    None
}

/// Geographic bounding box of a grid, sampling the perimeter for planar grids
///
/// A planar rectangle does not map to a geographic rectangle, so the edges
/// are walked point by point and the lon/lat extremes taken.
fn geographic_footprint(
    grid: &DensityGrid,
    crs: GridCrs,
    projection: &AlbersEqualArea,
) -> Rect<f64> {
    let bounds = grid.bounds();
    if crs == GridCrs::Geographic {
        return bounds;
    }

    let mut min_lon = f64::INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut max_lat = f64::NEG_INFINITY;

    for step in 0..=FOOTPRINT_EDGE_SAMPLES {
        let t = step as f64 / FOOTPRINT_EDGE_SAMPLES as f64;
        let x = t.mul_add(bounds.width(), bounds.min().x);
        let y = t.mul_add(bounds.height(), bounds.min().y);

        let perimeter = [
            coord! { x: x, y: bounds.min().y },
            coord! { x: x, y: bounds.max().y },
            coord! { x: bounds.min().x, y: y },
            coord! { x: bounds.max().x, y: y },
        ];
        for point in perimeter {
            let geographic = projection.inverse(point);
            min_lon = min_lon.min(geographic.x);
            min_lat = min_lat.min(geographic.y);
            max_lon = max_lon.max(geographic.x);
            max_lat = max_lat.max(geographic.y);
        }
    }

    Rect::new(
        coord! { x: min_lon, y: min_lat },
        coord! { x: max_lon, y: max_lat },
    )
}

fn merge_rects(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        coord! {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        coord! {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}
