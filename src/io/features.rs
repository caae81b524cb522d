//! Tessellation artifact writer
//!
//! Cells are serialized as a GeoJSON FeatureCollection in geographic
//! lon/lat, the interchange system. Geometry and seed coordinates are
//! unprojected here at the very edge of the pipeline; every upstream stage
//! works in planar meters.

use crate::algorithm::tessellation::TessellationCell;
use crate::io::error::{Result, output_error, serialization_error};
use crate::math::projection::AlbersEqualArea;
use geo::{MapCoords, MultiPolygon};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct GeoJsonFeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<GeoJsonFeature>,
}

#[derive(Serialize)]
struct GeoJsonFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: GeoJsonGeometry,
    properties: CellProperties,
}

#[derive(Serialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: Vec<Vec<Vec<[f64; 2]>>>,
}

/// Per-cell properties carried by the artifact
///
/// Statistics fields serialize as `null` for a no-coverage cell, never as
/// zero.
#[derive(Serialize)]
struct CellProperties {
    seed_lon: f64,
    seed_lat: f64,
    mean: Option<f64>,
    median: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    covered_cells: Option<usize>,
    area_km2: f64,
    pop_est: f64,
}

/// Write tessellation cells as a geographic GeoJSON FeatureCollection
///
/// # Errors
///
/// Returns `Serialization` when encoding fails and `OutputWrite` when the
/// file cannot be persisted.
pub fn write_tessellation(
    cells: &[TessellationCell],
    projection: &AlbersEqualArea,
    path: &Path,
) -> Result<()> {
    let features = cells
        .iter()
        .map(|cell| {
            let geographic = cell.geometry.map_coords(|c| projection.inverse(c));
            let seed = projection.inverse(cell.seed);

            GeoJsonFeature {
                kind: "Feature",
                geometry: GeoJsonGeometry {
                    kind: "MultiPolygon",
                    coordinates: multi_polygon_positions(&geographic),
                },
                properties: CellProperties {
                    seed_lon: seed.x,
                    seed_lat: seed.y,
                    mean: cell.statistics.map(|s| s.mean),
                    median: cell.statistics.map(|s| s.median),
                    min: cell.statistics.map(|s| s.min),
                    max: cell.statistics.map(|s| s.max),
                    covered_cells: cell.statistics.map(|s| s.covered_cells),
                    area_km2: cell.area_km2,
                    pop_est: cell.population_estimate,
                },
            }
        })
        .collect();

    let collection = GeoJsonFeatureCollection {
        kind: "FeatureCollection",
        features,
    };

    let encoded =
        serde_json::to_string(&collection).map_err(|e| serialization_error(path, &e))?;
    std::fs::write(path, encoded).map_err(|e| output_error(path, e))
}

/// Nested GeoJSON position arrays for a multipolygon
fn multi_polygon_positions(geometry: &MultiPolygon<f64>) -> Vec<Vec<Vec<[f64; 2]>>> {
    geometry
        .iter()
        .map(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors().iter())
                .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
                .collect()
        })
        .collect()
}
