//! Region acquisition from GeoJSON feature collections
//!
//! One file per subregion. Acquisition tolerates partial failure the way the
//! upstream source does: an unreadable or malformed subregion is skipped
//! with a warning and the run continues on partial coverage, and a feature
//! with degenerate geometry is excluded the same way. Only the complete
//! absence of usable records is fatal, and that surfaces later when the
//! store is constructed.

use crate::io::error::{PipelineError, Result, acquisition_error, geometry_error};
use crate::io::progress::StageProgress;
use crate::math::projection::AlbersEqualArea;
use crate::spatial::records::PolygonRecord;
use geo::{Area, Coord, LineString, MapCoords, MultiPolygon, Polygon, coord};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Properties,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: serde_json::Value,
}

#[derive(Deserialize, Default)]
struct Properties {
    #[serde(default, alias = "GEOID")]
    id: Option<String>,
    #[serde(default, alias = "total_pop", alias = "POP")]
    population: Option<f64>,
    #[serde(default, alias = "ALAND_KM2")]
    land_km2: Option<f64>,
}

/// Load polygon records from one GeoJSON file per subregion
///
/// Feature geometry arrives in geographic lon/lat and is projected to the
/// planar system here, so everything downstream computes in meters. Records
/// keep the order (file order, then feature order) they arrive in. Failed
/// subregions and degenerate features are reported through `progress` and
/// skipped; the returned set may cover only part of the requested regions.
pub fn load_regions(
    paths: &[PathBuf],
    projection: &AlbersEqualArea,
    progress: &StageProgress,
) -> Vec<PolygonRecord> {
    let mut records = Vec::new();

    for path in paths {
        match load_subregion(path, projection) {
            Ok(mut subregion) => {
                for skipped in subregion.skipped.drain(..) {
                    progress.warn(&skipped.to_string());
                }
                records.extend(subregion.records);
            }
            Err(error) => progress.warn(&error.to_string()),
        }
    }

    records
}

struct Subregion {
    records: Vec<PolygonRecord>,
    skipped: Vec<PipelineError>,
}

fn load_subregion(path: &Path, projection: &AlbersEqualArea) -> Result<Subregion> {
    let region = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|e| acquisition_error(&region, &e))?;
    let collection: FeatureCollection =
        serde_json::from_str(&raw).map_err(|e| acquisition_error(&region, &e))?;

    let stem = path
        .file_stem()
        .map_or_else(|| "region".to_string(), |s| s.to_string_lossy().to_string());

    let mut records = Vec::with_capacity(collection.features.len());
    let mut skipped = Vec::new();

    for (index, mut feature) in collection.features.into_iter().enumerate() {
        let id = feature
            .properties
            .id
            .take()
            .unwrap_or_else(|| format!("{stem}:{index}"));

        let Some(geometry) = feature.geometry else {
            skipped.push(geometry_error(&id, &"missing geometry"));
            continue;
        };

        let geographic = match parse_multi_polygon(&geometry) {
            Ok(parsed) => parsed,
            Err(reason) => {
                skipped.push(geometry_error(&id, &reason));
                continue;
            }
        };

        let planar = geographic.map_coords(|c| projection.forward(c));
        let area_km2 = planar.unsigned_area() / 1e6;
        if area_km2 <= 0.0 {
            skipped.push(geometry_error(&id, &"degenerate geometry with zero area"));
            continue;
        }

        // Population defaults to zero for unreported units; land area falls
        // back to the planar geometry when the source carries no attribute.
        let population = feature.properties.population.unwrap_or(0.0).max(0.0) as u64;
        let land_km2 = feature.properties.land_km2.unwrap_or(area_km2).max(0.0);

        records.push(PolygonRecord::new(id, planar, land_km2, population));
    }

    Ok(Subregion { records, skipped })
}

/// Parse GeoJSON Polygon or MultiPolygon coordinates into a multipolygon
fn parse_multi_polygon(geometry: &Geometry) -> std::result::Result<MultiPolygon<f64>, String> {
    match geometry.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<[f64; 2]>> =
                serde_json::from_value(geometry.coordinates.clone()).map_err(|e| e.to_string())?;
            Ok(MultiPolygon::from(rings_to_polygon(&rings)?))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<[f64; 2]>>> =
                serde_json::from_value(geometry.coordinates.clone()).map_err(|e| e.to_string())?;
            let parsed: std::result::Result<Vec<Polygon<f64>>, String> = polygons
                .iter()
                .map(|rings| rings_to_polygon(rings))
                .collect();
            Ok(MultiPolygon::new(parsed?))
        }
        other => Err(format!("unsupported geometry type '{other}'")),
    }
}

fn rings_to_polygon(rings: &[Vec<[f64; 2]>]) -> std::result::Result<Polygon<f64>, String> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Err("polygon with no rings".to_string());
    };
    if exterior.len() < 4 {
        return Err(format!(
            "exterior ring has only {} positions",
            exterior.len()
        ));
    }

    Ok(Polygon::new(
        ring_to_line_string(exterior),
        interiors
            .iter()
            .map(|ring| ring_to_line_string(ring))
            .collect(),
    ))
}

fn ring_to_line_string(ring: &[[f64; 2]]) -> LineString<f64> {
    LineString::from(
        ring.iter()
            .map(|&[x, y]| coord! { x: x, y: y })
            .collect::<Vec<Coord<f64>>>(),
    )
}
