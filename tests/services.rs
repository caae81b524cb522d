//! Validates the point-sampling catalog and the mosaic utility on written artifacts

use geo::{MultiPolygon, polygon};
use popgrid::algorithm::rasterize::{CoverageMode, rasterize_density};
use popgrid::io::raster::{GridCrs, read_grid_artifact, write_grid_artifact};
use popgrid::math::projection::AlbersEqualArea;
use popgrid::services::mosaic::build_mosaic;
use popgrid::services::sampler::GridCatalog;
use popgrid::spatial::grid::DensityGrid;
use popgrid::spatial::records::{PolygonAttributeStore, PolygonRecord};
use std::path::Path;

fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
    MultiPolygon::from(polygon![
        (x: x0, y: y0),
        (x: x0 + side, y: y0),
        (x: x0 + side, y: y0 + side),
        (x: x0, y: y0 + side),
    ])
}

/// Rasterize one uniformly dense square into a grid
///
/// The grid inherits whatever units the geometry uses, so the same helper
/// builds planar-meter and geographic-degree fixtures.
fn uniform_grid(x0: f64, y0: f64, side: f64, cell: f64, density: f64) -> DensityGrid {
    // land_km2 = 1 makes density equal population.
    let records = vec![PolygonRecord::new(
        "r".into(),
        square(x0, y0, side),
        1.0,
        density as u64,
    )];
    let store = match PolygonAttributeStore::new(records) {
        Ok(store) => store,
        Err(e) => unreachable!("valid records must build a store: {e}"),
    };
    match rasterize_density(&store, cell, CoverageMode::Strict) {
        Ok(grid) => grid,
        Err(e) => unreachable!("valid store must rasterize: {e}"),
    }
}

fn write_artifact(grid: &DensityGrid, crs: GridCrs, path: &Path) {
    if let Err(e) = write_grid_artifact(grid, crs, path) {
        unreachable!("artifact must write: {e}");
    }
}

#[test]
fn test_catalog_samples_a_geographic_grid() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => unreachable!("tempdir: {e}"),
    };
    let path = dir.path().join("geo.asc");

    // Raster bounds [0, 0, 10, 10] in its own (geographic) system.
    let grid = uniform_grid(0.0, 0.0, 10.0, 1.0, 7.0);
    write_artifact(&grid, GridCrs::Geographic, &path);

    let catalog = GridCatalog::new(vec![path]);
    assert_eq!(catalog.len(), 1);

    // The query point lands at (5, 5), the center of the coverage.
    let Ok(covered) = catalog.sample(5.0, 5.0) else {
        unreachable!("sampling must succeed");
    };
    assert_eq!(covered, Some(7.0));

    // A point outside every indexed grid reports no coverage.
    let Ok(missed) = catalog.sample(50.0, 50.0) else {
        unreachable!("sampling must succeed");
    };
    assert_eq!(missed, None);
}

#[test]
fn test_catalog_transforms_queries_into_planar_grids() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => unreachable!("tempdir: {e}"),
    };
    let path = dir.path().join("planar.asc");

    // A 20x20 km planar square centered on the projection origin, which is
    // where lon -96, lat 23 lands.
    let projection = AlbersEqualArea::conus();
    let grid = uniform_grid(-10_000.0, -10_000.0, 20_000.0, 1000.0, 42.0);
    write_artifact(&grid, GridCrs::PlanarAlbersConus, &path);

    let origin = projection.forward(geo::coord! { x: -96.0, y: 23.0 });
    assert!(origin.x.abs() < 1.0 && origin.y.abs() < 1.0);

    let catalog = GridCatalog::new(vec![path]);
    let Ok(covered) = catalog.sample(-96.0, 23.0) else {
        unreachable!("sampling must succeed");
    };
    assert_eq!(covered, Some(42.0));

    // Well outside the 20 km square.
    let Ok(missed) = catalog.sample(-80.0, 40.0) else {
        unreachable!("sampling must succeed");
    };
    assert_eq!(missed, None);
}

#[test]
fn test_empty_catalog_always_misses() {
    let catalog = GridCatalog::new(Vec::new());
    assert!(catalog.is_empty());
    let Ok(result) = catalog.sample(0.0, 0.0) else {
        unreachable!("sampling must succeed");
    };
    assert_eq!(result, None);
}

#[test]
fn test_mosaic_favors_the_first_listed_source() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => unreachable!("tempdir: {e}"),
    };
    let first_path = dir.path().join("first.asc");
    let second_path = dir.path().join("second.asc");
    let merged_path = dir.path().join("merged.asc");

    // Two overlapping geographic squares: [0,10]^2 at density 5 and
    // [5,15]^2 at density 9.
    write_artifact(
        &uniform_grid(0.0, 0.0, 10.0, 1.0, 5.0),
        GridCrs::Geographic,
        &first_path,
    );
    write_artifact(
        &uniform_grid(5.0, 5.0, 10.0, 1.0, 9.0),
        GridCrs::Geographic,
        &second_path,
    );

    let Ok(merged) = build_mosaic(&[first_path, second_path], 1.0, &merged_path) else {
        unreachable!("mosaic must build");
    };

    let value_at = |lon: f64, lat: f64| -> Option<f64> {
        let (row, col) = merged.world_to_cell(geo::coord! { x: lon, y: lat })?;
        merged.value(row, col)
    };

    // Overlap: the first source wins.
    assert_eq!(value_at(7.5, 7.5), Some(5.0));
    // Only the second source covers the far corner.
    assert_eq!(value_at(12.5, 12.5), Some(9.0));
    // Covered by neither source: nodata.
    assert_eq!(value_at(12.5, 2.5), Some(0.0));

    // The merged artifact itself reads back as geographic.
    let Ok((restored, crs)) = read_grid_artifact(&merged_path) else {
        unreachable!("merged artifact must read back");
    };
    assert_eq!(crs, GridCrs::Geographic);
    assert_eq!(restored.values(), merged.values());
}

#[test]
fn test_mosaic_rejects_an_empty_input_list() {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => unreachable!("tempdir: {e}"),
    };
    assert!(build_mosaic(&[], 1.0, &dir.path().join("out.asc")).is_err());
}
