//! Validates the full stage chain against the synthetic census scenario

use geo::{Area, MultiPolygon, polygon};
use popgrid::PipelineError;
use popgrid::algorithm::executor::{Pipeline, PipelineConfig};
use popgrid::algorithm::rasterize::{CoverageMode, rasterize_density};
use popgrid::algorithm::sampling::SamplerConfig;
use popgrid::spatial::records::{PolygonAttributeStore, PolygonRecord};

fn square(x0: f64, y0: f64, side: f64) -> MultiPolygon<f64> {
    MultiPolygon::from(polygon![
        (x: x0, y: y0),
        (x: x0 + side, y: y0),
        (x: x0 + side, y: y0 + side),
        (x: x0, y: y0 + side),
    ])
}

/// Four unit-square records tiling a 2x2 km area with populations
/// {100, 200, 300, 400}
fn quadrant_store() -> PolygonAttributeStore {
    let records = vec![
        PolygonRecord::new("sw".into(), square(0.0, 0.0, 1000.0), 1.0, 100),
        PolygonRecord::new("se".into(), square(1000.0, 0.0, 1000.0), 1.0, 200),
        PolygonRecord::new("nw".into(), square(0.0, 1000.0, 1000.0), 1.0, 300),
        PolygonRecord::new("ne".into(), square(1000.0, 1000.0, 1000.0), 1.0, 400),
    ];
    match PolygonAttributeStore::new(records) {
        Ok(store) => store,
        Err(e) => unreachable!("valid records must build a store: {e}"),
    }
}

fn strict_config() -> PipelineConfig {
    PipelineConfig {
        cell_size_m: 1000.0,
        coverage: CoverageMode::Strict,
        build_tessellation: true,
        sampler: SamplerConfig {
            target_population_per_seed: 500,
            seed_floor: 1,
            random_seed: 42,
        },
    }
}

#[test]
fn test_end_to_end_census_scenario() {
    let store = quadrant_store();
    let Ok(pipeline) = Pipeline::new(strict_config()) else {
        unreachable!("valid config must build a pipeline");
    };
    let Ok(output) = pipeline.execute(&store) else {
        unreachable!("pipeline must complete");
    };

    // The 2x2 km extent at 1 km cells gives a 2x2 grid whose cells hold the
    // four densities exactly.
    assert_eq!((output.grid.height(), output.grid.width()), (2, 2));
    assert_eq!(output.grid.value(1, 0), Some(100.0));
    assert_eq!(output.grid.value(1, 1), Some(200.0));
    assert_eq!(output.grid.value(0, 0), Some(300.0));
    assert_eq!(output.grid.value(0, 1), Some(400.0));

    // Total population 1000 at 500 per seed with floor 1 selects k = 2.
    let Some(tessellation) = output.tessellation else {
        unreachable!("tessellation was requested");
    };
    assert_eq!(
        tessellation.cells.len() + tessellation.dropped_seeds.len(),
        2
    );
    assert_eq!(tessellation.cells.len(), 2);

    // The two cells partition the 2x2 km square.
    let total_area: f64 = tessellation
        .cells
        .iter()
        .map(|c| c.geometry.unsigned_area())
        .sum();
    assert!((total_area - 4_000_000.0).abs() < 1.0);

    for cell in &tessellation.cells {
        assert!(cell.area_km2 > 0.0);
        if let Some(stats) = cell.statistics {
            assert!(stats.min <= stats.median && stats.median <= stats.max);
            assert!(stats.min <= stats.mean && stats.mean <= stats.max);
            assert!(stats.covered_cells > 0);
        }
    }
}

#[test]
fn test_grid_dimensions_follow_ceiling_division() {
    // Extents chosen to exercise exact, fractional, and sub-cell divisions.
    let cases = [
        (2000.0, 2000.0, 1000.0, 2usize, 2usize),
        (2500.0, 1999.0, 1000.0, 3, 2),
        (100.0, 100.0, 1000.0, 1, 1),
        (9001.0, 4500.0, 1500.0, 7, 3),
    ];

    for (width_m, height_m, cell, expect_w, expect_h) in cases {
        let records = vec![PolygonRecord::new(
            "r".into(),
            MultiPolygon::from(polygon![
                (x: 0.0, y: 0.0),
                (x: width_m, y: 0.0),
                (x: width_m, y: height_m),
                (x: 0.0, y: height_m),
            ]),
            1.0,
            10,
        )];
        let Ok(store) = PolygonAttributeStore::new(records) else {
            unreachable!("valid records must build a store");
        };
        let Ok(grid) = rasterize_density(&store, cell, CoverageMode::Broad) else {
            unreachable!("valid store must rasterize");
        };
        assert_eq!(grid.width(), expect_w, "width for {width_m}m at {cell}m");
        assert_eq!(grid.height(), expect_h, "height for {height_m}m at {cell}m");
    }
}

#[test]
fn test_raster_mass_conservation_on_aligned_rectangle() {
    // A single rectangle aligned to the grid reproduces its population
    // exactly: every cell holds density population / area, and
    // sum(value * cell_km2) folds back to the population.
    let records = vec![PolygonRecord::new(
        "r".into(),
        square(0.0, 0.0, 2000.0),
        4.0,
        1000,
    )];
    let Ok(store) = PolygonAttributeStore::new(records) else {
        unreachable!("valid records must build a store");
    };
    let Ok(grid) = rasterize_density(&store, 1000.0, CoverageMode::Strict) else {
        unreachable!("valid store must rasterize");
    };

    let mass: f64 = grid.values().iter().sum::<f64>() * grid.cell_area_km2();
    assert!((mass - 1000.0).abs() < 1e-9);
}

#[test]
fn test_insufficient_records_aborts_the_run() {
    let store = quadrant_store();
    let config = PipelineConfig {
        sampler: SamplerConfig {
            target_population_per_seed: 500,
            seed_floor: 10,
            random_seed: 42,
        },
        ..strict_config()
    };
    let Ok(pipeline) = Pipeline::new(config) else {
        unreachable!("valid config must build a pipeline");
    };

    assert!(matches!(
        pipeline.execute(&store),
        Err(PipelineError::InsufficientRecords {
            requested: 10,
            available: 4,
        })
    ));
}

#[test]
fn test_grid_only_run_produces_no_tessellation() {
    let store = quadrant_store();
    let config = PipelineConfig {
        build_tessellation: false,
        ..strict_config()
    };
    let Ok(pipeline) = Pipeline::new(config) else {
        unreachable!("valid config must build a pipeline");
    };
    let Ok(output) = pipeline.execute(&store) else {
        unreachable!("pipeline must complete");
    };

    assert!(output.tessellation.is_none());
    assert_eq!((output.grid.height(), output.grid.width()), (2, 2));
}
