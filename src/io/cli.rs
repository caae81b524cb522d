//! Command-line interface for the density gridding pipeline

use crate::algorithm::executor::{Pipeline, PipelineConfig, PipelineStage};
use crate::algorithm::rasterize::CoverageMode;
use crate::algorithm::sampling::SamplerConfig;
use crate::io::configuration::{
    DEFAULT_CELL_SIZE_M, DEFAULT_RANDOM_SEED, DEFAULT_SEED_FLOOR, DEFAULT_TARGET_POP_PER_SEED,
    DEFAULT_VINTAGE, GRID_ARTIFACT_STEM, TESSELLATION_ARTIFACT,
};
use crate::io::error::{Result, output_error};
use crate::io::features::write_tessellation;
use crate::io::progress::StageProgress;
use crate::io::raster::{GridCrs, write_grid_artifact, write_quicklook};
use crate::io::source::load_regions;
use crate::math::projection::AlbersEqualArea;
use crate::spatial::records::PolygonAttributeStore;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "popgrid")]
#[command(
    author,
    version,
    about = "Build a population density grid and a population-balanced tessellation"
)]
/// Command-line arguments for the pipeline
pub struct Cli {
    /// GeoJSON region files carrying population-attributed polygons
    #[arg(value_name = "REGIONS", required = true)]
    pub regions: Vec<PathBuf>,

    /// Dataset vintage year used in artifact names
    #[arg(long, default_value_t = DEFAULT_VINTAGE)]
    pub vintage: u16,

    /// Raster cell size in meters
    #[arg(short, long, default_value_t = DEFAULT_CELL_SIZE_M)]
    pub cell_size: f64,

    /// Write only the density grid, skipping the tessellation
    #[arg(long)]
    pub skip_tessellation: bool,

    /// Target population represented by one tessellation seed
    #[arg(long, default_value_t = DEFAULT_TARGET_POP_PER_SEED)]
    pub target_pop_per_seed: u64,

    /// Minimum number of tessellation seeds
    #[arg(long, default_value_t = DEFAULT_SEED_FLOOR)]
    pub seed_floor: usize,

    /// Random seed for reproducible selection
    #[arg(short, long, default_value_t = DEFAULT_RANDOM_SEED)]
    pub seed: u64,

    /// Cover cells only when their center lies inside a polygon
    #[arg(long)]
    pub strict_coverage: bool,

    /// Output directory for artifacts
    #[arg(short, long, default_value = "outputs")]
    pub out_dir: PathBuf,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Coverage mode selected by the toggle
    pub const fn coverage(&self) -> CoverageMode {
        if self.strict_coverage {
            CoverageMode::Strict
        } else {
            CoverageMode::Broad
        }
    }

    /// Pipeline configuration assembled from the flags
    pub const fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            cell_size_m: self.cell_size,
            coverage: self.coverage(),
            build_tessellation: !self.skip_tessellation,
            sampler: SamplerConfig {
                target_population_per_seed: self.target_pop_per_seed,
                seed_floor: self.seed_floor,
                random_seed: self.seed,
            },
        }
    }
}

/// Orchestrates one full run: load, execute, write artifacts
pub struct PipelineRunner {
    cli: Cli,
    progress: StageProgress,
}

impl PipelineRunner {
    /// Create a runner from parsed arguments
    pub fn new(cli: Cli) -> Self {
        let progress = StageProgress::new(cli.quiet);
        Self { cli, progress }
    }

    /// Run the pipeline and persist the artifacts
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: invalid parameters, insufficient
    /// records, or an artifact that cannot be written. Per-subregion
    /// acquisition failures are recovered with a warning.
    pub fn process(&mut self) -> Result<()> {
        // Validate before any stage executes.
        let pipeline = Pipeline::new(self.cli.pipeline_config())?;
        let projection = AlbersEqualArea::conus();

        self.progress.stage("reading regions");
        let records = load_regions(&self.cli.regions, &projection, &self.progress);
        let store = PolygonAttributeStore::new(records)?;

        let progress = &self.progress;
        let output = pipeline.execute_with(&store, |stage| {
            progress.stage(match stage {
                PipelineStage::Rasterize => "rasterizing density",
                PipelineStage::SelectSeeds => "selecting seeds",
                PipelineStage::Tessellate => "building tessellation",
                PipelineStage::Aggregate => "aggregating statistics",
            });
        })?;

        self.progress.stage("writing artifacts");
        std::fs::create_dir_all(&self.cli.out_dir)
            .map_err(|e| output_error(self.cli.out_dir.clone(), e))?;

        let grid_path = self.cli.out_dir.join(self.grid_artifact_name());
        write_grid_artifact(&output.grid, GridCrs::PlanarAlbersConus, &grid_path)?;
        write_quicklook(&output.grid, &grid_path.with_extension("png"))?;

        if let Some(tessellation) = output.tessellation {
            let cell_path = self.cli.out_dir.join(TESSELLATION_ARTIFACT);
            write_tessellation(&tessellation.cells, &projection, &cell_path)?;

            if !tessellation.dropped_seeds.is_empty() {
                self.progress.warn(&format!(
                    "{} seed(s) produced no cell inside the boundary",
                    tessellation.dropped_seeds.len()
                ));
            }
        }

        self.progress.finish();
        Ok(())
    }

    fn grid_artifact_name(&self) -> String {
        let cell_km = (self.cli.cell_size / 1000.0).round().max(1.0) as u64;
        format!(
            "{GRID_ARTIFACT_STEM}_{cell_km}km_{}.asc",
            self.cli.vintage
        )
    }
}
