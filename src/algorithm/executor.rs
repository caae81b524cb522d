//! Pipeline orchestration
//!
//! The executor owns the stage ordering: rasterize, select seeds,
//! tessellate, aggregate. Every stage completes before its consumer starts;
//! the run configuration is validated before any stage executes so a bad
//! parameter can never leave a partially-written result behind.

use crate::algorithm::rasterize::{CoverageMode, rasterize_density};
use crate::algorithm::sampling::{SamplerConfig, select_seeds};
use crate::algorithm::tessellation::{Tessellation, build_tessellation};
use crate::analysis::zonal::aggregate_cells;
use crate::io::configuration::DEFAULT_CELL_SIZE_M;
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::grid::DensityGrid;
use crate::spatial::records::PolygonAttributeStore;

/// Stages reported to the progress callback, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Burning densities onto the grid
    Rasterize,
    /// Selecting population-weighted seeds
    SelectSeeds,
    /// Building the boundary-clipped tessellation
    Tessellate,
    /// Attaching zonal statistics to cells
    Aggregate,
}

/// Run configuration for one pipeline execution
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Raster cell size in meters
    pub cell_size_m: f64,
    /// Cell inclusion policy for rasterization and aggregation
    pub coverage: CoverageMode,
    /// Whether to build the tessellation after the grid
    pub build_tessellation: bool,
    /// Seed selection parameters
    pub sampler: SamplerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cell_size_m: DEFAULT_CELL_SIZE_M,
            coverage: CoverageMode::Broad,
            build_tessellation: true,
            sampler: SamplerConfig::default(),
        }
    }
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The completed density grid
    pub grid: DensityGrid,
    /// The aggregated tessellation, absent when not requested
    pub tessellation: Option<Tessellation>,
}

/// Validated pipeline executor
///
/// Construction rejects invalid parameters; execution then runs the stage
/// chain against a store.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate the configuration and build an executor
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive cell size, target
    /// population, or seed floor.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        if config.cell_size_m <= 0.0 || !config.cell_size_m.is_finite() {
            return Err(invalid_parameter(
                "cell_size",
                &config.cell_size_m,
                &"cell size must be a positive number of meters",
            ));
        }
        if config.build_tessellation {
            if config.sampler.target_population_per_seed == 0 {
                return Err(invalid_parameter(
                    "target_population_per_seed",
                    &0,
                    &"target population per seed must be positive",
                ));
            }
            if config.sampler.seed_floor == 0 {
                return Err(invalid_parameter(
                    "seed_floor",
                    &0,
                    &"seed floor must be positive",
                ));
            }
        }

        Ok(Self { config })
    }

    /// The validated configuration
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute the full stage chain against a store
    ///
    /// # Errors
    ///
    /// Propagates stage failures: grid allocation limits, insufficient
    /// eligible records, or an empty seed set.
    pub fn execute(&self, store: &PolygonAttributeStore) -> Result<PipelineOutput> {
        self.execute_with(store, |_| {})
    }

    /// Execute the stage chain, reporting each stage as it starts
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Pipeline::execute`].
    pub fn execute_with<F>(
        &self,
        store: &PolygonAttributeStore,
        mut on_stage: F,
    ) -> Result<PipelineOutput>
    where
        F: FnMut(PipelineStage),
    {
        on_stage(PipelineStage::Rasterize);
        let grid = rasterize_density(store, self.config.cell_size_m, self.config.coverage)?;

        if !self.config.build_tessellation {
            return Ok(PipelineOutput {
                grid,
                tessellation: None,
            });
        }

        on_stage(PipelineStage::SelectSeeds);
        let seeds = select_seeds(store, &self.config.sampler)?;

        on_stage(PipelineStage::Tessellate);
        let boundary = store.boundary();
        let mut tessellation: Tessellation = build_tessellation(&seeds, &boundary)?;

        on_stage(PipelineStage::Aggregate);
        aggregate_cells(&mut tessellation.cells, &grid, self.config.coverage);

        Ok(PipelineOutput {
            grid,
            tessellation: Some(tessellation),
        })
    }
}
