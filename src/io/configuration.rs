//! Pipeline constants and runtime configuration defaults

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension in cells
pub const MAX_GRID_DIMENSION: usize = 50_000;

// Default values for configurable parameters
/// Fixed seed for reproducible selection
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Default raster cell size in meters (10 km)
pub const DEFAULT_CELL_SIZE_M: f64 = 10_000.0;

/// Default target population per tessellation seed
pub const DEFAULT_TARGET_POP_PER_SEED: u64 = 1_000_000;

/// Default minimum number of tessellation seeds
pub const DEFAULT_SEED_FLOOR: usize = 80;

/// Default dataset vintage year used in artifact names
pub const DEFAULT_VINTAGE: u16 = 2022;

// Output settings
/// Basename stem for the density grid artifact
pub const GRID_ARTIFACT_STEM: &str = "pop_density";

/// Basename for the tessellation artifact
pub const TESSELLATION_ARTIFACT: &str = "tessellation.geojson";

/// Extension of the grid artifact sidecar carrying transform and CRS
pub const SIDECAR_EXTENSION: &str = "meta.json";

// Progress bar display settings
/// Number of pipeline stages reported to the progress display
pub const PIPELINE_STAGES: usize = 6;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
