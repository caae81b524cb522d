//! Population-weighted seed selection
//!
//! Selection is weighted sampling without replacement using exponential
//! keys: each eligible record draws one uniform variate in input order from
//! a seeded generator and receives the key -ln(u) / population; the k
//! smallest keys win. For a fixed input set and seed value the selection is
//! identical across runs, and key ties fall back to input order.

use crate::io::configuration::{DEFAULT_RANDOM_SEED, DEFAULT_SEED_FLOOR, DEFAULT_TARGET_POP_PER_SEED};
use crate::io::error::{PipelineError, Result, invalid_parameter};
use crate::spatial::records::PolygonAttributeStore;
use geo::{Centroid, Coord};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::cmp::Ordering;

/// Parameters controlling seed selection
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Target population represented by one seed
    pub target_population_per_seed: u64,
    /// Minimum number of seeds regardless of total population
    pub seed_floor: usize,
    /// Seed value for the deterministic generator
    pub random_seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target_population_per_seed: DEFAULT_TARGET_POP_PER_SEED,
            seed_floor: DEFAULT_SEED_FLOOR,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

/// Seed count derived from total population
///
/// Floor-divides the population by the per-seed target and clamps to the
/// configured minimum. Monotonically non-decreasing in population and
/// non-increasing in the target.
pub const fn seed_count(total_population: u64, target_per_seed: u64, floor: usize) -> usize {
    let derived = (total_population / target_per_seed) as usize;
    if derived > floor { derived } else { floor }
}

/// Select population-weighted seed coordinates from the store
///
/// Filters to records with population > 0 and a well-defined centroid, then
/// draws exactly k = max(floor, total / target) of them without replacement,
/// with selection probability proportional to population. The output holds
/// one centroid per selected record, in input order.
///
/// # Errors
///
/// Returns `InvalidInput` for a non-positive target or floor, and
/// `InsufficientRecords` when k exceeds the eligible record count.
pub fn select_seeds(store: &PolygonAttributeStore, config: &SamplerConfig) -> Result<Vec<Coord<f64>>> {
    if config.target_population_per_seed == 0 {
        return Err(invalid_parameter(
            "target_population_per_seed",
            &0,
            &"target population per seed must be positive",
        ));
    }
    if config.seed_floor == 0 {
        return Err(invalid_parameter(
            "seed_floor",
            &0,
            &"seed floor must be positive",
        ));
    }

    let eligible: Vec<(Coord<f64>, u64)> = store
        .records()
        .iter()
        .filter(|record| record.population > 0)
        .filter_map(|record| {
            record
                .geometry
                .centroid()
                .map(|centroid| (centroid.into(), record.population))
        })
        .collect();

    let requested = seed_count(
        store.total_population(),
        config.target_population_per_seed,
        config.seed_floor,
    );

    if requested > eligible.len() {
        return Err(PipelineError::InsufficientRecords {
            requested,
            available: eligible.len(),
        });
    }

    // One draw per eligible record, in input order, so the key sequence is a
    // pure function of (input set, seed value).
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let mut keyed: Vec<(f64, usize)> = eligible
        .iter()
        .enumerate()
        .map(|(index, (_, population))| {
            let uniform: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
            (-uniform.ln() / *population as f64, index)
        })
        .collect();

    keyed.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });

    let mut selected: Vec<usize> = keyed.iter().take(requested).map(|(_, index)| *index).collect();
    selected.sort_unstable();

    Ok(selected
        .iter()
        .filter_map(|&index| eligible.get(index).map(|(centroid, _)| *centroid))
        .collect())
}
