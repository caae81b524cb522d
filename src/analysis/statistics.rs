//! Summary statistics over included density values

/// Aggregate statistics of the grid cells covered by one tessellation cell
///
/// Only exists for cells with at least one covered grid cell; "no coverage"
/// is represented by its absence, never by zeroed statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonalStatistics {
    /// Arithmetic mean of the included values
    pub mean: f64,
    /// Median of the included values; even counts average the middle pair
    pub median: f64,
    /// Minimum included value
    pub min: f64,
    /// Maximum included value
    pub max: f64,
    /// Number of grid cells included in the sample
    pub covered_cells: usize,
}

/// Summarize a sample of density values
///
/// Returns `None` for the empty sample. The input is consumed because the
/// median requires a sort.
pub fn summarize(mut values: Vec<f64>) -> Option<ZonalStatistics> {
    if values.is_empty() {
        return None;
    }

    values.sort_unstable_by(f64::total_cmp);

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let min = values.first().copied()?;
    let max = values.last().copied()?;

    let median = if count % 2 == 1 {
        values.get(count / 2).copied()?
    } else {
        let upper = values.get(count / 2).copied()?;
        let lower = values.get(count / 2 - 1).copied()?;
        (lower + upper) / 2.0
    };

    Some(ZonalStatistics {
        mean: sum / count as f64,
        median,
        min,
        max,
        covered_cells: count,
    })
}
