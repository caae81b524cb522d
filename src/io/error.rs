//! Error types and recovery policy for pipeline operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all pipeline operations
///
/// Acquisition and geometry failures are recoverable at the record or
/// subregion level (skip with a warning); every other variant aborts the run
/// rather than producing a partially-correct artifact.
#[derive(Debug)]
pub enum PipelineError {
    /// A subregion source could not be read or parsed
    ///
    /// Recovered by skipping the subregion; acquisition as a whole succeeds
    /// with partial coverage.
    Acquisition {
        /// Subregion label, usually the source file name
        region: String,
        /// Description of the failure
        reason: String,
    },

    /// A source feature carried degenerate or empty geometry
    ///
    /// Recovered by excluding the record from all downstream stages.
    InvalidGeometry {
        /// Identifier of the offending record
        id: String,
        /// What was wrong with the geometry
        reason: String,
    },

    /// Seed count exceeds the number of eligible records
    ///
    /// Sampling without replacement cannot proceed; aborts tessellation.
    InsufficientRecords {
        /// Seeds requested by the population-derived count
        requested: usize,
        /// Records with population > 0 available for selection
        available: usize,
    },

    /// Run parameter validation failed before any stage executed
    InvalidInput {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// An output artifact could not be persisted
    OutputWrite {
        /// Path where the write was attempted
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The quicklook rendering could not be saved
    QuicklookExport {
        /// Path where the export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// An interchange file could not be serialized or deserialized
    Serialization {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquisition { region, reason } => {
                write!(f, "Failed to acquire subregion '{region}': {reason}")
            }
            Self::InvalidGeometry { id, reason } => {
                write!(f, "Invalid geometry for record '{id}': {reason}")
            }
            Self::InsufficientRecords {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Cannot select {requested} seeds from {available} populated records"
                )
            }
            Self::InvalidInput {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::OutputWrite { path, source } => {
                write!(f, "Failed to write '{}': {source}", path.display())
            }
            Self::QuicklookExport { path, source } => {
                write!(f, "Failed to export quicklook '{}': {source}", path.display())
            }
            Self::Serialization { path, reason } => {
                write!(f, "Serialization error for '{}': {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OutputWrite { source, .. } => Some(source),
            Self::QuicklookExport { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PipelineError {
    PipelineError::InvalidInput {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an acquisition error for a subregion
pub fn acquisition_error(region: &impl ToString, reason: &impl ToString) -> PipelineError {
    PipelineError::Acquisition {
        region: region.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid geometry error for a record
pub fn geometry_error(id: &impl ToString, reason: &impl ToString) -> PipelineError {
    PipelineError::InvalidGeometry {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

/// Wrap an I/O error with the path being written
pub fn output_error(path: impl Into<PathBuf>, source: std::io::Error) -> PipelineError {
    PipelineError::OutputWrite {
        path: path.into(),
        source,
    }
}

/// Create a serialization error for an interchange file
pub fn serialization_error(path: impl Into<PathBuf>, reason: &impl ToString) -> PipelineError {
    PipelineError::Serialization {
        path: path.into(),
        reason: reason.to_string(),
    }
}
