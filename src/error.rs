//! Error types for attainment-db
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// attainment-db error types
#[derive(Error, Debug)]
pub enum Error {
    /// Scale built with an empty or inverted domain
    #[error("Invalid scale: domain [{min}, {max}] with {size} buckets\nA scale needs min < max (both finite) and at least one bucket")]
    InvalidScale {
        /// Requested lower bound
        min: f64,
        /// Requested upper bound
        max: f64,
        /// Requested number of buckets
        size: usize,
    },

    /// Value outside the closed scale domain
    #[error("Value {value} is out of the scale domain [{min}, {max}]")]
    OutOfDomain {
        /// Offending value
        value: f64,
        /// Domain lower bound
        min: f64,
        /// Domain upper bound
        max: f64,
    },

    /// Bucket index past the last bucket
    #[error("Bucket index {index} out of range (scale has {size} buckets)")]
    BucketOutOfRange {
        /// Offending index
        index: usize,
        /// Number of buckets
        size: usize,
    },

    /// Key absent from a store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Statistics requested before any run was logged
    #[error("Empty store: {0}\nLog at least one run before computing statistics")]
    EmptyStore(String),

    /// Attainment level that no point reaches
    #[error("Attainment level {0} produced an empty front (fewer runs than the level?)")]
    EmptyLevel(usize),

    /// Attainment matrices of different shapes
    #[error("Matrix shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Shape of the first matrix (rows, columns)
        expected: (usize, usize),
        /// Shape of the offending matrix
        found: (usize, usize),
    },

    /// Statistic direction differs from the logged problem
    #[error("Optimization type mismatch: statistic expects {expected}, logger tracks {found}")]
    OptimizationMismatch {
        /// Direction the statistic was built for
        expected: String,
        /// Direction of the attached problem
        found: String,
    },

    /// Invalid argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
