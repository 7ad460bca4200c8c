//! Error types for numerical operations.

use gapfill_traits::RegressorError;

/// Errors that can occur during numerical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Invalid test split ratio.
    #[error("invalid test size: {0} (must be in (0, 1))")]
    InvalidTestSize(f64),

    /// Invalid number of permutation repeats.
    #[error("invalid number of repeats: {0} (must be positive)")]
    InvalidRepeats(usize),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Not enough rows for the requested operation.
    #[error("insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData {
        /// Required number of rows.
        required: usize,
        /// Actual number of rows.
        actual: usize,
    },

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Regressor error.
    #[error("regressor error: {0}")]
    Regressor(#[from] RegressorError),
}
