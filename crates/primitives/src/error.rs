//! Error types for dataset construction and access.

use gapfill_utils::UtilsError;

use crate::Timestamp;

/// Errors that can occur when building or reading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Timestamp index is not strictly increasing (unsorted or duplicated).
    #[error("timestamp index not strictly increasing at position {position}: {previous} >= {current}")]
    NotStrictlyIncreasing {
        /// Position of the offending timestamp.
        position: usize,
        /// Timestamp before the offending one.
        previous: Timestamp,
        /// Offending timestamp.
        current: Timestamp,
    },

    /// Frame height does not match the index length.
    #[error("length mismatch: index has {expected} timestamps, data has {actual} rows")]
    LengthMismatch {
        /// Index length.
        expected: usize,
        /// Data rows.
        actual: usize,
    },

    /// Missing required column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Column already present.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// Utility error.
    #[error("utility error: {0}")]
    Utils(#[from] UtilsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl DatasetError {
    /// Returns whether this error stems from an invalid timestamp index.
    #[must_use]
    pub const fn is_integrity_error(&self) -> bool {
        matches!(self, Self::NotStrictlyIncreasing { .. } | Self::LengthMismatch { .. })
    }
}
