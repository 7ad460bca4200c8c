//! Feature transformation trait definitions.

use gapfill_primitives::{DatasetError, TimeSeriesDataset};
use polars::prelude::*;

use crate::FeatureKind;

/// Errors that can occur during transformation.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Empty input data.
    #[error("empty input data")]
    EmptyData,

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dataset error.
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// A feature engineering step.
///
/// Transforms never mutate their input: they return a new snapshot with the
/// target column unchanged and the same timestamp index.
pub trait FeatureTransform: Send + Sync {
    /// Returns the name of this transformation.
    fn name(&self) -> &str;

    /// Returns the kind of the columns this transformation adds.
    fn kind(&self) -> FeatureKind;

    /// Apply the transformation.
    ///
    /// # Errors
    /// Returns `TransformError` if the derived columns cannot be built or
    /// collide with existing columns.
    fn apply(&self, dataset: &TimeSeriesDataset) -> Result<TimeSeriesDataset, TransformError>;
}
