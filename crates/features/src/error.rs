//! Error types for feature engineering.

use gapfill_primitives::DatasetError;
use gapfill_traits::TransformError;

/// Errors that can occur while building features.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Invalid lag specification.
    #[error("invalid lag: {0}")]
    InvalidLag(String),

    /// A derived column would overwrite an existing one.
    #[error("column already exists: {0}")]
    DuplicateColumn(String),

    /// Transform error.
    #[error("transform error: {0}")]
    Transform(TransformError),

    /// Dataset error.
    #[error("dataset error: {0}")]
    Dataset(DatasetError),
}

impl From<DatasetError> for FeatureError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::DuplicateColumn(name) => Self::DuplicateColumn(name),
            other => Self::Dataset(other),
        }
    }
}

impl From<TransformError> for FeatureError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Dataset(inner) => inner.into(),
            other => Self::Transform(other),
        }
    }
}
