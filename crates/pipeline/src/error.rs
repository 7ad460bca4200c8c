//! Error types for the gap-filling pipeline.

use gapfill_features::FeatureError;
use gapfill_math::MathError;
use gapfill_primitives::{DatasetError, FillStage};
use gapfill_traits::{RegressorError, TransformError};
use gapfill_utils::UtilsError;

/// Errors that can occur in the gap-filling pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Invalid configuration or input shape, detected before any fitting.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Artifact requested before the stage producing it has run.
    #[error("{0} not available: run the producing stage first")]
    NotReady(&'static str),

    /// No feature beat the random control.
    #[error("no feature is more important than {random_feature} (threshold {threshold})")]
    DegenerateSelection {
        /// Name of the random control feature.
        random_feature: String,
        /// Importance of the random control feature.
        threshold: f64,
    },

    /// Dataset features differ from the features the model was trained on.
    #[error("feature mismatch: model trained on {expected:?}, dataset has {actual:?}")]
    FeatureMismatch {
        /// Features the model was trained on.
        expected: Vec<String>,
        /// Features of the dataset.
        actual: Vec<String>,
    },

    /// Gap-filling transition applied out of order.
    #[error("invalid fill stage: expected {expected}, got {actual}")]
    InvalidStage {
        /// Stage the transition starts from.
        expected: FillStage,
        /// Stage of the given result.
        actual: FillStage,
    },

    /// Dataset error (including invalid timestamp index).
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Regressor error.
    #[error("regressor error: {0}")]
    Regressor(#[from] RegressorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Feature engineering error.
    #[error("feature error: {0}")]
    Feature(#[from] FeatureError),

    /// Transform error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Utility error.
    #[error("utility error: {0}")]
    Utils(#[from] UtilsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl PipelineError {
    /// Returns whether this error is recoverable.
    ///
    /// Only errors that leave the pipeline usable (reading an artifact too
    /// early, or a selection that rejected everything) are recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotReady(_) | Self::DegenerateSelection { .. })
    }

    /// Returns whether this error stems from an invalid timestamp index.
    #[must_use]
    pub const fn is_data_integrity(&self) -> bool {
        match self {
            Self::Dataset(e) => e.is_integrity_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PipelineError::NotReady("model");
        assert_eq!(err.to_string(), "model not available: run the producing stage first");

        let err = PipelineError::Configuration("test_size must be in (0, 1)".to_string());
        assert!(err.to_string().contains("test_size"));
    }

    #[test]
    fn error_is_recoverable() {
        assert!(PipelineError::NotReady("scores").is_recoverable());
        assert!(
            PipelineError::DegenerateSelection { random_feature: ".RANDOM".into(), threshold: 0.1 }
                .is_recoverable()
        );
        assert!(!PipelineError::Configuration("x".into()).is_recoverable());
        assert!(!PipelineError::Dataset(DatasetError::MissingColumn("NEE".into())).is_recoverable());
    }

    #[test]
    fn data_integrity() {
        let err = PipelineError::Dataset(DatasetError::LengthMismatch { expected: 3, actual: 2 });
        assert!(err.is_data_integrity());
        assert!(!PipelineError::NotReady("model").is_data_integrity());
    }
}
