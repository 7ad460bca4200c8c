//! Regression model trait definitions.

use ndarray::{Array1, Array2};

/// Errors that can occur while fitting or applying a regressor.
#[derive(Debug, thiserror::Error)]
pub enum RegressorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient data for fitting.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Model used before fitting.
    #[error("model has not been fitted")]
    NotFitted,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl RegressorError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::LinearAlgebra(_))
    }
}

/// Fit/predict capability of a regression model.
///
/// The pipeline is generic over this trait and never inspects a model's
/// internals. Fresh, unfitted models are built from a configuration, so the
/// pipeline can train several independent models (feature reduction, final
/// model, fallback model) with the caller's hyperparameters.
pub trait Regressor: Send + Sync {
    /// Configuration type for this regressor.
    type Config: Default + Clone + Send + Sync;

    /// Create a new, unfitted regressor with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Returns the configuration.
    fn config(&self) -> &Self::Config;

    /// Returns a short name of the model family.
    fn name(&self) -> &str;

    /// Fit the model.
    ///
    /// # Arguments
    /// * `x` - Feature matrix (n_samples x n_features)
    /// * `y` - Targets (n_samples,)
    ///
    /// # Errors
    /// Returns `RegressorError` if dimensions mismatch or fitting fails.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), RegressorError>;

    /// Predict targets.
    ///
    /// # Errors
    /// Returns `RegressorError::NotFitted` before `fit`, or a dimension error
    /// if `x` has a different number of features than the training data.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, RegressorError>;

    /// Returns whether the model has been fitted.
    fn is_fitted(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regressor_error_is_recoverable() {
        let err = RegressorError::InsufficientData { required: 10, actual: 5 };
        assert!(err.is_recoverable());

        let err = RegressorError::NotFitted;
        assert!(!err.is_recoverable());
    }

    #[test]
    fn regressor_error_display() {
        let err = RegressorError::DimensionMismatch {
            expected: 3,
            actual: 2,
            context: "features".to_string(),
        };
        assert_eq!(err.to_string(), "dimension mismatch for features: expected 3, got 2");
    }
}
