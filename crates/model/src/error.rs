//! Error types for regression models.

use gapfill_traits::RegressorError;

/// Errors raised while validating model configurations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Invalid hyperparameter.
    #[error("invalid {parameter}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Why the value is rejected.
        reason: String,
    },

    /// Numerical failure while fitting.
    #[error("math error: {0}")]
    Math(#[from] gapfill_math::MathError),
}

impl ModelError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { parameter, reason: reason.into() }
    }
}

impl From<ModelError> for RegressorError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidParameter { .. } => Self::InvalidConfig(err.to_string()),
            ModelError::Math(e) => Self::LinearAlgebra(e.to_string()),
        }
    }
}
