//! Ridge-regularized linear regression.

use gapfill_math::least_squares;
use gapfill_traits::{Regressor, RegressorError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Columns with a spread below this are treated as constant.
const CONSTANT_TOLERANCE: f64 = 1e-12;

/// Configuration for [`LinearRegressor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    /// Ridge penalty on the standardized coefficients.
    pub alpha: f64,
    /// Whether to fit an intercept.
    pub fit_intercept: bool,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self { alpha: 1e-6, fit_intercept: true }
    }
}

impl LinearConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidParameter` for a negative or non-finite penalty.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ModelError::invalid("alpha", format!("must be finite and >= 0, got {}", self.alpha)));
        }
        Ok(())
    }
}

/// Linear regression fitted on standardized features.
///
/// Features are centered (when fitting an intercept) and scaled to unit
/// spread before solving, so the ridge penalty acts evenly across features.
/// Constant features carry no information and get a zero coefficient.
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    config: LinearConfig,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegressor {
    /// Create a new regressor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LinearConfig::default())
    }

    /// Fitted coefficients on the original feature scale.
    #[must_use]
    pub const fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    /// Fitted intercept.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Default for LinearRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for LinearRegressor {
    type Config = LinearConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config, coefficients: None, intercept: 0.0 }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn name(&self) -> &str {
        "linear"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), RegressorError> {
        self.config.validate()?;

        let n = x.nrows();
        let p = x.ncols();
        if y.len() != n {
            return Err(RegressorError::DimensionMismatch {
                expected: n,
                actual: y.len(),
                context: "targets".to_string(),
            });
        }
        if n < 2 {
            return Err(RegressorError::InsufficientData { required: 2, actual: n });
        }

        let (means, y_mean) = if self.config.fit_intercept {
            (x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(p)), y.mean().unwrap_or(0.0))
        } else {
            (Array1::zeros(p), 0.0)
        };

        let scales: Vec<f64> = (0..p)
            .map(|j| {
                let col = x.column(j);
                let m = means[j];
                (col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n as f64).sqrt()
            })
            .collect();
        let active: Vec<usize> = (0..p).filter(|&j| scales[j] > CONSTANT_TOLERANCE).collect();

        let mut coefficients = Array1::zeros(p);

        if !active.is_empty() {
            let design = Array2::from_shape_fn((n, active.len()), |(i, k)| {
                let j = active[k];
                (x[[i, j]] - means[j]) / scales[j]
            });
            let centered = y.mapv(|v| v - y_mean);
            let fit = least_squares(&centered, &design, self.config.alpha)
                .map_err(ModelError::from)?;
            for (k, &j) in active.iter().enumerate() {
                coefficients[j] = fit.coefficients[k] / scales[j];
            }
        }

        self.intercept = y_mean - coefficients.dot(&means);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, RegressorError> {
        let coefficients = self.coefficients.as_ref().ok_or(RegressorError::NotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(RegressorError::DimensionMismatch {
                expected: coefficients.len(),
                actual: x.ncols(),
                context: "features".to_string(),
            });
        }
        Ok(x.dot(coefficients) + self.intercept)
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}
