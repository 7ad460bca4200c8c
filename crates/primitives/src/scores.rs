//! Regression score type definitions.

use serde::{Deserialize, Serialize};

/// Prediction quality of a model on a set of observed targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionScores {
    /// Mean absolute error.
    pub mae: f64,
    /// Median absolute error.
    pub medae: f64,
    /// Mean squared error.
    pub mse: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Maximum absolute error.
    pub maxe: f64,
    /// Mean absolute percentage error (fraction, not percent).
    pub mape: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

impl PredictionScores {
    /// Score names and values, in a fixed order.
    #[must_use]
    pub const fn as_pairs(&self) -> [(&'static str, f64); 7] {
        [
            ("mae", self.mae),
            ("medae", self.medae),
            ("mse", self.mse),
            ("rmse", self.rmse),
            ("maxe", self.maxe),
            ("mape", self.mape),
            ("r2", self.r2),
        ]
    }

    /// Look up a score by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.as_pairs().into_iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}
