//! Lagged variants of raw features.

use gapfill_primitives::{DatasetError, FeatureName, TimeSeriesDataset};
use gapfill_traits::{FeatureKind, FeatureTransform, TransformError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// Ordered set of non-zero record shifts.
///
/// Negative lags look back in time, positive lags look ahead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagWindow {
    lags: Vec<i64>,
}

impl LagWindow {
    /// Create a window from explicit lags.
    ///
    /// # Errors
    /// Returns `FeatureError::InvalidLag` for a zero or repeated lag.
    pub fn new(lags: Vec<i64>) -> Result<Self, FeatureError> {
        for (i, lag) in lags.iter().enumerate() {
            if *lag == 0 {
                return Err(FeatureError::InvalidLag("lag 0 is not a shift".to_string()));
            }
            if lags[..i].contains(lag) {
                return Err(FeatureError::InvalidLag(format!("lag {lag} given more than once")));
            }
        }
        Ok(Self { lags })
    }

    /// Every non-zero lag in the inclusive range `[min, max]`.
    ///
    /// `range(-2, 2)` gives `-2, -1, 1, 2`.
    ///
    /// # Errors
    /// Returns `FeatureError::InvalidLag` if `min > max` or the range holds
    /// no non-zero lag.
    pub fn range(min: i64, max: i64) -> Result<Self, FeatureError> {
        if min > max {
            return Err(FeatureError::InvalidLag(format!("empty range [{min}, {max}]")));
        }
        let lags: Vec<i64> = (min..=max).filter(|&k| k != 0).collect();
        if lags.is_empty() {
            return Err(FeatureError::InvalidLag(format!("range [{min}, {max}] has no shift")));
        }
        Self::new(lags)
    }

    /// Lags in order.
    #[must_use]
    pub fn lags(&self) -> &[i64] {
        &self.lags
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }
}

/// Adds shifted copies of every feature column.
///
/// For a lag `k` the value at row `i` is the base value at row `i + k`;
/// rows shifted past either edge are missing.
#[derive(Debug, Clone)]
pub struct LagFeatures {
    window: LagWindow,
}

impl LagFeatures {
    /// Create a lag transform.
    #[must_use]
    pub const fn new(window: LagWindow) -> Self {
        Self { window }
    }

    /// The lag window.
    #[must_use]
    pub const fn window(&self) -> &LagWindow {
        &self.window
    }
}

impl FeatureTransform for LagFeatures {
    fn name(&self) -> &str {
        "lag"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::Lagged
    }

    fn apply(&self, dataset: &TimeSeriesDataset) -> Result<TimeSeriesDataset, TransformError> {
        let mut exprs = Vec::new();
        for base in dataset.feature_names() {
            for &lag in self.window.lags() {
                let name = FeatureName::lagged(&base, lag);
                if dataset.has_column(name.as_str()) {
                    return Err(DatasetError::DuplicateColumn(name.into()).into());
                }
                // polars shifts values down for positive periods
                exprs.push(col(base.as_str()).shift(lit(-lag)).alias(name.as_str()));
            }
        }

        if exprs.is_empty() {
            return Ok(dataset.clone());
        }

        let frame = dataset.frame().clone().lazy().with_columns(exprs).collect()?;
        Ok(dataset.with_frame(frame)?)
    }
}
