//! Feature pipeline assembly.

use gapfill_primitives::TimeSeriesDataset;
use gapfill_traits::FeatureTransform;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{FeatureError, LagFeatures, LagWindow, RecordNumber, TimestampFeatures};

/// Configuration for [`FeatureBuilder`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Record shifts applied to every raw feature (non-zero, unique).
    pub lags: Vec<i64>,
    /// Whether to add year, season, month, week, day-of-year and hour.
    pub include_timestamp_features: bool,
    /// Whether to add a continuous record number.
    pub include_record_number: bool,
}

impl FeatureConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `FeatureError::InvalidLag` for zero or repeated lags.
    pub fn validate(&self) -> Result<(), FeatureError> {
        LagWindow::new(self.lags.clone()).map(|_| ())
    }
}

/// Enriches a dataset with derived feature columns.
///
/// Lags are applied first, to the raw features only; timestamp features and
/// the record number are added afterwards and are never lagged.
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    /// Create a builder that adds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with the given configuration.
    #[must_use]
    pub const fn with_config(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Transforms in application order.
    ///
    /// # Errors
    /// Returns `FeatureError::InvalidLag` for an invalid lag set.
    pub fn transforms(&self) -> Result<Vec<Box<dyn FeatureTransform>>, FeatureError> {
        let mut transforms: Vec<Box<dyn FeatureTransform>> = Vec::new();
        let window = LagWindow::new(self.config.lags.clone())?;
        if !window.is_empty() {
            transforms.push(Box::new(LagFeatures::new(window)));
        }
        if self.config.include_timestamp_features {
            transforms.push(Box::new(TimestampFeatures::new()));
        }
        if self.config.include_record_number {
            transforms.push(Box::new(RecordNumber));
        }
        Ok(transforms)
    }

    /// Build the enriched dataset.
    ///
    /// # Errors
    /// Returns `FeatureError::InvalidLag` for an invalid configuration and
    /// `FeatureError::DuplicateColumn` if a derived column already exists.
    pub fn build(&self, dataset: &TimeSeriesDataset) -> Result<TimeSeriesDataset, FeatureError> {
        let mut current = dataset.clone();
        for transform in self.transforms()? {
            let before = current.n_columns();
            current = transform.apply(&current)?;
            debug!(
                transform = transform.name(),
                kind = %transform.kind(),
                added = current.n_columns() - before,
                "applied feature transform"
            );
        }
        Ok(current)
    }
}
