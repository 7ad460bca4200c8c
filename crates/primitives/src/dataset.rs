//! Time-indexed dataset with one target column.

use std::sync::Arc;

use gapfill_utils::{ModelArrays, convert_to_arrays, extract_column};
use polars::prelude::*;

use crate::{DatasetError, Timestamp};

/// A table indexed by a strictly increasing timestamp, with one target column
/// and zero or more feature columns.
///
/// Datasets are snapshots: every operation that changes columns returns a new
/// dataset sharing the same index. All value columns are stored as `Float64`.
#[derive(Debug, Clone)]
pub struct TimeSeriesDataset {
    timestamps: Arc<[Timestamp]>,
    frame: DataFrame,
    target: String,
}

impl TimeSeriesDataset {
    /// Create a dataset from an index and a frame of values.
    ///
    /// # Arguments
    /// * `timestamps` - Index, one timestamp per row, strictly increasing
    /// * `frame` - Target and feature columns; numeric columns are cast to `Float64`
    /// * `target` - Name of the target column
    ///
    /// # Errors
    /// Returns `DatasetError::NotStrictlyIncreasing` or `DatasetError::LengthMismatch`
    /// for an invalid index, and `DatasetError::MissingColumn` if `target` is absent.
    pub fn new(
        timestamps: Vec<Timestamp>,
        frame: DataFrame,
        target: impl Into<String>,
    ) -> Result<Self, DatasetError> {
        validate_index(&timestamps)?;
        let frame = cast_to_float(frame)?;
        Self::from_parts(timestamps.into(), frame, target.into())
    }

    fn from_parts(
        timestamps: Arc<[Timestamp]>,
        frame: DataFrame,
        target: String,
    ) -> Result<Self, DatasetError> {
        if frame.height() != timestamps.len() {
            return Err(DatasetError::LengthMismatch {
                expected: timestamps.len(),
                actual: frame.height(),
            });
        }
        if frame.column(&target).is_err() {
            return Err(DatasetError::MissingColumn(target));
        }
        Ok(Self { timestamps, frame, target })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Timestamp index.
    #[must_use]
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Shared handle to the timestamp index.
    #[must_use]
    pub fn shared_timestamps(&self) -> Arc<[Timestamp]> {
        Arc::clone(&self.timestamps)
    }

    /// Name of the target column.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target
    }

    /// Underlying frame (target and features).
    #[must_use]
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Names of all feature columns, in frame order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| *name != self.target)
            .collect()
    }

    /// Number of columns including the target.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.frame.width()
    }

    /// Check whether a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Values of a column; NaN and infinite values are reported as missing.
    ///
    /// # Errors
    /// Returns `DatasetError::MissingColumn` if the column does not exist.
    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>, DatasetError> {
        if !self.has_column(name) {
            return Err(DatasetError::MissingColumn(name.to_string()));
        }
        Ok(extract_column(&self.frame, name)?)
    }

    /// Values of the target column.
    ///
    /// # Errors
    /// Returns an error if the target cannot be read as numeric.
    pub fn target(&self) -> Result<Vec<Option<f64>>, DatasetError> {
        self.column(&self.target)
    }

    /// Values of every feature column, in the order of `feature_names`.
    ///
    /// # Errors
    /// Returns an error if a feature cannot be read as numeric.
    pub fn feature_columns(&self) -> Result<Vec<Vec<Option<f64>>>, DatasetError> {
        self.feature_names().iter().map(|name| self.column(name)).collect()
    }

    /// Add columns, returning a new snapshot.
    ///
    /// # Errors
    /// Returns `DatasetError::DuplicateColumn` if a name already exists and
    /// `DatasetError::LengthMismatch` if a column has the wrong length.
    pub fn with_columns(&self, columns: Vec<Column>) -> Result<Self, DatasetError> {
        for column in &columns {
            if self.has_column(column.name()) {
                return Err(DatasetError::DuplicateColumn(column.name().to_string()));
            }
            if column.len() != self.len() {
                return Err(DatasetError::LengthMismatch {
                    expected: self.len(),
                    actual: column.len(),
                });
            }
        }
        let frame = cast_to_float(self.frame.hstack(&columns)?)?;
        Self::from_parts(self.shared_timestamps(), frame, self.target.clone())
    }

    /// Replace the frame, keeping index and target, returning a new snapshot.
    ///
    /// # Errors
    /// Returns an error if the frame height differs from the index or the
    /// target column is missing.
    pub fn with_frame(&self, frame: DataFrame) -> Result<Self, DatasetError> {
        let frame = cast_to_float(frame)?;
        Self::from_parts(self.shared_timestamps(), frame, self.target.clone())
    }

    /// Keep the target and the named features, returning a new snapshot.
    ///
    /// The index is unchanged: no rows are dropped.
    ///
    /// # Errors
    /// Returns `DatasetError::MissingColumn` if a feature does not exist.
    pub fn select_features(&self, features: &[String]) -> Result<Self, DatasetError> {
        if let Some(missing) = features.iter().find(|f| !self.has_column(f)) {
            return Err(DatasetError::MissingColumn(missing.clone()));
        }
        let names = std::iter::once(self.target.as_str()).chain(features.iter().map(String::as_str));
        let frame = self.frame.select(names)?;
        Self::from_parts(self.shared_timestamps(), frame, self.target.clone())
    }

    /// Target and feature arrays restricted to rows where all are present.
    ///
    /// # Errors
    /// Returns an error if a column cannot be read.
    pub fn complete_cases(&self) -> Result<ModelArrays, DatasetError> {
        let target = self.target()?;
        let features = self.feature_columns()?;
        let refs: Vec<&[Option<f64>]> = features.iter().map(Vec::as_slice).collect();
        Ok(convert_to_arrays(&target, &refs)?)
    }

    /// Feature arrays restricted to rows where every feature is present,
    /// regardless of the target.
    ///
    /// The returned `target` holds zeros where the observed target is missing;
    /// use `rows` to align with the index.
    ///
    /// # Errors
    /// Returns an error if a column cannot be read.
    pub fn feature_complete_rows(&self) -> Result<ModelArrays, DatasetError> {
        let target = self.target()?;
        let placeholder: Vec<Option<f64>> = target.iter().map(|v| Some(v.unwrap_or(0.0))).collect();
        let features = self.feature_columns()?;
        let refs: Vec<&[Option<f64>]> = features.iter().map(Vec::as_slice).collect();
        Ok(convert_to_arrays(&placeholder, &refs)?)
    }

    /// First and last timestamp, if any.
    #[must_use]
    pub fn span(&self) -> Option<(Timestamp, Timestamp)> {
        Some((*self.timestamps.first()?, *self.timestamps.last()?))
    }
}

/// Check that timestamps are strictly increasing (sorted and unique).
fn validate_index(timestamps: &[Timestamp]) -> Result<(), DatasetError> {
    for (i, pair) in timestamps.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(DatasetError::NotStrictlyIncreasing {
                position: i + 1,
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}

fn cast_to_float(frame: DataFrame) -> Result<DataFrame, DatasetError> {
    let needs_cast: Vec<String> = frame
        .get_columns()
        .iter()
        .filter(|c| c.dtype() != &DataType::Float64)
        .map(|c| c.name().to_string())
        .collect();

    if needs_cast.is_empty() {
        return Ok(frame);
    }

    let exprs: Vec<Expr> =
        needs_cast.iter().map(|name| col(name.as_str()).cast(DataType::Float64)).collect();
    Ok(frame.lazy().with_columns(exprs).collect()?)
}
