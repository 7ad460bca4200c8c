//! Continuous record number.

use gapfill_primitives::{DatasetError, TimeSeriesDataset};
use gapfill_traits::{FeatureKind, FeatureTransform, TransformError};
use gapfill_utils::int_column;

/// Record number column.
pub const RECORD_NUMBER: &str = ".RECORDNUMBER";

/// Adds the 1-based position of each row in the index.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNumber;

impl FeatureTransform for RecordNumber {
    fn name(&self) -> &str {
        "record-number"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::RecordNumber
    }

    fn apply(&self, dataset: &TimeSeriesDataset) -> Result<TimeSeriesDataset, TransformError> {
        if dataset.has_column(RECORD_NUMBER) {
            return Err(DatasetError::DuplicateColumn(RECORD_NUMBER.to_string()).into());
        }
        let n = i32::try_from(dataset.len())
            .map_err(|_| TransformError::InvalidParameter("too many records".to_string()))?;
        let values = (1..=n).map(Some).collect();
        Ok(dataset.with_columns(vec![int_column(RECORD_NUMBER, values)])?)
    }
}
