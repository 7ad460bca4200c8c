//! Integer features derived from the timestamp index.

use chrono::{Datelike, Timelike};
use gapfill_primitives::{DatasetError, TimeSeriesDataset, Timestamp};
use gapfill_traits::{FeatureKind, FeatureTransform, TransformError};
use gapfill_utils::int_column;

/// Year column.
pub const YEAR: &str = ".YEAR";
/// Meteorological season column (DJF = 1, MAM = 2, JJA = 3, SON = 4).
pub const SEASON: &str = ".SEASON";
/// Month column.
pub const MONTH: &str = ".MONTH";
/// ISO week column.
pub const WEEK: &str = ".WEEK";
/// Day-of-year column.
pub const DOY: &str = ".DOY";
/// Hour column.
pub const HOUR: &str = ".HOUR";

/// Adds year, season, month, week, day-of-year and hour columns.
///
/// The values are pure functions of the timestamp and never missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFeatures;

impl TimestampFeatures {
    /// Names of the columns this transform adds, in order.
    pub const COLUMNS: [&'static str; 6] = [YEAR, SEASON, MONTH, WEEK, DOY, HOUR];

    /// Create the transform.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Column names as owned strings.
    #[must_use]
    pub fn column_names() -> Vec<String> {
        Self::COLUMNS.iter().map(ToString::to_string).collect()
    }
}

/// Meteorological season of a month.
const fn season(month: u32) -> i32 {
    match month {
        12 | 1 | 2 => 1,
        3..=5 => 2,
        6..=8 => 3,
        _ => 4,
    }
}

fn values(timestamps: &[Timestamp], f: impl Fn(&Timestamp) -> i32) -> Vec<Option<i32>> {
    timestamps.iter().map(|ts| Some(f(ts))).collect()
}

impl FeatureTransform for TimestampFeatures {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::Timestamp
    }

    fn apply(&self, dataset: &TimeSeriesDataset) -> Result<TimeSeriesDataset, TransformError> {
        if let Some(existing) = Self::COLUMNS.iter().find(|c| dataset.has_column(c)) {
            return Err(DatasetError::DuplicateColumn((*existing).to_string()).into());
        }

        let ts = dataset.timestamps();
        let columns = vec![
            int_column(YEAR, values(ts, |t| t.year())),
            int_column(SEASON, values(ts, |t| season(t.month()))),
            int_column(MONTH, values(ts, |t| t.month() as i32)),
            int_column(WEEK, values(ts, |t| t.iso_week().week() as i32)),
            int_column(DOY, values(ts, |t| t.ordinal() as i32)),
            int_column(HOUR, values(ts, |t| t.hour() as i32)),
        ];
        Ok(dataset.with_columns(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use polars::prelude::*;
    use rstest::rstest;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn derives_calendar_fields() {
        let timestamps = vec![at(2023, 12, 31, 23), at(2024, 1, 1, 0), at(2024, 7, 15, 12)];
        let frame = df! { "NEE" => [1.0, f64::NAN, 3.0] }.unwrap();
        let ds = TimeSeriesDataset::new(timestamps, frame, "NEE").unwrap();

        let out = TimestampFeatures::new().apply(&ds).unwrap();

        assert_eq!(out.column(YEAR).unwrap(), vec![Some(2023.0), Some(2024.0), Some(2024.0)]);
        assert_eq!(out.column(SEASON).unwrap(), vec![Some(1.0), Some(1.0), Some(3.0)]);
        assert_eq!(out.column(MONTH).unwrap(), vec![Some(12.0), Some(1.0), Some(7.0)]);
        // 2023-12-31 is in ISO week 52, 2024-01-01 in week 1
        assert_eq!(out.column(WEEK).unwrap(), vec![Some(52.0), Some(1.0), Some(29.0)]);
        assert_eq!(out.column(DOY).unwrap(), vec![Some(365.0), Some(1.0), Some(197.0)]);
        assert_eq!(out.column(HOUR).unwrap(), vec![Some(23.0), Some(0.0), Some(12.0)]);
        assert_eq!(out.feature_names(), TimestampFeatures::column_names());
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(5, 2)]
    #[case(6, 3)]
    #[case(8, 3)]
    #[case(9, 4)]
    #[case(11, 4)]
    #[case(12, 1)]
    fn seasons(#[case] month: u32, #[case] expected: i32) {
        assert_eq!(season(month), expected);
    }

    #[test]
    fn applying_twice_is_refused() {
        let frame = df! { "NEE" => [1.0] }.unwrap();
        let ds = TimeSeriesDataset::new(vec![at(2024, 1, 1, 0)], frame, "NEE").unwrap();
        let once = TimestampFeatures::new().apply(&ds).unwrap();
        assert!(TimestampFeatures::new().apply(&once).is_err());
    }
}
