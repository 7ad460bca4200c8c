//! End-to-end gap filling with the random forest.

use chrono::{Duration, NaiveDate};
use gapfill_features::{FeatureBuilder, FeatureConfig, RANDOM_FEATURE, TimestampFeatures};
use gapfill_model::{ForestConfig, RandomForestRegressor};
use gapfill_pipeline::{
    GAPFILLED_CUMULATIVE, PREDICTIONS_FALLBACK, PipelineConfig, PipelineError, TimeSeriesGapFiller,
};
use gapfill_primitives::{FillStage, Flag, TimeSeriesDataset};
use polars::prelude::*;
use rstest::{fixture, rstest};

const N: usize = 100;

/// Rows with a missing target: every fifth row starting at 3.
fn target_gaps() -> Vec<usize> {
    (0..N).filter(|i| i % 5 == 3).collect()
}

/// Target gaps where the features are missing too.
const FEATURE_GAPS: [usize; 5] = [3, 23, 43, 63, 83];

fn flux_dataset(feature_gaps: &[usize]) -> TimeSeriesDataset {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let timestamps = (0..N).map(|i| start + Duration::minutes(30 * i as i64)).collect();

    let radiation: Vec<f64> = (0..N).map(|i| ((i as f64) / 8.0).sin().max(0.0) * 600.0).collect();
    let temperature: Vec<f64> = (0..N).map(|i| 12.0 + ((i as f64) / 8.0 - 1.0).sin() * 6.0).collect();
    let gaps = target_gaps();
    let nee: Vec<Option<f64>> = (0..N)
        .map(|i| (!gaps.contains(&i)).then(|| -0.02 * radiation[i] + 0.3 * temperature[i]))
        .collect();
    let rg: Vec<Option<f64>> =
        (0..N).map(|i| (!feature_gaps.contains(&i)).then_some(radiation[i])).collect();
    let ta: Vec<Option<f64>> =
        (0..N).map(|i| (!feature_gaps.contains(&i)).then_some(temperature[i])).collect();

    let frame = df! { "NEE" => nee, "Rg" => rg, "TA" => ta }.unwrap();
    TimeSeriesDataset::new(timestamps, frame, "NEE").unwrap()
}

#[fixture]
fn forest() -> ForestConfig {
    ForestConfig { n_estimators: 25, ..ForestConfig::default() }
}

fn filler(dataset: TimeSeriesDataset, forest: ForestConfig) -> TimeSeriesGapFiller<RandomForestRegressor> {
    TimeSeriesGapFiller::new(dataset, forest, PipelineConfig::default()).unwrap()
}

#[rstest]
fn full_model_fills_every_gap(forest: ForestConfig) {
    let mut filler = filler(flux_dataset(&[]), forest);
    filler.train_model().unwrap();
    let result = &filler.fill_gaps().unwrap().result;

    assert_eq!(result.stage(), FillStage::Combined);
    assert_eq!(result.count_flag(Flag::FullModel), 20);
    assert_eq!(result.count_flag(Flag::Fallback), 0);
    assert_eq!(result.count_flag(Flag::Observed), 80);
    assert!(result.fallback_predictions().is_none());
}

#[rstest]
fn fallback_engages_where_features_are_missing(forest: ForestConfig) {
    let mut filler = filler(flux_dataset(&FEATURE_GAPS), forest);
    filler.train_model().unwrap();
    filler.fill_gaps().unwrap();
    let result = filler.gapfilling_result().unwrap();

    assert_eq!(result.count_flag(Flag::FullModel), 15);
    assert_eq!(result.count_flag(Flag::Fallback), 5);
    assert_eq!(result.count_flag(Flag::Observed), 80);
    for row in FEATURE_GAPS {
        assert_eq!(result.flags()[row], Some(Flag::Fallback));
    }
    assert_eq!(result.fallback_features(), TimestampFeatures::column_names().as_slice());
    assert!(result.fallback_features().iter().all(|f| f != "Rg" && f != "TA"));
    assert_eq!(result.n_unfilled(), 0);

    let frame = result.to_frame().unwrap();
    assert!(frame.column(PREDICTIONS_FALLBACK).is_ok());
}

#[rstest]
fn flag_zero_iff_observed(forest: ForestConfig) {
    let mut filler = filler(flux_dataset(&FEATURE_GAPS), forest);
    filler.train_model().unwrap();
    let result = &filler.fill_gaps().unwrap().result;

    for (observed, flag) in result.observed().iter().zip(result.flags()) {
        let flag = flag.expect("every row is filled");
        assert!(flag.code() <= 2);
        assert_eq!(observed.is_some(), flag == Flag::Observed);
    }
}

#[rstest]
fn complete_data_is_unchanged(forest: ForestConfig) {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let timestamps = (0..40).map(|i| start + Duration::hours(i)).collect();
    let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
    let y: Vec<f64> = x.iter().map(|v| v * 0.5).collect();
    let ds = TimeSeriesDataset::new(timestamps, df! { "NEE" => y, "X" => x }.unwrap(), "NEE").unwrap();

    let mut filler = filler(ds, forest);
    filler.train_model().unwrap();
    let result = &filler.fill_gaps().unwrap().result;

    assert_eq!(result.gapfilled(), result.observed());
    assert!(result.flags().iter().all(|f| *f == Some(Flag::Observed)));
    assert!(result.fallback_predictions().is_none());
    assert!(result.to_frame().unwrap().column(PREDICTIONS_FALLBACK).is_err());
}

#[rstest]
fn index_is_preserved(forest: ForestConfig) {
    let ds = flux_dataset(&FEATURE_GAPS);
    let timestamps = ds.timestamps().to_vec();
    let mut filler = filler(ds, forest);
    filler.reduce_features().unwrap();
    assert_eq!(filler.dataset().timestamps(), timestamps.as_slice());

    filler.train_model().unwrap();
    let result = &filler.fill_gaps().unwrap().result;
    assert_eq!(result.timestamps(), timestamps.as_slice());
    assert_eq!(result.to_frame().unwrap().height(), timestamps.len());
}

#[rstest]
fn cumulative_is_consistent(forest: ForestConfig) {
    let mut filler = filler(flux_dataset(&FEATURE_GAPS), forest);
    filler.train_model().unwrap();
    let frame = filler.fill_gaps().unwrap().result.to_frame().unwrap();
    let result = filler.gapfilling_result().unwrap();

    let mut previous = 0.0;
    for (value, cumulative) in result.gapfilled().iter().zip(result.cumulative()) {
        let value = value.unwrap();
        let cumulative = cumulative.unwrap();
        approx::assert_relative_eq!(cumulative - previous, value, epsilon = 1e-9);
        previous = cumulative;
    }
    assert_eq!(frame.column(GAPFILLED_CUMULATIVE).unwrap().null_count(), 0);
}

#[rstest]
fn accepted_features_beat_the_control(forest: ForestConfig) {
    let mut filler = filler(flux_dataset(&[]), forest);
    let reduction = filler.reduce_features().unwrap();
    let threshold = reduction.threshold;

    assert!(reduction.rejected.contains(&RANDOM_FEATURE.to_string()));
    assert!(!reduction.accepted.contains(&RANDOM_FEATURE.to_string()));
    for name in &reduction.accepted {
        assert!(reduction.importances.importance(name).unwrap() > threshold);
    }
    for name in &reduction.rejected {
        assert!(reduction.importances.importance(name).unwrap() <= threshold);
    }

    // Working dataset is now the reduced snapshot
    assert_eq!(filler.dataset().feature_names(), filler.accepted_features().unwrap());
}

#[rstest]
fn reduction_is_reproducible(forest: ForestConfig) {
    let mut a = filler(flux_dataset(&[]), forest.clone());
    let mut b = filler(flux_dataset(&[]), forest);
    a.reduce_features().unwrap();
    b.reduce_features().unwrap();

    assert_eq!(a.feature_importances_reduction().unwrap(), b.feature_importances_reduction().unwrap());
    assert_eq!(a.accepted_features().unwrap(), b.accepted_features().unwrap());
    assert_eq!(a.rejected_features().unwrap(), b.rejected_features().unwrap());
}

#[rstest]
fn refilling_is_idempotent(forest: ForestConfig) {
    let mut filler = filler(flux_dataset(&FEATURE_GAPS), forest);
    filler.train_model().unwrap();
    let first = filler.fill_gaps().unwrap().result.clone();
    let second = filler.fill_gaps().unwrap().result.clone();
    assert_eq!(first, second);
}

#[rstest]
fn reduction_invalidates_model(forest: ForestConfig) {
    let mut filler = filler(flux_dataset(&[]), forest);
    filler.train_model().unwrap();
    filler.fill_gaps().unwrap();
    filler.reduce_features().unwrap();

    assert!(matches!(filler.model(), Err(PipelineError::NotReady(_))));
    assert!(matches!(filler.flag(), Err(PipelineError::NotReady(_))));
    assert!(filler.accepted_features().is_ok());
}

#[test]
fn lag_literal() {
    let start = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let timestamps = (0..4).map(|i| start + Duration::minutes(30 * i)).collect();
    let frame = df! {
        "NEE" => [1.0, 2.0, 3.0, 4.0],
        "TA" => [5.0, 6.0, 7.0, 8.0],
    }
    .unwrap();
    let ds = TimeSeriesDataset::new(timestamps, frame, "NEE").unwrap();

    let config = FeatureConfig { lags: vec![-1, 1], ..FeatureConfig::default() };
    let enriched = FeatureBuilder::with_config(config).build(&ds).unwrap();

    assert_eq!(enriched.column("TA-1").unwrap(), vec![None, Some(5.0), Some(6.0), Some(7.0)]);
    assert_eq!(enriched.column("TA+1").unwrap(), vec![Some(6.0), Some(7.0), Some(8.0), None]);
    assert_eq!(enriched.target().unwrap(), ds.target().unwrap());
}

#[rstest]
fn target_only_dataset_cannot_be_trained(forest: ForestConfig) {
    let ds = flux_dataset(&[]).select_features(&[]).unwrap();
    let mut filler = filler(ds, forest);
    assert!(matches!(filler.train_model(), Err(PipelineError::Configuration(_))));
}
