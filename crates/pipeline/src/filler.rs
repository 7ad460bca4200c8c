//! Gap filling with a full model and a timestamp-only fallback model.

use std::sync::Arc;

use gapfill_features::TimestampFeatures;
use gapfill_math::{permutation_importance, prediction_scores};
use gapfill_primitives::{
    DatasetError, FillStage, Flag, ImportanceTable, PredictionScores, TimeSeriesDataset, Timestamp,
};
use gapfill_traits::{FeatureTransform, Regressor};
use gapfill_utils::{count_missing, cumulative_sum, fill_missing, float_column, int_column};
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::{PipelineConfig, PipelineError};

/// Timestamp index of the exported frame.
pub const TIMESTAMP: &str = "TIMESTAMP";
/// Full-model predictions for every row with all features present.
pub const PREDICTIONS_FULLMODEL: &str = ".PREDICTIONS_FULLMODEL";
/// Full-model predictions where the target is missing.
pub const GAP_PREDICTIONS: &str = ".GAP_PREDICTIONS";
/// Fallback-model predictions for every row.
pub const PREDICTIONS_FALLBACK: &str = ".PREDICTIONS_FALLBACK";
/// Full-model prediction, else fallback prediction.
pub const PREDICTIONS: &str = ".PREDICTIONS";
/// Running total of the gap-filled target.
pub const GAPFILLED_CUMULATIVE: &str = ".GAPFILLED_CUMULATIVE";

/// Gap-filled series with per-row provenance.
///
/// All vectors are aligned with the timestamp index of the input dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GapFillResult {
    timestamps: Arc<[Timestamp]>,
    target_name: String,
    observed: Vec<Option<f64>>,
    full_model_predictions: Vec<Option<f64>>,
    gap_predictions: Vec<Option<f64>>,
    fallback_predictions: Option<Vec<f64>>,
    fallback_features: Vec<String>,
    predictions: Vec<Option<f64>>,
    gapfilled: Vec<Option<f64>>,
    flags: Vec<Option<Flag>>,
    cumulative: Vec<Option<f64>>,
    stage: FillStage,
}

impl GapFillResult {
    /// Start from the observed target of a dataset.
    ///
    /// # Errors
    /// Returns an error if the target cannot be read.
    pub fn new(dataset: &TimeSeriesDataset) -> Result<Self, PipelineError> {
        let observed = dataset.target()?;
        let n = observed.len();
        let flags = observed.iter().map(|v| v.map(|_| Flag::Observed)).collect();
        Ok(Self {
            timestamps: dataset.shared_timestamps(),
            target_name: dataset.target_name().to_string(),
            gapfilled: observed.clone(),
            observed,
            full_model_predictions: vec![None; n],
            gap_predictions: vec![None; n],
            fallback_predictions: None,
            fallback_features: Vec::new(),
            predictions: vec![None; n],
            flags,
            cumulative: vec![None; n],
            stage: FillStage::Unfilled,
        })
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

    /// Name of the target column.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Observed target.
    #[must_use]
    pub fn observed(&self) -> &[Option<f64>] {
        &self.observed
    }

    /// Full-model predictions (missing where a feature is missing).
    #[must_use]
    pub fn full_model_predictions(&self) -> &[Option<f64>] {
        &self.full_model_predictions
    }

    /// Full-model predictions restricted to rows with a missing target.
    #[must_use]
    pub fn gap_predictions(&self) -> &[Option<f64>] {
        &self.gap_predictions
    }

    /// Fallback predictions, absent if the fallback model was not needed.
    #[must_use]
    pub fn fallback_predictions(&self) -> Option<&[f64]> {
        self.fallback_predictions.as_deref()
    }

    /// Features of the fallback model (empty if it was not needed).
    #[must_use]
    pub fn fallback_features(&self) -> &[String] {
        &self.fallback_features
    }

    /// Full-model prediction where available, else fallback prediction.
    #[must_use]
    pub fn predictions(&self) -> &[Option<f64>] {
        &self.predictions
    }

    /// Observed target with gaps filled.
    #[must_use]
    pub fn gapfilled(&self) -> &[Option<f64>] {
        &self.gapfilled
    }

    /// Provenance flags (absent for rows that could not be filled).
    #[must_use]
    pub fn flags(&self) -> &[Option<Flag>] {
        &self.flags
    }

    /// Running total of the gap-filled target.
    #[must_use]
    pub fn cumulative(&self) -> &[Option<f64>] {
        &self.cumulative
    }

    /// Stage reached.
    #[must_use]
    pub const fn stage(&self) -> FillStage {
        self.stage
    }

    /// Number of rows carrying `flag`.
    #[must_use]
    pub fn count_flag(&self, flag: Flag) -> usize {
        self.flags.iter().filter(|f| **f == Some(flag)).count()
    }

    /// Number of rows still missing.
    #[must_use]
    pub fn n_unfilled(&self) -> usize {
        count_missing(&self.gapfilled)
    }

    /// Name of the gap-filled target column.
    #[must_use]
    pub fn gapfilled_name(&self) -> String {
        format!("{}_gfML", self.target_name)
    }

    /// Name of the flag column.
    #[must_use]
    pub fn flag_name(&self) -> String {
        format!("FLAG_{}_gfML_ISFILLED", self.target_name)
    }

    /// Export as a frame with the timestamp index as its first column.
    ///
    /// The fallback column is present only if the fallback model ran.
    ///
    /// # Errors
    /// Returns a polars error if the frame cannot be assembled.
    pub fn to_frame(&self) -> Result<DataFrame, PipelineError> {
        let mut columns = vec![
            Column::new(TIMESTAMP.into(), self.timestamps.to_vec()),
            float_column(&self.target_name, self.observed.clone()),
            float_column(PREDICTIONS_FULLMODEL, self.full_model_predictions.clone()),
            float_column(GAP_PREDICTIONS, self.gap_predictions.clone()),
        ];
        if let Some(fallback) = &self.fallback_predictions {
            columns.push(float_column(PREDICTIONS_FALLBACK, fallback.iter().copied().map(Some).collect()));
        }
        columns.extend([
            float_column(PREDICTIONS, self.predictions.clone()),
            float_column(&self.gapfilled_name(), self.gapfilled.clone()),
            int_column(
                &self.flag_name(),
                self.flags.iter().map(|f| f.map(|f| i32::from(f.code()))).collect(),
            ),
            float_column(GAPFILLED_CUMULATIVE, self.cumulative.clone()),
        ]);
        Ok(DataFrame::new(columns)?)
    }

    fn expect_stage(&self, expected: FillStage) -> Result<(), PipelineError> {
        if self.stage != expected {
            return Err(PipelineError::InvalidStage { expected, actual: self.stage });
        }
        Ok(())
    }
}

/// Gap-filling result with full-set diagnostics of the model.
///
/// Diagnostics are absent when no row has the target and every feature.
#[derive(Debug, Clone)]
pub struct GapFillOutcome {
    /// Combined gap-filling result.
    pub result: GapFillResult,
    /// Scores of the model on every complete row.
    pub scores: Option<PredictionScores>,
    /// Permutation importances on every complete row.
    pub importances: Option<ImportanceTable>,
}

/// Fills gaps in the target of a dataset with a fitted model.
#[derive(Debug, Clone, Default)]
pub struct GapFiller {
    config: PipelineConfig,
}

impl GapFiller {
    /// Create a gap filler.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run all stages: full model, fallback model, combination.
    ///
    /// # Arguments
    /// * `dataset` - Target and the features the model was trained on
    /// * `model` - Fitted model
    /// * `trained_features` - Feature names the model was trained on
    ///
    /// # Errors
    /// Returns `PipelineError::FeatureMismatch` if the dataset features differ
    /// from `trained_features`; model and scoring errors are propagated.
    pub fn fill<M: Regressor>(
        &self,
        dataset: &TimeSeriesDataset,
        model: &M,
        trained_features: &[String],
    ) -> Result<GapFillOutcome, PipelineError> {
        let features = dataset.feature_names();
        if features != trained_features {
            return Err(PipelineError::FeatureMismatch {
                expected: trained_features.to_vec(),
                actual: features,
            });
        }

        let diagnostics = self.full_set_diagnostics(dataset, model)?;
        if diagnostics.is_none() {
            warn!("no complete rows, skipping full-set scores and importances");
        }
        let (scores, importances) = diagnostics.unzip();

        let result = GapFillResult::new(dataset)?;
        let result = Self::fill_full_model(result, dataset, model)?;
        let result = Self::fill_fallback::<M>(result, model.config())?;
        let result = Self::combine(result)?;

        let unfilled = result.n_unfilled();
        info!(
            observed = result.count_flag(Flag::Observed),
            full_model = result.count_flag(Flag::FullModel),
            fallback = result.count_flag(Flag::Fallback),
            unfilled,
            r2 = scores.as_ref().map(|s| s.r2),
            "gap filling finished"
        );
        if unfilled > 0 {
            warn!(unfilled, "rows could not be filled and stay missing");
        }

        Ok(GapFillOutcome { result, scores, importances })
    }

    /// Scores and permutation importances of `model` on every row where
    /// target and all features are present (no split).
    ///
    /// Returns `None` if there is no such row.
    ///
    /// # Errors
    /// Returns an error if prediction or scoring fails.
    pub fn full_set_diagnostics<M: Regressor>(
        &self,
        dataset: &TimeSeriesDataset,
        model: &M,
    ) -> Result<Option<(PredictionScores, ImportanceTable)>, PipelineError> {
        let arrays = dataset.complete_cases()?;
        if arrays.n_rows() == 0 {
            return Ok(None);
        }
        let predictions = model.predict(&arrays.features)?;
        let scores = prediction_scores(&arrays.target, &predictions)?;
        let importances = permutation_importance(
            model,
            &arrays.features,
            &arrays.target,
            &dataset.feature_names(),
            self.config.perm_n_repeats,
            self.config.random_state,
        )?;
        Ok(Some((scores, importances)))
    }

    /// Predict every row with all features present and fill missing targets
    /// there (flag 1). Observed rows get flag 0.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidStage` unless `result` is unfilled, or a
    /// dataset error if `dataset` has a different length.
    pub fn fill_full_model<M: Regressor>(
        mut result: GapFillResult,
        dataset: &TimeSeriesDataset,
        model: &M,
    ) -> Result<GapFillResult, PipelineError> {
        result.expect_stage(FillStage::Unfilled)?;
        if dataset.len() != result.len() {
            return Err(DatasetError::LengthMismatch { expected: result.len(), actual: dataset.len() }.into());
        }

        let arrays = dataset.feature_complete_rows()?;
        if arrays.n_rows() > 0 {
            let predictions = model.predict(&arrays.features)?;
            for (&row, &value) in arrays.rows.iter().zip(predictions.iter()) {
                result.full_model_predictions[row] = Some(value);
            }
        }

        for i in 0..result.len() {
            if result.observed[i].is_some() {
                continue;
            }
            if let Some(value) = result.full_model_predictions[i] {
                result.gap_predictions[i] = Some(value);
                result.gapfilled[i] = Some(value);
                result.flags[i] = Some(Flag::FullModel);
            }
        }

        debug!(
            predicted = arrays.n_rows(),
            filled = result.count_flag(Flag::FullModel),
            remaining = result.n_unfilled(),
            "full model fill"
        );
        result.stage = FillStage::FullModelFilled;
        Ok(result)
    }

    /// Fill the rows still missing with a model trained on timestamp
    /// features only (flag 2).
    ///
    /// The fallback model is a fresh `M` built from `model_config` and fitted
    /// on the partially filled target. If nothing is missing this is a no-op
    /// and no fallback predictions are recorded.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidStage` unless the full model has run;
    /// fitting errors are propagated.
    pub fn fill_fallback<M: Regressor>(
        mut result: GapFillResult,
        model_config: &M::Config,
    ) -> Result<GapFillResult, PipelineError> {
        result.expect_stage(FillStage::FullModelFilled)?;
        result.stage = FillStage::FallbackFilled;

        let remaining = result.n_unfilled();
        if remaining == 0 {
            debug!("no gaps left for the fallback model");
            return Ok(result);
        }

        let frame = DataFrame::new(vec![float_column(&result.target_name, result.gapfilled.clone())])?;
        let base = TimeSeriesDataset::new(result.timestamps.to_vec(), frame, result.target_name.clone())?;
        let fallback_data = TimestampFeatures::new().apply(&base)?;

        let train = fallback_data.complete_cases()?;
        if train.n_rows() == 0 {
            warn!(remaining, "no values to train the fallback model on");
            return Ok(result);
        }

        let mut model = M::with_config(model_config.clone());
        model.fit(&train.features, &train.target)?;

        // Timestamp features are never missing, so this covers every row
        let all_rows = fallback_data.feature_complete_rows()?;
        let predictions = model.predict(&all_rows.features)?.to_vec();

        for (i, &value) in predictions.iter().enumerate() {
            if result.gapfilled[i].is_none() {
                result.gapfilled[i] = Some(value);
                result.flags[i] = Some(Flag::Fallback);
            }
        }
        result.fallback_features = fallback_data.feature_names();
        result.fallback_predictions = Some(predictions);

        debug!(
            trained_on = train.n_rows(),
            filled = result.count_flag(Flag::Fallback),
            "fallback fill"
        );
        Ok(result)
    }

    /// Combine predictions and accumulate the gap-filled series.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidStage` unless the fallback stage has run.
    pub fn combine(mut result: GapFillResult) -> Result<GapFillResult, PipelineError> {
        result.expect_stage(FillStage::FallbackFilled)?;

        let fallback: Vec<Option<f64>> = result.fallback_predictions.as_ref().map_or_else(
            || vec![None; result.len()],
            |fallback| fallback.iter().copied().map(Some).collect(),
        );
        result.predictions = fill_missing(&result.full_model_predictions, &fallback)?;
        result.cumulative = cumulative_sum(&result.gapfilled);
        result.stage = FillStage::Combined;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use gapfill_model::{LinearConfig, LinearRegressor};
    use rstest::rstest;

    use super::*;

    const N: usize = 48;

    /// NEE = 2 * TA + 1, with gaps in NEE and TA.
    fn dataset(nee_gaps: &[usize], ta_gaps: &[usize]) -> TimeSeriesDataset {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let timestamps = (0..N).map(|i| start + chrono::Duration::hours(i as i64)).collect();
        let ta: Vec<Option<f64>> = (0..N)
            .map(|i| (!ta_gaps.contains(&i)).then(|| 10.0 + (i as f64 / 3.0).sin() * 5.0))
            .collect();
        let nee: Vec<Option<f64>> = (0..N)
            .map(|i| {
                let value = 2.0 * (10.0 + (i as f64 / 3.0).sin() * 5.0) + 1.0;
                (!nee_gaps.contains(&i)).then_some(value)
            })
            .collect();
        let frame = df! { "NEE" => nee, "TA" => ta }.unwrap();
        TimeSeriesDataset::new(timestamps, frame, "NEE").unwrap()
    }

    fn fitted(ds: &TimeSeriesDataset) -> LinearRegressor {
        let arrays = ds.complete_cases().unwrap();
        let mut model = LinearRegressor::with_config(LinearConfig::default());
        model.fit(&arrays.features, &arrays.target).unwrap();
        model
    }

    #[test]
    fn full_model_fills_gaps_with_features() {
        let ds = dataset(&[3, 10, 20], &[]);
        let model = fitted(&ds);
        let outcome = GapFiller::default().fill(&ds, &model, &ds.feature_names()).unwrap();
        let result = &outcome.result;

        assert_eq!(result.stage(), FillStage::Combined);
        assert_eq!(result.count_flag(Flag::FullModel), 3);
        assert_eq!(result.count_flag(Flag::Fallback), 0);
        assert_eq!(result.count_flag(Flag::Observed), N - 3);
        assert!(result.fallback_predictions().is_none());
        assert!(result.fallback_features().is_empty());

        let expected = 2.0 * (10.0 + (10.0f64 / 3.0).sin() * 5.0) + 1.0;
        approx::assert_relative_eq!(result.gapfilled()[10].unwrap(), expected, epsilon = 1e-4);
        assert_eq!(result.gap_predictions()[10], result.full_model_predictions()[10]);
        assert_eq!(result.gap_predictions()[11], None);
        assert!(outcome.scores.as_ref().unwrap().r2 > 0.999);
    }

    #[test]
    fn fallback_fills_rows_without_features() {
        let ds = dataset(&[3, 10, 20], &[10, 30]);
        let model = fitted(&ds);
        let result = GapFiller::default().fill(&ds, &model, &ds.feature_names()).unwrap().result;

        assert_eq!(result.flags()[3], Some(Flag::FullModel));
        assert_eq!(result.flags()[10], Some(Flag::Fallback));
        // TA missing but NEE observed: observed value kept
        assert_eq!(result.flags()[30], Some(Flag::Observed));
        assert_eq!(result.gapfilled()[30], result.observed()[30]);
        assert_eq!(result.full_model_predictions()[10], None);

        assert_eq!(result.fallback_features(), TimestampFeatures::column_names().as_slice());
        let fallback = result.fallback_predictions().unwrap();
        assert_eq!(fallback.len(), N);
        assert_eq!(result.gapfilled()[10], Some(fallback[10]));
        // Combined predictions prefer the full model
        assert_eq!(result.predictions()[3], result.full_model_predictions()[3]);
        assert_eq!(result.predictions()[10], Some(fallback[10]));
        assert_eq!(result.n_unfilled(), 0);
    }

    #[test]
    fn complete_data_is_a_no_op() {
        let ds = dataset(&[], &[]);
        let model = fitted(&ds);
        let result = GapFiller::default().fill(&ds, &model, &ds.feature_names()).unwrap().result;

        assert_eq!(result.gapfilled(), result.observed());
        assert!(result.flags().iter().all(|f| *f == Some(Flag::Observed)));
        assert!(result.fallback_predictions().is_none());
        assert!(result.gap_predictions().iter().all(Option::is_none));
    }

    #[test]
    fn cumulative_tracks_gapfilled() {
        let ds = dataset(&[0, 5, 6], &[5]);
        let model = fitted(&ds);
        let result = GapFiller::default().fill(&ds, &model, &ds.feature_names()).unwrap().result;

        let mut total = 0.0;
        for (value, cum) in result.gapfilled().iter().zip(result.cumulative()) {
            match value {
                Some(v) => {
                    total += v;
                    approx::assert_relative_eq!(cum.unwrap(), total, epsilon = 1e-9);
                }
                None => assert!(cum.is_none()),
            }
        }
    }

    #[test]
    fn rows_without_any_information_stay_unfilled() {
        let model = fitted(&dataset(&[], &[]));
        let all: Vec<usize> = (0..N).collect();
        let ds = dataset(&all, &all);
        let outcome = GapFiller::default().fill(&ds, &model, &ds.feature_names()).unwrap();
        let result = &outcome.result;

        assert!(outcome.scores.is_none());
        assert!(outcome.importances.is_none());
        assert_eq!(result.stage(), FillStage::Combined);
        assert_eq!(result.len(), N);
        assert!(result.flags().iter().all(Option::is_none));
        assert!(result.gapfilled().iter().all(Option::is_none));
        assert!(result.cumulative().iter().all(Option::is_none));
        assert!(result.fallback_predictions().is_none());
        assert_eq!(result.n_unfilled(), N);
        assert_eq!(result.to_frame().unwrap().height(), N);
    }

    #[test]
    fn missing_target_is_filled_without_diagnostics() {
        let model = fitted(&dataset(&[], &[]));
        let all: Vec<usize> = (0..N).collect();
        let ds = dataset(&all, &[]);
        let outcome = GapFiller::default().fill(&ds, &model, &ds.feature_names()).unwrap();

        assert!(outcome.scores.is_none());
        assert_eq!(outcome.result.count_flag(Flag::FullModel), N);
        assert_eq!(outcome.result.n_unfilled(), 0);
    }

    #[test]
    fn feature_mismatch_is_reported() {
        let ds = dataset(&[3], &[]);
        let model = fitted(&ds);
        let err = GapFiller::default().fill(&ds, &model, &["SW_IN".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::FeatureMismatch { .. }));
    }

    #[rstest]
    #[case(FillStage::Unfilled)]
    #[case(FillStage::FullModelFilled)]
    fn transitions_enforce_order(#[case] stage: FillStage) {
        let ds = dataset(&[3], &[]);
        let mut result = GapFillResult::new(&ds).unwrap();
        result.stage = stage;
        let err = GapFiller::combine(result).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidStage { expected: FillStage::FallbackFilled, actual } if actual == stage
        ));
    }

    #[test]
    fn fill_is_idempotent() {
        let ds = dataset(&[3, 10], &[10]);
        let model = fitted(&ds);
        let filler = GapFiller::default();
        let a = filler.fill(&ds, &model, &ds.feature_names()).unwrap();
        let b = filler.fill(&ds, &model, &ds.feature_names()).unwrap();
        assert_eq!(a.result, b.result);
        assert_eq!(a.importances, b.importances);
    }

    #[test]
    fn frame_export() {
        let ds = dataset(&[3, 10], &[10]);
        let model = fitted(&ds);
        let result = GapFiller::default().fill(&ds, &model, &ds.feature_names()).unwrap().result;
        let frame = result.to_frame().unwrap();

        assert_eq!(frame.height(), N);
        let names: Vec<String> = frame.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            [
                TIMESTAMP,
                "NEE",
                PREDICTIONS_FULLMODEL,
                GAP_PREDICTIONS,
                PREDICTIONS_FALLBACK,
                PREDICTIONS,
                "NEE_gfML",
                "FLAG_NEE_gfML_ISFILLED",
                GAPFILLED_CUMULATIVE,
            ]
            .map(String::from)
        );
        let index = frame.column(TIMESTAMP).unwrap();
        assert!(matches!(index.dtype(), DataType::Datetime(_, _)));
        assert_eq!(index.null_count(), 0);
    }
}
