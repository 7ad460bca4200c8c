//! Stateful facade running the pipeline stages in order.

use std::fmt;

use gapfill_features::FeatureBuilder;
use gapfill_primitives::{Flag, ImportanceTable, PredictionScores, TimeSeriesDataset};
use gapfill_traits::Regressor;
use tracing::info;

use crate::{
    FeatureReduction, FeatureSelector, GapFillOutcome, GapFillResult, GapFiller, ModelTrainer,
    PipelineConfig, PipelineError, TrainTestDetails, TrainedModel,
};

/// Gap filler for one dataset and one model type.
///
/// Stage calls return their artifact and keep it for the accessors below.
/// Accessors fail with `PipelineError::NotReady` until the stage producing
/// their artifact has run.
///
/// ```rust,ignore
/// let mut filler = TimeSeriesGapFiller::<RandomForestRegressor>::new(
///     dataset,
///     ForestConfig::default(),
///     PipelineConfig::default(),
/// )?;
/// filler.reduce_features()?;
/// filler.train_model()?;
/// filler.fill_gaps()?;
/// let filled = filler.gapfilled_target()?;
/// ```
pub struct TimeSeriesGapFiller<M: Regressor> {
    dataset: TimeSeriesDataset,
    model_config: M::Config,
    config: PipelineConfig,
    reduction: Option<FeatureReduction>,
    trained: Option<TrainedModel<M>>,
    filled: Option<GapFillOutcome>,
}

impl<M: Regressor> fmt::Debug for TimeSeriesGapFiller<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeSeriesGapFiller")
            .field("target", &self.dataset.target_name())
            .field("features", &self.dataset.feature_names())
            .field("rows", &self.dataset.len())
            .field("config", &self.config)
            .field("reduced", &self.reduction.is_some())
            .field("trained", &self.trained.is_some())
            .field("filled", &self.filled.is_some())
            .finish()
    }
}

impl<M: Regressor> TimeSeriesGapFiller<M> {
    /// Create a gap filler.
    ///
    /// # Arguments
    /// * `dataset` - Target and features, indexed by timestamp
    /// * `model_config` - Configuration of the primary and fallback models
    /// * `config` - Pipeline configuration
    ///
    /// # Errors
    /// Returns `PipelineError::Configuration` for an invalid configuration.
    pub fn new(
        dataset: TimeSeriesDataset,
        model_config: M::Config,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { dataset, model_config, config, reduction: None, trained: None, filled: None })
    }

    /// Create a gap filler on the dataset enriched by `features`.
    ///
    /// # Errors
    /// Returns an error if feature construction fails or the configuration
    /// is invalid.
    pub fn with_features(
        dataset: &TimeSeriesDataset,
        features: &FeatureBuilder,
        model_config: M::Config,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        let enriched = features.build(dataset)?;
        Self::new(enriched, model_config, config)
    }

    /// Current working dataset.
    #[must_use]
    pub const fn dataset(&self) -> &TimeSeriesDataset {
        &self.dataset
    }

    /// Pipeline configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Model configuration.
    #[must_use]
    pub const fn model_config(&self) -> &M::Config {
        &self.model_config
    }

    /// Reduce the features of the working dataset.
    ///
    /// The working dataset is replaced by the reduced snapshot, and a
    /// previously trained model and fill result are discarded. A reduction
    /// that accepts no feature is kept; training on it then fails.
    ///
    /// # Errors
    /// Returns an error if the selection cannot be run.
    pub fn reduce_features(&mut self) -> Result<&FeatureReduction, PipelineError> {
        let reduction =
            FeatureSelector::new(self.config.clone()).select::<M>(&self.dataset, &self.model_config)?;
        self.dataset = reduction.reduced.clone();
        self.trained = None;
        self.filled = None;
        Ok(self.reduction.insert(reduction))
    }

    /// Train the model on every feature of the working dataset.
    ///
    /// A previous fill result is discarded.
    ///
    /// # Errors
    /// Returns `PipelineError::Configuration` for a target-only dataset;
    /// fitting errors are propagated.
    pub fn train_model(&mut self) -> Result<&TrainedModel<M>, PipelineError> {
        let trained = ModelTrainer::new(self.config.clone()).train::<M>(&self.dataset, &self.model_config)?;
        self.filled = None;
        Ok(self.trained.insert(trained))
    }

    /// Fill the gaps of the target with the trained model.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` if no model has been trained.
    pub fn fill_gaps(&mut self) -> Result<&GapFillOutcome, PipelineError> {
        let trained = ready(self.trained.as_ref(), "model")?;
        let outcome = GapFiller::new(self.config.clone()).fill(
            &self.dataset,
            &trained.model,
            trained.feature_names(),
        )?;
        info!(series = %self.dataset.target_name(), stage = %outcome.result.stage(), "gaps filled");
        Ok(self.filled.insert(outcome))
    }

    /// Fitted primary model.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `train_model`.
    pub fn model(&self) -> Result<&M, PipelineError> {
        ready(self.trained.as_ref(), "model").map(|t| &t.model)
    }

    /// Permutation importances of the model on every complete row, absent
    /// if the dataset has no complete row.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `fill_gaps`.
    pub fn feature_importances(&self) -> Result<Option<&ImportanceTable>, PipelineError> {
        ready(self.filled.as_ref(), "feature importances").map(|o| o.importances.as_ref())
    }

    /// Permutation importances of the model on the test split.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `train_model`.
    pub fn feature_importances_traintest(&self) -> Result<&ImportanceTable, PipelineError> {
        ready(self.trained.as_ref(), "train/test feature importances").map(|t| &t.importances_test)
    }

    /// Permutation importances of the feature reduction.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `reduce_features`.
    pub fn feature_importances_reduction(&self) -> Result<&ImportanceTable, PipelineError> {
        ready(self.reduction.as_ref(), "feature reduction importances").map(|r| &r.importances)
    }

    /// Scores of the model on every complete row, absent if the dataset has
    /// no complete row.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `fill_gaps`.
    pub fn scores(&self) -> Result<Option<&PredictionScores>, PipelineError> {
        ready(self.filled.as_ref(), "scores").map(|o| o.scores.as_ref())
    }

    /// Scores of the model on the test split.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `train_model`.
    pub fn scores_test(&self) -> Result<&PredictionScores, PipelineError> {
        ready(self.trained.as_ref(), "test scores").map(|t| &t.scores_test)
    }

    /// Gap-filling result.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `fill_gaps`.
    pub fn gapfilling_result(&self) -> Result<&GapFillResult, PipelineError> {
        ready(self.filled.as_ref(), "gap-filling result").map(|o| &o.result)
    }

    /// Train/test split details.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `train_model`.
    pub fn traintest_details(&self) -> Result<&TrainTestDetails, PipelineError> {
        ready(self.trained.as_ref(), "train/test details").map(|t| &t.details)
    }

    /// Features accepted by the reduction (possibly empty).
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `reduce_features`.
    pub fn accepted_features(&self) -> Result<&[String], PipelineError> {
        ready(self.reduction.as_ref(), "accepted features").map(|r| r.accepted.as_slice())
    }

    /// Features rejected by the reduction, including the control feature.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `reduce_features`.
    pub fn rejected_features(&self) -> Result<&[String], PipelineError> {
        ready(self.reduction.as_ref(), "rejected features").map(|r| r.rejected.as_slice())
    }

    /// Gap-filled target aligned with the dataset index.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `fill_gaps`.
    pub fn gapfilled_target(&self) -> Result<&[Option<f64>], PipelineError> {
        self.gapfilling_result().map(GapFillResult::gapfilled)
    }

    /// Provenance flags aligned with the dataset index.
    ///
    /// # Errors
    /// Returns `PipelineError::NotReady` before `fill_gaps`.
    pub fn flag(&self) -> Result<&[Option<Flag>], PipelineError> {
        self.gapfilling_result().map(GapFillResult::flags)
    }
}

fn ready<'a, T>(artifact: Option<&'a T>, name: &'static str) -> Result<&'a T, PipelineError> {
    artifact.ok_or(PipelineError::NotReady(name))
}
