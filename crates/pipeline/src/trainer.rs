//! Model training with a held-out test set.

use gapfill_math::{permutation_importance, prediction_scores, train_test_split};
use gapfill_primitives::{ImportanceTable, PredictionScores, TimeSeriesDataset, Timestamp};
use gapfill_traits::Regressor;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{PipelineConfig, PipelineError};

/// Data of a train/test run, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTestDetails {
    /// Features the model was trained on, in column order.
    pub feature_names: Vec<String>,
    /// Target column.
    pub target_name: String,
    /// First timestamp with target and all features present.
    pub first_timestamp: Timestamp,
    /// Last timestamp with target and all features present.
    pub last_timestamp: Timestamp,
    /// Number of complete rows.
    pub n_observed: usize,
    /// Number of training rows.
    pub n_train: usize,
    /// Number of test rows.
    pub n_test: usize,
    /// Timestamps of the test rows.
    pub test_timestamps: Vec<Timestamp>,
    /// Observed test targets.
    pub test_targets: Vec<f64>,
    /// Model predictions for the test rows.
    pub test_predictions: Vec<f64>,
}

/// A fitted model with its test-set diagnostics.
#[derive(Debug, Clone)]
pub struct TrainedModel<M> {
    /// The fitted model.
    pub model: M,
    /// Scores on the test set.
    pub scores_test: PredictionScores,
    /// Permutation importances on the test set.
    pub importances_test: ImportanceTable,
    /// Train/test split details.
    pub details: TrainTestDetails,
}

impl<M> TrainedModel<M> {
    /// Features the model expects, in order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.details.feature_names
    }
}

/// Fits a model on a train split and evaluates it on the test split.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: PipelineConfig,
}

impl ModelTrainer {
    /// Create a trainer.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Train a model on every feature of `dataset`.
    ///
    /// # Arguments
    /// * `dataset` - Target and the final feature set
    /// * `model_config` - Configuration of the model to fit
    ///
    /// # Errors
    /// Returns `PipelineError::Configuration` if the dataset has only the
    /// target column or the configuration is invalid, before any fitting.
    pub fn train<M: Regressor>(
        &self,
        dataset: &TimeSeriesDataset,
        model_config: &M::Config,
    ) -> Result<TrainedModel<M>, PipelineError> {
        if dataset.n_columns() < 2 {
            return Err(PipelineError::Configuration(format!(
                "dataset has only the target column {}; at least one feature is required",
                dataset.target_name()
            )));
        }
        self.config.validate()?;

        let feature_names = dataset.feature_names();
        let arrays = dataset.complete_cases()?;
        let seed = self.config.random_state;
        let split = train_test_split(&arrays.features, &arrays.target, self.config.test_size, seed)?;

        let mut model = M::with_config(model_config.clone());
        model.fit(&split.x_train, &split.y_train)?;

        let predictions = model.predict(&split.x_test)?;
        let scores_test = prediction_scores(&split.y_test, &predictions)?;
        let importances_test = permutation_importance(
            &model,
            &split.x_test,
            &split.y_test,
            &feature_names,
            self.config.perm_n_repeats,
            seed,
        )?;

        let timestamps = dataset.timestamps();
        let (Some(&first), Some(&last)) = (arrays.rows.first(), arrays.rows.last()) else {
            return Err(PipelineError::Configuration("no complete rows to train on".to_string()));
        };
        let details = TrainTestDetails {
            feature_names,
            target_name: dataset.target_name().to_string(),
            first_timestamp: timestamps[first],
            last_timestamp: timestamps[last],
            n_observed: arrays.n_rows(),
            n_train: split.y_train.len(),
            n_test: split.y_test.len(),
            test_timestamps: split.test_rows.iter().map(|&i| timestamps[arrays.rows[i]]).collect(),
            test_targets: split.y_test.to_vec(),
            test_predictions: predictions.to_vec(),
        };

        debug!(
            train = details.n_train,
            test = details.n_test,
            features = details.feature_names.len(),
            "trained model on train split"
        );
        info!(
            model = model.name(),
            r2 = scores_test.r2,
            rmse = scores_test.rmse,
            "model trained and tested"
        );

        Ok(TrainedModel { model, scores_test, importances_test, details })
    }
}
