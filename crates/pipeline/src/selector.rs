//! Feature reduction against a random control feature.

use gapfill_features::{RANDOM_FEATURE, RandomControl};
use gapfill_math::{permutation_importance, train_test_split};
use gapfill_primitives::{ImportanceTable, TimeSeriesDataset};
use gapfill_traits::{FeatureTransform, Regressor};
use tracing::{debug, info, warn};

use crate::{PipelineConfig, PipelineError, TiePolicy};

/// Outcome of a feature reduction.
#[derive(Debug, Clone)]
pub struct FeatureReduction {
    /// Permutation importances of every candidate and the control feature.
    pub importances: ImportanceTable,
    /// Features more important than the control, most important first.
    pub accepted: Vec<String>,
    /// All other candidates and the control feature, most important first.
    pub rejected: Vec<String>,
    /// Mean importance of the control feature.
    pub threshold: f64,
    /// Name of the control feature.
    pub random_feature: String,
    /// Input dataset restricted to the target and the accepted features.
    pub reduced: TimeSeriesDataset,
}

impl FeatureReduction {
    /// Whether no feature was accepted.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Fail if no feature was accepted.
    ///
    /// # Errors
    /// Returns `PipelineError::DegenerateSelection` for a degenerate reduction.
    pub fn ensure_nondegenerate(&self) -> Result<&Self, PipelineError> {
        if self.is_degenerate() {
            return Err(PipelineError::DegenerateSelection {
                random_feature: self.random_feature.clone(),
                threshold: self.threshold,
            });
        }
        Ok(self)
    }
}

/// Selects features whose permutation importance beats a random control.
#[derive(Debug, Clone, Default)]
pub struct FeatureSelector {
    config: PipelineConfig,
}

impl FeatureSelector {
    /// Create a selector.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run feature reduction.
    ///
    /// A control column of seeded standard-normal noise is added to the
    /// candidates. A fresh model is fitted on the training part of the
    /// complete rows, and permutation importance is measured on the test
    /// part. Candidates more important than the control are accepted.
    ///
    /// # Arguments
    /// * `dataset` - Target and candidate features
    /// * `model_config` - Configuration of the model to fit
    ///
    /// # Errors
    /// Returns `PipelineError::Configuration` for an invalid configuration or
    /// a dataset without features; fitting and scoring errors are propagated.
    pub fn select<M: Regressor>(
        &self,
        dataset: &TimeSeriesDataset,
        model_config: &M::Config,
    ) -> Result<FeatureReduction, PipelineError> {
        self.config.validate()?;
        if dataset.feature_names().is_empty() {
            return Err(PipelineError::Configuration(
                "feature reduction needs at least one feature".to_string(),
            ));
        }

        let seed = self.config.random_state;
        let candidates = RandomControl::new(seed).apply(dataset)?;
        let names = candidates.feature_names();
        let arrays = candidates.complete_cases()?;
        let split = train_test_split(&arrays.features, &arrays.target, self.config.test_size, seed)?;
        debug!(
            candidates = names.len(),
            complete_rows = arrays.n_rows(),
            train = split.y_train.len(),
            test = split.y_test.len(),
            "feature reduction split"
        );

        let mut model = M::with_config(model_config.clone());
        model.fit(&split.x_train, &split.y_train)?;

        let importances = permutation_importance(
            &model,
            &split.x_test,
            &split.y_test,
            &names,
            self.config.perm_n_repeats,
            seed,
        )?;
        let threshold = importances
            .importance(RANDOM_FEATURE)
            .ok_or_else(|| {
                PipelineError::Configuration(format!("{RANDOM_FEATURE} missing from importances"))
            })?;

        let (accepted, rejected): (Vec<_>, Vec<_>) = importances
            .iter()
            .map(|entry| {
                debug!(feature = %entry.feature, mean = entry.mean, std = entry.std, "importance");
                let keep = entry.feature != RANDOM_FEATURE
                    && match self.config.tie_policy {
                        TiePolicy::Reject => entry.mean > threshold,
                        TiePolicy::Accept => entry.mean >= threshold,
                    };
                (entry.feature.clone(), keep)
            })
            .partition(|(_, keep)| *keep);
        let accepted: Vec<String> = accepted.into_iter().map(|(name, _)| name).collect();
        let rejected: Vec<String> = rejected.into_iter().map(|(name, _)| name).collect();

        let reduced = dataset.select_features(&accepted)?;

        info!(
            model = model.name(),
            threshold,
            accepted = accepted.len(),
            rejected = rejected.len(),
            "feature reduction finished"
        );
        if accepted.is_empty() {
            warn!(threshold, "no feature is more important than {RANDOM_FEATURE}");
        }

        Ok(FeatureReduction {
            importances,
            accepted,
            rejected,
            threshold,
            random_feature: RANDOM_FEATURE.to_string(),
            reduced,
        })
    }
}
