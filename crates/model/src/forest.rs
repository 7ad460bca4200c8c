//! Random forest regression.

use gapfill_traits::{Regressor, RegressorError};
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{ModelError, RegressionTree, TreeConfig};

/// Number of features drawn at each split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum MaxFeatures {
    /// All features.
    #[default]
    All,
    /// Square root of the feature count.
    Sqrt,
    /// Base-2 logarithm of the feature count.
    Log2,
    /// Fraction of the feature count.
    Fraction(f64),
    /// Fixed number of features.
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolve to a feature count for `n_features` columns (at least 1).
    #[must_use]
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            Self::All => n_features,
            Self::Sqrt => n.sqrt().ceil() as usize,
            Self::Log2 => n.log2().ceil() as usize,
            Self::Fraction(f) => (n * f).ceil() as usize,
            Self::Fixed(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Configuration for [`RandomForestRegressor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_estimators: usize,
    /// Maximum depth per tree (None for unlimited).
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples in each leaf.
    pub min_samples_leaf: usize,
    /// Features drawn at each split.
    pub max_features: MaxFeatures,
    /// Whether each tree is grown on a bootstrap sample.
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `random_state + i`.
    pub random_state: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
            bootstrap: true,
            random_state: 42,
        }
    }
}

impl ForestConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidParameter` for out-of-range values.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::invalid("n_estimators", "must be >= 1"));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ModelError::invalid("max_features", format!("fraction must be in (0, 1], got {f}")));
            }
        }
        self.tree_config(1, 0).validate()
    }

    fn tree_config(&self, n_features: usize, index: usize) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: Some(self.max_features.resolve(n_features)),
            random_state: self.random_state.wrapping_add(index as u64),
        }
    }
}

/// Random forest of regression trees.
///
/// Trees are grown in parallel; each one draws its bootstrap sample and its
/// split features from its own seeded generator, so results do not depend on
/// thread scheduling. Predictions are the mean over all trees.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Create a new forest with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ForestConfig::default())
    }

    /// Fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for RandomForestRegressor {
    type Config = ForestConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config, trees: Vec::new() }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn name(&self) -> &str {
        "random-forest"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), RegressorError> {
        self.config.validate()?;

        let n = x.nrows();
        if y.len() != n {
            return Err(RegressorError::DimensionMismatch {
                expected: n,
                actual: y.len(),
                context: "targets".to_string(),
            });
        }
        if n == 0 {
            return Err(RegressorError::InsufficientData { required: 1, actual: 0 });
        }

        let config = &self.config;
        let trees = (0..config.n_estimators)
            .into_par_iter()
            .map(|index| {
                let tree_config = config.tree_config(x.ncols(), index);
                let mut tree = RegressionTree::with_config(tree_config);
                if config.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(
                        config.random_state.wrapping_add(index as u64).rotate_left(32),
                    );
                    let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                    tree.fit(&x.select(Axis(0), &sample), &y.select(Axis(0), &sample))?;
                } else {
                    tree.fit(x, y)?;
                }
                Ok(tree)
            })
            .collect::<Result<Vec<_>, RegressorError>>()?;

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, RegressorError> {
        if self.trees.is_empty() {
            return Err(RegressorError::NotFitted);
        }

        let per_tree = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>, _>>()?;

        let mut sum: Array1<f64> = Array1::zeros(x.nrows());
        for prediction in &per_tree {
            sum += prediction;
        }
        Ok(sum / self.trees.len() as f64)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
