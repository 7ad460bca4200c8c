//! Random control feature.

use gapfill_primitives::{DatasetError, TimeSeriesDataset};
use gapfill_traits::{FeatureKind, FeatureTransform, TransformError};
use gapfill_utils::float_column;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// Random control column.
pub const RANDOM_FEATURE: &str = ".RANDOM";

/// Adds a column of standard-normal noise.
///
/// The noise carries no information about the target, so its permutation
/// importance is the benchmark every real feature has to beat. The same seed
/// always yields the same column.
#[derive(Debug, Clone, Copy)]
pub struct RandomControl {
    seed: u64,
}

impl RandomControl {
    /// Create a control feature generator.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed of the generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw `n` values.
    #[must_use]
    pub fn sample(&self, n: usize) -> Vec<f64> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        StandardNormal.sample_iter(&mut rng).take(n).collect()
    }
}

impl FeatureTransform for RandomControl {
    fn name(&self) -> &str {
        "random-control"
    }

    fn kind(&self) -> FeatureKind {
        FeatureKind::RandomControl
    }

    fn apply(&self, dataset: &TimeSeriesDataset) -> Result<TimeSeriesDataset, TransformError> {
        if dataset.has_column(RANDOM_FEATURE) {
            return Err(DatasetError::DuplicateColumn(RANDOM_FEATURE.to_string()).into());
        }
        let values = self.sample(dataset.len()).into_iter().map(Some).collect();
        Ok(dataset.with_columns(vec![float_column(RANDOM_FEATURE, values)])?)
    }
}
