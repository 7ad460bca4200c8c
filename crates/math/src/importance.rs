//! Permutation feature importance.

use gapfill_primitives::{FeatureImportance, ImportanceTable};
use gapfill_traits::Regressor;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::{MathError, r2_score};

/// Permutation importance of every feature of a fitted model.
///
/// For each feature, its column is shuffled across rows `n_repeats` times;
/// the importance is the drop of the R² score relative to the unshuffled
/// score. The table holds the mean and the standard deviation of the drops.
///
/// # Arguments
/// * `model` - Fitted model
/// * `x` - Feature matrix, usually the test set (n x p)
/// * `y` - Targets (n,)
/// * `feature_names` - Names of the p columns
/// * `n_repeats` - Number of shuffles per feature
/// * `seed` - Seed of the shuffling generator
///
/// # Errors
/// Returns `MathError::InvalidRepeats` for zero repeats, a dimension error if
/// names or rows do not match, or the model's prediction error.
pub fn permutation_importance<M: Regressor>(
    model: &M,
    x: &Array2<f64>,
    y: &Array1<f64>,
    feature_names: &[String],
    n_repeats: usize,
    seed: u64,
) -> Result<ImportanceTable, MathError> {
    if n_repeats == 0 {
        return Err(MathError::InvalidRepeats(n_repeats));
    }
    if feature_names.len() != x.ncols() {
        return Err(MathError::DimensionMismatch {
            expected: x.ncols(),
            actual: feature_names.len(),
        });
    }
    if x.nrows() != y.len() {
        return Err(MathError::DimensionMismatch { expected: y.len(), actual: x.nrows() });
    }

    let baseline = r2_score(y, &model.predict(x)?)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut permuted = x.clone();
    let mut entries = Vec::with_capacity(feature_names.len());

    for (j, name) in feature_names.iter().enumerate() {
        let original = x.column(j).to_vec();
        let mut shuffled = original.clone();
        let mut drops = Vec::with_capacity(n_repeats);

        for _ in 0..n_repeats {
            shuffled.shuffle(&mut rng);
            permuted.column_mut(j).assign(&Array1::from_vec(shuffled.clone()));
            let score = r2_score(y, &model.predict(&permuted)?)?;
            drops.push(baseline - score);
        }

        permuted.column_mut(j).assign(&Array1::from_vec(original));

        let (mean, std) = mean_std(&drops);
        entries.push(FeatureImportance { feature: name.clone(), mean, std });
    }

    Ok(ImportanceTable::new(entries))
}

/// Mean and population standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
