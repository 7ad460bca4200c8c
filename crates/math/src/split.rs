//! Train/test splitting.

use ndarray::{Array1, Array2, Axis};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::MathError;

/// Rows split into a training and a test set.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Training features.
    pub x_train: Array2<f64>,
    /// Test features.
    pub x_test: Array2<f64>,
    /// Training targets.
    pub y_train: Array1<f64>,
    /// Test targets.
    pub y_test: Array1<f64>,
    /// Row positions (in the input arrays) of the training set.
    pub train_rows: Vec<usize>,
    /// Row positions (in the input arrays) of the test set.
    pub test_rows: Vec<usize>,
}

/// Shuffle rows with a seeded generator and split off a test set.
///
/// The test set has `ceil(test_size * n)` rows, the training set the rest.
/// Identical inputs and seed always give the same split.
///
/// # Arguments
/// * `x` - Feature matrix (n x p)
/// * `y` - Targets (n,)
/// * `test_size` - Fraction of rows in the test set, in (0, 1)
/// * `seed` - Seed of the shuffling generator
///
/// # Errors
/// Returns `MathError::InvalidTestSize` for a ratio outside (0, 1) and
/// `MathError::InsufficientData` if either set would be empty.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit, MathError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(MathError::InvalidTestSize(test_size));
    }

    let n = y.len();
    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(MathError::InsufficientData { required: 2, actual: n });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_rows = indices[..n_test].to_vec();
    let train_rows = indices[n_test..].to_vec();

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_rows),
        x_test: x.select(Axis(0), &test_rows),
        y_train: y.select(Axis(0), &train_rows),
        y_test: y.select(Axis(0), &test_rows),
        train_rows,
        test_rows,
    })
}
