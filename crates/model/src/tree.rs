//! CART regression tree.

use gapfill_traits::{Regressor, RegressorError};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::seq::index::sample;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Configuration for [`RegressionTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth (None for unlimited).
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples in each leaf.
    pub min_samples_leaf: usize,
    /// Number of features drawn at each split (None for all).
    pub max_features: Option<usize>,
    /// Seed for feature subsampling.
    pub random_state: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            random_state: 42,
        }
    }
}

impl TreeConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidParameter` for out-of-range values.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.min_samples_split < 2 {
            return Err(ModelError::invalid("min_samples_split", "must be >= 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::invalid("min_samples_leaf", "must be >= 1"));
        }
        if self.max_features == Some(0) {
            return Err(ModelError::invalid("max_features", "must be >= 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: ndarray::ArrayView1<'_, f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                Self::Leaf { value } => return *value,
                Self::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Best split found for a node.
struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Regression tree grown by greedy variance reduction.
///
/// Each leaf predicts the mean target of its training samples. Split
/// thresholds lie halfway between consecutive distinct feature values and
/// samples with `x <= threshold` go left.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    config: TreeConfig,
    root: Option<Node>,
    n_features: usize,
}

impl RegressionTree {
    /// Create a new tree with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Depth of the fitted tree.
    #[must_use]
    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(Node::depth)
    }

    /// Number of leaves of the fitted tree.
    #[must_use]
    pub fn n_leaves(&self) -> Option<usize> {
        self.root.as_ref().map(Node::n_leaves)
    }

    fn build(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &mut [usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> Node {
        let n = indices.len();
        let value = indices.iter().map(|&i| y[i]).sum::<f64>() / n as f64;

        let stop = n < self.config.min_samples_split
            || n < 2 * self.config.min_samples_leaf
            || self.config.max_depth.is_some_and(|d| depth >= d);
        if stop {
            return Node::Leaf { value };
        }

        let Some(best) = self.best_split(x, y, indices, rng) else {
            return Node::Leaf { value };
        };

        // Partition in place: left part first
        let mut split_at = 0;
        for k in 0..n {
            if x[[indices[k], best.feature]] <= best.threshold {
                indices.swap(k, split_at);
                split_at += 1;
            }
        }

        let (left_idx, right_idx) = indices.split_at_mut(split_at);
        let left = self.build(x, y, left_idx, depth + 1, rng);
        let right = self.build(x, y, right_idx, depth + 1, rng);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<Candidate> {
        let n_features = x.ncols();
        let features: Vec<usize> = match self.config.max_features {
            Some(k) if k < n_features => {
                let mut drawn = sample(rng, n_features, k).into_vec();
                drawn.sort_unstable();
                drawn
            }
            _ => (0..n_features).collect(),
        };

        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;
        let min_leaf = self.config.min_samples_leaf;

        let mut best: Option<Candidate> = None;
        let mut order: Vec<usize> = indices.to_vec();

        for feature in features {
            order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let yi = y[order[k]];
                left_sum += yi;
                left_sq += yi * yi;

                let left_n = k + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let here = x[[order[k], feature]];
                let next = x[[order[k + 1], feature]];
                if here == next {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let child_sse = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);
                let gain = parent_sse - child_sse;

                if gain > 1e-12 && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(Candidate { feature, threshold: here + (next - here) / 2.0, gain });
                }
            }
        }

        best
    }
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Regressor for RegressionTree {
    type Config = TreeConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config, root: None, n_features: 0 }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn name(&self) -> &str {
        "regression-tree"
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

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_state);
        let mut indices: Vec<usize> = (0..n).collect();
        self.root = Some(self.build(x, y, &mut indices, 0, &mut rng));
        self.n_features = x.ncols();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, RegressorError> {
        let root = self.root.as_ref().ok_or(RegressorError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(RegressorError::DimensionMismatch {
                expected: self.n_features,
                actual: x.ncols(),
                context: "features".to_string(),
            });
        }
        Ok(x.rows().into_iter().map(|row| root.predict(row)).collect())
    }

    fn is_fitted(&self) -> bool {
        self.root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn fits_step_function_exactly() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.depth(), Some(1));
        assert_eq!(tree.n_leaves(), Some(2));

        let pred = tree.predict(&array![[0.0], [6.4], [6.6], [100.0]]).unwrap();
        assert_relative_eq!(pred[0], 5.0);
        assert_relative_eq!(pred[1], 5.0);
        assert_relative_eq!(pred[2], 20.0);
        assert_relative_eq!(pred[3], 20.0);
    }

    #[test]
    fn picks_informative_feature() {
        let x = array![[0.0, 1.0], [1.0, 1.0], [0.0, 2.0], [1.0, 2.0]];
        let y = array![1.0, 1.0, 9.0, 9.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();
        let pred = tree.predict(&x).unwrap();
        assert_eq!(pred, y);
        assert_eq!(tree.depth(), Some(1));
    }

    #[rstest]
    #[case(Some(0), 1)]
    #[case(Some(1), 2)]
    #[case(None, 4)]
    fn max_depth_limits_leaves(#[case] max_depth: Option<usize>, #[case] leaves: usize) {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 2.0, 4.0, 8.0];

        let mut tree = RegressionTree::with_config(TreeConfig { max_depth, ..TreeConfig::default() });
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_leaves(), Some(leaves));
    }

    #[test]
    fn min_samples_leaf_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![0.0, 0.0, 0.0, 0.0, 100.0];

        let mut tree =
            RegressionTree::with_config(TreeConfig { min_samples_leaf: 2, ..TreeConfig::default() });
        tree.fit(&x, &y).unwrap();

        // The outlier cannot be isolated in a leaf of one
        let pred = tree.predict(&array![[5.0]]).unwrap();
        assert_relative_eq!(pred[0], 50.0);
    }

    #[test]
    fn constant_target_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];
        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_leaves(), Some(1));
    }

    #[test]
    fn errors() {
        let tree = RegressionTree::new();
        assert!(matches!(tree.predict(&array![[1.0]]), Err(RegressorError::NotFitted)));

        let mut tree =
            RegressionTree::with_config(TreeConfig { min_samples_leaf: 0, ..TreeConfig::default() });
        assert!(matches!(
            tree.fit(&array![[1.0]], &array![1.0]),
            Err(RegressorError::InvalidConfig(_))
        ));
    }
}
