#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/gapfill-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod linalg;
pub use linalg::{RidgeFit, cholesky_solve, least_squares};

mod metrics;
pub use metrics::{
    max_error, mean_absolute_error, mean_absolute_percentage_error, mean_squared_error,
    median_absolute_error, prediction_scores, r2_score, root_mean_squared_error,
};

mod split;
pub use split::{TrainTestSplit, train_test_split};

mod importance;
pub use importance::permutation_importance;

mod error;
pub use error::MathError;
