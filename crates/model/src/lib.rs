#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/gapfill-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod linear;
pub use linear::{LinearConfig, LinearRegressor};

mod tree;
pub use tree::{RegressionTree, TreeConfig};

mod forest;
pub use forest::{ForestConfig, MaxFeatures, RandomForestRegressor};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use gapfill_traits::Regressor;

    pub use super::{
        ForestConfig, LinearConfig, LinearRegressor, ModelError, RandomForestRegressor,
    };
}
