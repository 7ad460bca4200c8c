#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/gapfill-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod feature;
pub use feature::FeatureKind;

mod transform;
pub use transform::{FeatureTransform, TransformError};

mod estimator;
pub use estimator::{Regressor, RegressorError};
