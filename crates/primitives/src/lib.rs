#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/gapfill-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod dataset;
pub use dataset::TimeSeriesDataset;

mod feature;
pub use feature::FeatureName;

mod flag;
pub use flag::{FillStage, Flag};

mod importance;
pub use importance::{FeatureImportance, ImportanceTable};

mod scores;
pub use scores::PredictionScores;

mod error;
pub use error::DatasetError;

/// Timestamp type of the dataset index.
pub type Timestamp = chrono::NaiveDateTime;
