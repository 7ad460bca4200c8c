#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/gapfill-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod lag;
pub use lag::{LagFeatures, LagWindow};

pub mod timestamp;
pub use timestamp::TimestampFeatures;

mod record;
pub use record::{RECORD_NUMBER, RecordNumber};

mod random;
pub use random::{RANDOM_FEATURE, RandomControl};

mod builder;
pub use builder::{FeatureBuilder, FeatureConfig};

mod error;
pub use error::FeatureError;
