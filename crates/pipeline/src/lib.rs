#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/gapfill-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{PipelineConfig, TiePolicy};

mod selector;
pub use selector::{FeatureReduction, FeatureSelector};

mod trainer;
pub use trainer::{ModelTrainer, TrainTestDetails, TrainedModel};

mod filler;
pub use filler::{
    GAP_PREDICTIONS, GAPFILLED_CUMULATIVE, GapFillOutcome, GapFillResult, GapFiller, PREDICTIONS,
    PREDICTIONS_FALLBACK, PREDICTIONS_FULLMODEL, TIMESTAMP,
};

mod gapfiller;
pub use gapfiller::TimeSeriesGapFiller;

mod error;
pub use error::PipelineError;
