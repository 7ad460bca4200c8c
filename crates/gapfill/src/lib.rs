//! # gapfill
//!
//! Machine-learning gap filling for time series.
//!
//! This crate provides a unified interface to the gapfill ecosystem.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Dataset, flags, importance tables and scores
//! - `traits`: Regressor and feature transform abstractions
//! - `math`: Least squares, metrics, train/test split, permutation importance
//! - `features`: Lag, timestamp, record number and random control features
//! - `model`: Linear regression, regression tree and random forest
//! - `utils`: Column extraction and missing-value helpers
//! - `pipeline`: Feature reduction, training and gap filling
//!
//! ## Example
//!
//! ```rust,ignore
//! use gapfill::model::{ForestConfig, RandomForestRegressor};
//! use gapfill::pipeline::{PipelineConfig, TimeSeriesGapFiller};
//!
//! let mut filler = TimeSeriesGapFiller::<RandomForestRegressor>::new(
//!     dataset,
//!     ForestConfig::default(),
//!     PipelineConfig::default(),
//! )?;
//! filler.reduce_features()?;
//! filler.train_model()?;
//! filler.fill_gaps()?;
//!
//! // Or with specific features only:
//! // [dependencies]
//! // gapfill = { version = "0.1", default-features = false, features = ["pipeline"] }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use gapfill_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use gapfill_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use gapfill_math as math;
#[cfg(feature = "features")]
#[doc(inline)]
pub use gapfill_features as features;
#[cfg(feature = "model")]
#[doc(inline)]
pub use gapfill_model as model;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use gapfill_utils as utils;
#[cfg(feature = "pipeline")]
#[doc(inline)]
pub use gapfill_pipeline as pipeline;
