#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/gapfill-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod fill;
pub use fill::{count_missing, fill_missing};

mod cumulative;
pub use cumulative::cumulative_sum;

mod frame;
pub use frame::{extract_column, float_column, int_column};

mod arrays;
pub use arrays::{ModelArrays, complete_rows, convert_to_arrays, feature_matrix};

mod error;
pub use error::UtilsError;
