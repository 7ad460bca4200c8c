//! Feature naming.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Name of a feature column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Into, Serialize, Deserialize)]
pub struct FeatureName(pub String);

impl FeatureName {
    /// Create a new feature name.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Name of the variant of `base` shifted by `lag` records.
    ///
    /// Negative lags look back (`TA-1`), positive lags look ahead (`TA+1`).
    #[must_use]
    pub fn lagged(base: &str, lag: i64) -> Self {
        if lag < 0 { Self(format!("{base}{lag}")) } else { Self(format!("{base}+{lag}")) }
    }

    /// Get the feature name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeatureName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
