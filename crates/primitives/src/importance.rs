//! Permutation importance tables.

use serde::{Deserialize, Serialize};

/// Permutation importance of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name.
    pub feature: String,
    /// Mean score drop across repeats.
    pub mean: f64,
    /// Standard deviation of the score drop across repeats.
    pub std: f64,
}

/// Feature importances ordered by descending mean importance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportanceTable {
    entries: Vec<FeatureImportance>,
}

impl ImportanceTable {
    /// Create a table; entries are sorted by descending mean (stable for ties).
    #[must_use]
    pub fn new(mut entries: Vec<FeatureImportance>) -> Self {
        entries.sort_by(|a, b| b.mean.total_cmp(&a.mean));
        Self { entries }
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, most important first.
    #[must_use]
    pub fn entries(&self) -> &[FeatureImportance] {
        &self.entries
    }

    /// Iterate over entries, most important first.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureImportance> {
        self.entries.iter()
    }

    /// Entry for a feature.
    #[must_use]
    pub fn get(&self, feature: &str) -> Option<&FeatureImportance> {
        self.entries.iter().find(|e| e.feature == feature)
    }

    /// Mean importance of a feature.
    #[must_use]
    pub fn importance(&self, feature: &str) -> Option<f64> {
        self.get(feature).map(|e| e.mean)
    }

    /// Feature names, most important first.
    #[must_use]
    pub fn feature_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.feature.as_str()).collect()
    }

    /// Most important feature.
    #[must_use]
    pub fn top(&self) -> Option<&FeatureImportance> {
        self.entries.first()
    }
}
