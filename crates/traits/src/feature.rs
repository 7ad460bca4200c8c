//! Feature classification.

/// The kind of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Auxiliary measurement supplied with the dataset.
    Raw,
    /// Shifted variant of a raw feature.
    Lagged,
    /// Integer derived from the timestamp (year, season, month, ...).
    Timestamp,
    /// Continuous record number.
    RecordNumber,
    /// Random control feature used as importance benchmark.
    RandomControl,
}

impl FeatureKind {
    /// Returns whether this feature is a pure function of the timestamp index.
    #[must_use]
    pub const fn is_deterministic(&self) -> bool {
        matches!(self, Self::Timestamp | Self::RecordNumber)
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Lagged => write!(f, "lagged"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::RecordNumber => write!(f, "record number"),
            Self::RandomControl => write!(f, "random control"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_kind_display() {
        assert_eq!(FeatureKind::Raw.to_string(), "raw");
        assert_eq!(FeatureKind::Timestamp.to_string(), "timestamp");
        assert_eq!(FeatureKind::RandomControl.to_string(), "random control");
    }

    #[test]
    fn feature_kind_deterministic() {
        assert!(FeatureKind::Timestamp.is_deterministic());
        assert!(!FeatureKind::RandomControl.is_deterministic());
        assert!(!FeatureKind::Lagged.is_deterministic());
    }
}
