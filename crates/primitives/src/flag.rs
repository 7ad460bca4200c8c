//! Provenance flags and fill stages.

use serde::{Deserialize, Serialize};

/// Provenance of a value in a gap-filled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Flag {
    /// Target was observed.
    Observed = 0,
    /// Missing target filled by the full model (all features available).
    FullModel = 1,
    /// Missing target filled by the timestamp-only fallback model.
    Fallback = 2,
}

impl Flag {
    /// Numeric code of the flag (0, 1 or 2).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Parse a numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Observed),
            1 => Some(Self::FullModel),
            2 => Some(Self::Fallback),
            _ => None,
        }
    }

    /// Whether the value was produced by a model.
    #[must_use]
    pub const fn is_filled(self) -> bool {
        !matches!(self, Self::Observed)
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Observed => write!(f, "observed"),
            Self::FullModel => write!(f, "full model"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Stage reached by a gap-filling result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FillStage {
    /// Observed target only.
    Unfilled,
    /// Gaps with all features available were filled by the full model.
    FullModelFilled,
    /// Remaining gaps were filled by the fallback model (or nothing remained).
    FallbackFilled,
    /// Predictions combined and cumulative series computed.
    Combined,
}

impl std::fmt::Display for FillStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unfilled => write!(f, "unfilled"),
            Self::FullModelFilled => write!(f, "full-model filled"),
            Self::FallbackFilled => write!(f, "fallback filled"),
            Self::Combined => write!(f, "combined"),
        }
    }
}
