//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// How features whose importance equals the random control's are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiePolicy {
    /// Reject ties (only strictly more important features are kept).
    #[default]
    Reject,
    /// Accept ties. The control feature itself is always rejected.
    Accept,
}

/// Configuration shared by feature reduction, training and gap filling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fraction of complete rows held out for testing, in (0, 1).
    pub test_size: f64,
    /// Number of shuffles per feature in permutation importance.
    pub perm_n_repeats: usize,
    /// Seed for the random control feature, splitting and permutation.
    pub random_state: u64,
    /// Treatment of ties with the random control.
    pub tie_policy: TiePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_size: 0.25,
            perm_n_repeats: 10,
            random_state: 42,
            tie_policy: TiePolicy::Reject,
        }
    }
}

impl PipelineConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `PipelineError::Configuration` for a split ratio outside
    /// (0, 1) or zero permutation repeats.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::Configuration(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.perm_n_repeats == 0 {
            return Err(PipelineError::Configuration("perm_n_repeats must be positive".to_string()));
        }
        Ok(())
    }
}
