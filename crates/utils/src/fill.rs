//! Missing-value filling utilities.

use crate::UtilsError;

/// Fill missing values in `base` with the value at the same position in `source`.
///
/// Positions that are missing in both inputs stay missing. Present values in
/// `base` are never overwritten.
///
/// # Errors
/// Returns `UtilsError::LengthMismatch` if the inputs differ in length.
pub fn fill_missing(
    base: &[Option<f64>],
    source: &[Option<f64>],
) -> Result<Vec<Option<f64>>, UtilsError> {
    if base.len() != source.len() {
        return Err(UtilsError::LengthMismatch { expected: base.len(), actual: source.len() });
    }

    Ok(base.iter().zip(source).map(|(b, s)| b.or(*s)).collect())
}

/// Count missing values in a series.
#[must_use]
pub fn count_missing(values: &[Option<f64>]) -> usize {
    values.iter().filter(|v| v.is_none()).count()
}
