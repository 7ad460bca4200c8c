//! Cumulative sums over series with missing values.

/// Running total of a series with missing values.
///
/// Missing inputs produce a missing output and contribute nothing to the
/// total; the total carried to the next present value is not reset.
#[must_use]
pub fn cumulative_sum(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut total = 0.0;
    values
        .iter()
        .map(|v| {
            v.map(|x| {
                total += x;
                total
            })
        })
        .collect()
}
