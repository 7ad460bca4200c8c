//! Regression metrics.

use gapfill_primitives::PredictionScores;
use ndarray::Array1;

use crate::MathError;

fn check(targets: &Array1<f64>, predictions: &Array1<f64>) -> Result<(), MathError> {
    if targets.len() != predictions.len() {
        return Err(MathError::DimensionMismatch {
            expected: targets.len(),
            actual: predictions.len(),
        });
    }
    if targets.is_empty() {
        return Err(MathError::EmptyData);
    }
    Ok(())
}

fn absolute_errors(targets: &Array1<f64>, predictions: &Array1<f64>) -> Vec<f64> {
    targets.iter().zip(predictions).map(|(t, p)| (t - p).abs()).collect()
}

/// Mean absolute error.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn mean_absolute_error(
    targets: &Array1<f64>,
    predictions: &Array1<f64>,
) -> Result<f64, MathError> {
    check(targets, predictions)?;
    let errors = absolute_errors(targets, predictions);
    Ok(errors.iter().sum::<f64>() / errors.len() as f64)
}

/// Median absolute error.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn median_absolute_error(
    targets: &Array1<f64>,
    predictions: &Array1<f64>,
) -> Result<f64, MathError> {
    check(targets, predictions)?;
    let mut errors = absolute_errors(targets, predictions);
    errors.sort_by(f64::total_cmp);
    let n = errors.len();
    Ok(if n % 2 == 1 { errors[n / 2] } else { (errors[n / 2 - 1] + errors[n / 2]) / 2.0 })
}

/// Mean squared error.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn mean_squared_error(
    targets: &Array1<f64>,
    predictions: &Array1<f64>,
) -> Result<f64, MathError> {
    check(targets, predictions)?;
    let sum: f64 = targets.iter().zip(predictions).map(|(t, p)| (t - p).powi(2)).sum();
    Ok(sum / targets.len() as f64)
}

/// Root mean squared error.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn root_mean_squared_error(
    targets: &Array1<f64>,
    predictions: &Array1<f64>,
) -> Result<f64, MathError> {
    Ok(mean_squared_error(targets, predictions)?.sqrt())
}

/// Maximum absolute error.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn max_error(targets: &Array1<f64>, predictions: &Array1<f64>) -> Result<f64, MathError> {
    check(targets, predictions)?;
    Ok(absolute_errors(targets, predictions).into_iter().fold(0.0, f64::max))
}

/// Mean absolute percentage error, as a fraction.
///
/// Targets of zero are guarded with machine epsilon in the denominator, so
/// the result is large but finite.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn mean_absolute_percentage_error(
    targets: &Array1<f64>,
    predictions: &Array1<f64>,
) -> Result<f64, MathError> {
    check(targets, predictions)?;
    let sum: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).abs() / t.abs().max(f64::EPSILON))
        .sum();
    Ok(sum / targets.len() as f64)
}

/// Coefficient of determination.
///
/// For constant targets the score is 1.0 on a perfect prediction and 0.0
/// otherwise.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn r2_score(targets: &Array1<f64>, predictions: &Array1<f64>) -> Result<f64, MathError> {
    check(targets, predictions)?;
    let mean = targets.mean().unwrap_or(0.0);
    let ss_tot: f64 = targets.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = targets.iter().zip(predictions).map(|(t, p)| (t - p).powi(2)).sum();

    if ss_tot > 0.0 {
        Ok(1.0 - ss_res / ss_tot)
    } else if ss_res == 0.0 {
        Ok(1.0)
    } else {
        Ok(0.0)
    }
}

/// All regression scores of `predictions` against `targets`.
///
/// # Errors
/// Returns error on empty or mismatched inputs.
pub fn prediction_scores(
    targets: &Array1<f64>,
    predictions: &Array1<f64>,
) -> Result<PredictionScores, MathError> {
    let mse = mean_squared_error(targets, predictions)?;
    Ok(PredictionScores {
        mae: mean_absolute_error(targets, predictions)?,
        medae: median_absolute_error(targets, predictions)?,
        mse,
        rmse: mse.sqrt(),
        maxe: max_error(targets, predictions)?,
        mape: mean_absolute_percentage_error(targets, predictions)?,
        r2: r2_score(targets, predictions)?,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        let scores = prediction_scores(&y, &y).unwrap();

        assert_relative_eq!(scores.mae, 0.0);
        assert_relative_eq!(scores.rmse, 0.0);
        assert_relative_eq!(scores.maxe, 0.0);
        assert_relative_eq!(scores.r2, 1.0);
    }

    #[test]
    fn known_errors() {
        let y = array![1.0, 2.0, 4.0, 8.0];
        let p = array![2.0, 2.0, 2.0, 4.0];
        // Absolute errors: 1, 0, 2, 4

        let scores = prediction_scores(&y, &p).unwrap();
        assert_relative_eq!(scores.mae, 7.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(scores.medae, 1.5, epsilon = 1e-12);
        assert_relative_eq!(scores.mse, 21.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(scores.rmse, (21.0f64 / 4.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(scores.maxe, 4.0, epsilon = 1e-12);
        assert_relative_eq!(scores.mape, (1.0 + 0.0 + 0.5 + 0.5) / 4.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(array![1.0, 2.0, 3.0], array![2.0, 2.0, 2.0], 0.0)]
    #[case(array![1.0, 2.0, 3.0], array![3.0, 2.0, 1.0], -3.0)]
    #[case(array![5.0, 5.0, 5.0], array![5.0, 5.0, 5.0], 1.0)]
    #[case(array![5.0, 5.0, 5.0], array![4.0, 5.0, 5.0], 0.0)]
    fn r2_cases(#[case] y: Array1<f64>, #[case] p: Array1<f64>, #[case] expected: f64) {
        assert_relative_eq!(r2_score(&y, &p).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn empty_and_mismatched() {
        let empty: Array1<f64> = array![];
        assert!(matches!(mean_absolute_error(&empty, &empty), Err(MathError::EmptyData)));
        assert!(matches!(
            r2_score(&array![1.0, 2.0], &array![1.0]),
            Err(MathError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }
}
