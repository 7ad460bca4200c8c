//! Ridge least squares via the normal equations.

use ndarray::{Array1, Array2, ArrayView1};

use crate::MathError;

/// Pivots below this fraction of the largest diagonal entry count as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Fitted ridge regression.
#[derive(Debug, Clone)]
pub struct RidgeFit {
    /// Coefficients, one per design column.
    pub coefficients: Array1<f64>,
    /// In-sample fitted values.
    pub fitted: Array1<f64>,
    /// In-sample residuals (`y - fitted`).
    pub residuals: Array1<f64>,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
}

/// Ridge-regularized least squares.
///
/// Minimizes `|y - X b|^2 + alpha |b|^2` by solving `(X'X + alpha I) b = X'y`
/// with a Cholesky factorization. `alpha = 0` gives ordinary least squares.
/// No intercept column is added; callers center the data or append ones.
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p)
/// * `alpha` - Non-negative ridge penalty
///
/// # Errors
/// Returns an error if dimensions mismatch, the data is empty, `alpha` is
/// negative, or `X'X + alpha I` is not positive definite.
pub fn least_squares(y: &Array1<f64>, x: &Array2<f64>, alpha: f64) -> Result<RidgeFit, MathError> {
    if x.nrows() != y.len() {
        return Err(MathError::DimensionMismatch { expected: y.len(), actual: x.nrows() });
    }
    if x.is_empty() {
        return Err(MathError::EmptyData);
    }
    if alpha.is_nan() || alpha < 0.0 {
        return Err(MathError::LinearAlgebra(format!("ridge penalty must be >= 0, got {alpha}")));
    }

    let mut gram = x.t().dot(x);
    gram.diag_mut().mapv_inplace(|d| d + alpha);
    let coefficients = cholesky_solve(&gram, &x.t().dot(y))?;

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;
    let r_squared = determination(y.view(), residuals.view());

    Ok(RidgeFit { coefficients, fitted, residuals, r_squared })
}

/// Solve `A x = b` for a symmetric positive definite `A`.
///
/// Only the lower triangle of `a` is read.
///
/// # Errors
/// Returns `MathError::LinearAlgebra` if `a` is not square or not positive
/// definite, and `MathError::DimensionMismatch` if `b` has the wrong length.
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let lower = cholesky(a)?;
    let n = lower.nrows();
    if b.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.len() });
    }

    // L z = b
    let mut z = Array1::zeros(n);
    for i in 0..n {
        let partial: f64 = (0..i).map(|k| lower[[i, k]] * z[k]).sum();
        z[i] = (b[i] - partial) / lower[[i, i]];
    }
    // L' x = z
    let mut solution = Array1::zeros(n);
    for i in (0..n).rev() {
        let partial: f64 = (i + 1..n).map(|k| lower[[k, i]] * solution[k]).sum();
        solution[i] = (z[i] - partial) / lower[[i, i]];
    }
    Ok(solution)
}

/// Lower-triangular `L` with `A = L L'`.
fn cholesky(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra(format!(
            "expected a square matrix, got {}x{}",
            n,
            a.ncols()
        )));
    }

    let scale = a.diag().iter().fold(0.0_f64, |acc, d| acc.max(d.abs())).max(1.0);
    let mut lower = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let pivot = a[[j, j]] - (0..j).map(|k| lower[[j, k]].powi(2)).sum::<f64>();
        if pivot.is_nan() || pivot <= PIVOT_TOLERANCE * scale {
            return Err(MathError::LinearAlgebra(format!(
                "matrix is not positive definite (pivot {pivot:e} at column {j})"
            )));
        }
        let diag = pivot.sqrt();
        lower[[j, j]] = diag;
        for i in j + 1..n {
            let dot: f64 = (0..j).map(|k| lower[[i, k]] * lower[[j, k]]).sum();
            lower[[i, j]] = (a[[i, j]] - dot) / diag;
        }
    }
    Ok(lower)
}

fn determination(y: ArrayView1<'_, f64>, residuals: ArrayView1<'_, f64>) -> f64 {
    let mean = y.mean().unwrap_or(0.0);
    let total = y.fold(0.0, |acc, v| acc + (v - mean).powi(2));
    let unexplained = residuals.fold(0.0, |acc, r| acc + r * r);
    if total > 0.0 { 1.0 - unexplained / total } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn recovers_exact_line() {
        // Intercept column and slope column: y = 0.5 + 2x
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];
        let y = x.column(1).mapv(|v| 0.5 + 2.0 * v);

        let fit = least_squares(&y, &x, 0.0).unwrap();

        assert_relative_eq!(fit.coefficients[0], 0.5, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert!(fit.residuals.iter().all(|r| r.abs() < 1e-10));
        assert_relative_eq!(fit.fitted[4], 8.5, epsilon = 1e-10);
    }

    #[test]
    fn penalty_shrinks_towards_zero() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![2.0, 4.0, 6.0, 8.0];

        let plain = least_squares(&y, &x, 0.0).unwrap();
        let ridge = least_squares(&y, &x, 10.0).unwrap();

        assert_relative_eq!(plain.coefficients[0], 2.0, epsilon = 1e-10);
        // Closed form: x'y / (x'x + alpha) = 60 / 40
        assert_relative_eq!(ridge.coefficients[0], 1.5, epsilon = 1e-10);
    }

    #[test]
    fn collinear_design_needs_a_penalty() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(least_squares(&y, &x, 0.0), Err(MathError::LinearAlgebra(_))));

        let fit = least_squares(&y, &x, 1e-3).unwrap();
        // Weight is split evenly between the identical columns
        assert_relative_eq!(fit.coefficients[0], fit.coefficients[1], epsilon = 1e-8);
    }

    #[test]
    fn cholesky_solves_spd_system() {
        let a = array![[4.0, 2.0, 0.6], [2.0, 5.0, 1.0], [0.6, 1.0, 3.0]];
        let expected = array![1.0, -2.0, 0.5];
        let b = a.dot(&expected);

        let solution = cholesky_solve(&a, &b).unwrap();
        for (s, e) in solution.iter().zip(expected.iter()) {
            assert_relative_eq!(s, e, epsilon = 1e-12);
        }
    }

    #[test]
    fn cholesky_rejects_indefinite_and_non_square() {
        let indefinite = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(cholesky_solve(&indefinite, &array![1.0, 1.0]).is_err());

        let wide = Array2::<f64>::zeros((2, 3));
        assert!(matches!(cholesky_solve(&wide, &array![1.0, 1.0]), Err(MathError::LinearAlgebra(_))));

        let identity = Array2::<f64>::eye(2);
        assert!(matches!(
            cholesky_solve(&identity, &array![1.0, 1.0, 1.0]),
            Err(MathError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn negative_or_nan_penalty(#[case] alpha: f64) {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0];
        assert!(matches!(least_squares(&y, &x, alpha), Err(MathError::LinearAlgebra(_))));
    }

    #[test]
    fn row_count_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            least_squares(&y, &x, 0.0),
            Err(MathError::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }
}
