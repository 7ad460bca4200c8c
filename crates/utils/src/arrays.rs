//! Assembly of regressor inputs from nullable columns.

use ndarray::{Array1, Array2};

use crate::UtilsError;

/// Complete-case arrays for model training or scoring.
#[derive(Debug, Clone)]
pub struct ModelArrays {
    /// Target values (n_rows,).
    pub target: Array1<f64>,
    /// Feature matrix (n_rows x n_features).
    pub features: Array2<f64>,
    /// Positions of the selected rows in the original series.
    pub rows: Vec<usize>,
}

impl ModelArrays {
    /// Number of complete rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Positions where every column has a value.
///
/// With no columns, every position up to `len` is complete.
///
/// # Errors
/// Returns `UtilsError::LengthMismatch` if a column is not `len` long.
pub fn complete_rows(columns: &[&[Option<f64>]], len: usize) -> Result<Vec<usize>, UtilsError> {
    for column in columns {
        if column.len() != len {
            return Err(UtilsError::LengthMismatch { expected: len, actual: column.len() });
        }
    }

    Ok((0..len).filter(|&i| columns.iter().all(|c| c[i].is_some())).collect())
}

/// Build a dense feature matrix from the given rows of each column.
///
/// Rows must be complete for all columns; missing values are an error.
///
/// # Errors
/// Returns `UtilsError::InvalidParameter` if a selected cell is missing.
pub fn feature_matrix(
    columns: &[&[Option<f64>]],
    rows: &[usize],
) -> Result<Array2<f64>, UtilsError> {
    let mut matrix = Array2::zeros((rows.len(), columns.len()));
    for (j, column) in columns.iter().enumerate() {
        for (i, &row) in rows.iter().enumerate() {
            matrix[[i, j]] = column
                .get(row)
                .copied()
                .flatten()
                .ok_or_else(|| UtilsError::InvalidParameter(format!("missing value at row {row}")))?;
        }
    }
    Ok(matrix)
}

/// Convert a target and its features to arrays, keeping complete rows only.
///
/// # Errors
/// Returns `UtilsError::LengthMismatch` if the columns differ in length.
pub fn convert_to_arrays(
    target: &[Option<f64>],
    features: &[&[Option<f64>]],
) -> Result<ModelArrays, UtilsError> {
    let mut all: Vec<&[Option<f64>]> = Vec::with_capacity(features.len() + 1);
    all.push(target);
    all.extend_from_slice(features);

    let rows = complete_rows(&all, target.len())?;
    let features = feature_matrix(features, &rows)?;
    let target: Array1<f64> = rows.iter().filter_map(|&i| target[i]).collect();

    Ok(ModelArrays { target, features, rows })
}
