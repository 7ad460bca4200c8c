//! Conversions between polars frames and plain vectors.

use polars::prelude::*;

use crate::UtilsError;

/// Extract a numeric column as nullable floats.
///
/// NaN and infinite values are reported as missing.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` if the column does not exist, or a
/// polars error if it cannot be read as `Float64`.
pub fn extract_column(df: &DataFrame, col_name: &str) -> Result<Vec<Option<f64>>, UtilsError> {
    let column =
        df.column(col_name).map_err(|_| UtilsError::MissingColumn(col_name.to_string()))?;

    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?.into_iter().map(|v| v.filter(|x| x.is_finite())).collect();

    Ok(values)
}

/// Build a nullable `Float64` column.
#[must_use]
pub fn float_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::new(name.into(), values)
}

/// Build a nullable `Int32` column.
#[must_use]
pub fn int_column(name: &str, values: Vec<Option<i32>>) -> Column {
    Column::new(name.into(), values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_column_maps_nan_to_missing() {
        let df = df! {
            "ta" => &[Some(1.0), None, Some(f64::NAN), Some(4.0)],
        }
        .unwrap();

        let values = extract_column(&df, "ta").unwrap();
        assert_eq!(values, vec![Some(1.0), None, None, Some(4.0)]);
    }

    #[test]
    fn extract_column_casts_integers() {
        let df = df! { "n" => &[1i32, 2, 3] }.unwrap();
        let values = extract_column(&df, "n").unwrap();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn extract_column_missing() {
        let df = df! { "a" => &[1.0] }.unwrap();
        assert!(matches!(extract_column(&df, "b"), Err(UtilsError::MissingColumn(_))));
    }

    #[test]
    fn float_column_roundtrip() {
        let column = float_column("x", vec![Some(1.5), None]);
        let df = DataFrame::new(vec![column]).unwrap();
        assert_eq!(extract_column(&df, "x").unwrap(), vec![Some(1.5), None]);
    }
}
