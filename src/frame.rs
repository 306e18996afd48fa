//! Small helpers over polars `DataFrame`s shared by the transform stages.

use std::collections::HashMap;

use polars::prelude::*;

use crate::error::PipelineError;

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, PipelineError> {
    df.column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// A column's values as text, with nulls kept as `None`
pub fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, PipelineError> {
    let column = require_column(df, name)?.cast(&DataType::String)?;
    let values = column
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Project onto `names` in the given order.
///
/// Columns the frame does not have become all-null text columns.
pub fn project(df: &DataFrame, names: &[&str]) -> Result<DataFrame, PipelineError> {
    let columns = names
        .iter()
        .map(|name| match df.column(name) {
            Ok(column) => column.clone(),
            Err(_) => Column::full_null((*name).into(), df.height(), &DataType::String),
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Drop the named columns. Absent names are ignored.
pub fn drop_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<DataFrame, PipelineError> {
    let keep: Vec<String> = column_names(df)
        .into_iter()
        .filter(|c| !names.iter().any(|n| n.as_ref() == c))
        .collect();
    Ok(df.select(keep)?)
}

/// Rename columns by `(from, to)` pairs. Absent names are ignored.
pub fn rename_columns(
    mut df: DataFrame,
    renames: &[(String, String)],
) -> Result<DataFrame, PipelineError> {
    for (from, to) in renames {
        if has_column(&df, from) {
            df.rename(from, to.as_str().into())?;
        }
    }
    Ok(df)
}

/// Replace whole text cells in every string column
pub fn replace_text(
    mut df: DataFrame,
    replacements: &HashMap<String, String>,
) -> Result<DataFrame, PipelineError> {
    let text_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect();

    for name in text_columns {
        let replaced: StringChunked = df
            .column(&name)?
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(|s| replacements.get(s).map(String::as_str).unwrap_or(s)))
            .collect();
        df.with_column(replaced.with_name(name.as_str().into()).into_series())?;
    }
    Ok(df)
}

/// Keep only rows where `name` is not null
pub fn drop_missing(df: &DataFrame, name: &str) -> Result<DataFrame, PipelineError> {
    let mask = require_column(df, name)?.is_not_null();
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
pub(crate) mod testing {
    use polars::prelude::*;

    pub fn str_at(df: &DataFrame, name: &str, row: usize) -> Option<String> {
        df.column(name)
            .ok()?
            .as_materialized_series()
            .str()
            .ok()?
            .get(row)
            .map(str::to_string)
    }

    pub fn i64_at(df: &DataFrame, name: &str, row: usize) -> Option<i64> {
        df.column(name).ok()?.as_materialized_series().i64().ok()?.get(row)
    }

    pub fn f64_at(df: &DataFrame, name: &str, row: usize) -> Option<f64> {
        df.column(name).ok()?.as_materialized_series().f64().ok()?.get(row)
    }

    /// Index of the first row whose text column `name` equals `value`
    pub fn row_where(df: &DataFrame, name: &str, value: &str) -> Option<usize> {
        df.column(name)
            .ok()?
            .as_materialized_series()
            .str()
            .ok()?
            .into_iter()
            .position(|v| v == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn sample() -> DataFrame {
        df!(
            "Code" => ["USA", "FRA", "DEU"],
            "Year" => [2020i64, 2019, 2019],
            "Value" => [Some(1.5), None, Some(2.0)]
        )
        .unwrap()
    }

    #[test]
    fn test_project_fills_absent_columns() {
        let projected = project(&sample(), &["Value", "Missing", "Code"]).unwrap();
        assert_eq!(column_names(&projected), vec!["Value", "Missing", "Code"]);
        assert_eq!(projected.column("Missing").unwrap().null_count(), 3);
        assert_eq!(str_at(&projected, "Code", 0).as_deref(), Some("USA"));
    }

    #[test]
    fn test_drop_columns_ignores_absent() {
        let df = drop_columns(&sample(), &["Year", "Nope"]).unwrap();
        assert_eq!(column_names(&df), vec!["Code", "Value"]);
        assert_eq!(df.height(), 3);
    }

    #[test]
    fn test_rename_and_replace_text() {
        let renames = vec![("Code".to_string(), "Country Code".to_string())];
        let replacements = HashMap::from([("USA".to_string(), "United States".to_string())]);
        let df = replace_text(rename_columns(sample(), &renames).unwrap(), &replacements).unwrap();
        assert_eq!(column_names(&df)[0], "Country Code");
        assert_eq!(str_at(&df, "Country Code", 0).as_deref(), Some("United States"));
        assert_eq!(str_at(&df, "Country Code", 1).as_deref(), Some("FRA"));
        assert_eq!(i64_at(&df, "Year", 0), Some(2020));
    }

    #[test]
    fn test_drop_missing() {
        let df = drop_missing(&sample(), "Value").unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(f64_at(&df, "Value", 1), Some(2.0));
        assert!(matches!(
            drop_missing(&sample(), "Nope"),
            Err(PipelineError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_text_values_casts_numbers() {
        let values = text_values(&sample(), "Year").unwrap();
        assert_eq!(values[0].as_deref(), Some("2020"));
        assert_eq!(row_where(&sample(), "Code", "DEU"), Some(2));
    }
}
