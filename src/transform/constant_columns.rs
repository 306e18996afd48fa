use polars::prelude::*;

use crate::error::PipelineError;
use crate::frame::drop_columns;

/// Names of columns holding at most one distinct value.
///
/// Null counts as a value of its own. A frame without rows reports every
/// column.
pub fn constant_columns(df: &DataFrame) -> Result<Vec<String>, PipelineError> {
    let mut constant = Vec::new();
    for column in df.get_columns() {
        if column.as_materialized_series().n_unique()? <= 1 {
            constant.push(column.name().to_string());
        }
    }
    Ok(constant)
}

/// Remove every constant column, keeping the order of the rest
pub fn drop_constant_columns(df: DataFrame) -> Result<DataFrame, PipelineError> {
    let constant = constant_columns(&df)?;
    if constant.is_empty() {
        return Ok(df);
    }
    drop_columns(&df, &constant)
}
