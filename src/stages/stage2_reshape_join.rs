use polars::prelude::*;
use tracing::info;

use crate::error::PipelineError;
use crate::frame::drop_missing;
use crate::models::WideGdpTable;
use crate::transform::{
    COUNTRY_CODE_COLUMN, JoinKind, PROBABILITY_COLUMN, YEAR_COLUMN, gdp_frame, join, reshape_gdp,
};

/// Result of Stage 2
#[derive(Debug, Clone)]
pub struct ReshapeJoinResult {
    /// Probability rows with GDP attached where available
    pub table: DataFrame,
    /// Rows produced by the GDP reshape
    pub gdp_rows: usize,
    /// Joined rows discarded because they had no probability
    pub rows_without_probability: usize,
}

/// Execute Stage 2: Reshape & Join
///
/// Melts the GDP export for `series_code`, full-outer-joins it with the
/// probability table on (`Year`, `Country Code`), orders by those keys and
/// drops every row that has no probability.
pub fn execute_stage2(
    probability: &DataFrame,
    gdp: &WideGdpTable,
    series_code: &str,
) -> Result<ReshapeJoinResult, PipelineError> {
    let long = reshape_gdp(gdp, series_code)?;
    info!("Reshaped {} GDP observations for {}", long.len(), series_code);
    let gdp = gdp_frame(&long)?;

    let joined = join(
        probability,
        &gdp,
        &[
            (YEAR_COLUMN, YEAR_COLUMN),
            (COUNTRY_CODE_COLUMN, COUNTRY_CODE_COLUMN),
        ],
        JoinKind::Outer,
    )?
    .sort(
        [YEAR_COLUMN, COUNTRY_CODE_COLUMN],
        SortMultipleOptions::default()
            .with_maintain_order(true)
            .with_nulls_last(true),
    )?;

    let joined_rows = joined.height();
    let table = drop_missing(&joined, PROBABILITY_COLUMN)?;
    let rows_without_probability = joined_rows - table.height();

    info!(
        "Stage 2: {} joined rows, {} kept, {} without probability dropped",
        joined_rows,
        table.height(),
        rows_without_probability
    );

    Ok(ReshapeJoinResult {
        table,
        gdp_rows: long.len(),
        rows_without_probability,
    })
}
