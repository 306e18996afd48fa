use std::collections::HashMap;

use polars::prelude::*;
use tracing::{debug, info};

use crate::config::{IndicatorRole, IndicatorSpec};
use crate::error::PipelineError;
use crate::frame::{drop_columns, rename_columns, replace_text, require_column};
use crate::models::{
    CountryCodeEntry, INCOME_CODE_COLUMN, IncomeGroupEntry, IndicatorRecord, ReferenceData,
};
use crate::transform::{
    COUNTRY_CODE_COLUMN, JoinKind, SPATIAL_COLUMN, VALUE_COLUMN, constant_columns,
    default_column_renames, default_region_names, default_value_relabels, join,
    percent_to_fraction, resolve_spatial_names,
};

use super::FetchedIndicator;

/// Configuration for Stage 1 normalization
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// GHO field name -> output column name
    pub column_renames: Vec<(String, String)>,
    /// Category code -> readable label, applied to every text cell
    pub value_relabels: Vec<(String, String)>,
    /// Region / income-group code -> display name
    pub region_names: Vec<(String, String)>,
    /// Probability columns published by GHO as percentages
    pub percent_columns: Vec<String>,
    /// Bookkeeping columns removed from the probability table
    pub probability_drop_columns: Vec<String>,
    /// Bookkeeping columns removed from the guidelines table
    pub guideline_drop_columns: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            column_renames: default_column_renames(),
            value_relabels: default_value_relabels(),
            region_names: default_region_names(),
            percent_columns: vec![
                "Probability".to_string(),
                "Low".to_string(),
                "High".to_string(),
            ],
            probability_drop_columns: [
                "Id",
                "Date",
                "TimeDimensionBegin",
                "TimeDimensionEnd",
                "TimeDimensionValue",
                INCOME_CODE_COLUMN,
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            guideline_drop_columns: vec!["Id".to_string(), "Date".to_string()],
        }
    }
}

/// Result of Stage 1 normalization
#[derive(Debug, Clone)]
pub struct NormalizationResult {
    /// Probability frame with income groups attached
    pub probability: DataFrame,
    /// Guideline frames merged on `Spatial Dimension`, ordered by it
    pub guidelines: DataFrame,
    /// Constant columns removed from each indicator, by indicator code
    pub dropped_columns: Vec<(String, Vec<String>)>,
}

/// Normalize a single indicator's records.
///
/// Flattens, drops constant columns, renames and relabels, resolves spatial
/// codes to names, and renames `Value` to the role's column. Returns the frame
/// and the names of the constant columns that were removed.
pub fn normalize_indicator(
    records: &[IndicatorRecord],
    spec: &IndicatorSpec,
    refs: &ReferenceData,
    config: &NormalizeConfig,
) -> Result<(DataFrame, Vec<String>), PipelineError> {
    let flat = IndicatorRecord::flatten_all(records)?;
    let dropped = constant_columns(&flat)?;
    let relabels: HashMap<String, String> = config.value_relabels.iter().cloned().collect();

    let df = drop_columns(&flat, &dropped)?;
    let df = rename_columns(df, &config.column_renames)?;
    let df = replace_text(df, &relabels)?;
    let df = resolve_spatial_names(df, refs)?;
    let df = rename_columns(
        df,
        &[(VALUE_COLUMN.to_string(), spec.value_column().to_string())],
    )?;

    Ok((df, dropped))
}

/// Execute Stage 1: Normalize Indicators
///
/// Every indicator is normalized independently, then split by role: the
/// probability table is scaled to fractions and joined to income groups, and
/// the guideline tables are inner-joined on `Spatial Dimension`.
pub fn execute_stage1(
    indicators: &[FetchedIndicator],
    country_codes: &[CountryCodeEntry],
    income_groups: &[IncomeGroupEntry],
    config: &NormalizeConfig,
) -> Result<NormalizationResult, PipelineError> {
    let refs = ReferenceData::new(
        country_codes,
        config.region_names.iter().cloned().collect(),
        income_groups.to_vec(),
    );

    let mut probability: Option<DataFrame> = None;
    let mut guideline_tables: Vec<(&IndicatorSpec, DataFrame)> = Vec::new();
    let mut dropped_columns = Vec::new();

    for indicator in indicators {
        let (table, dropped) =
            normalize_indicator(&indicator.records, &indicator.spec, &refs, config)?;
        debug!(
            "{}: dropped constant columns {:?}",
            indicator.spec.code, dropped
        );
        info!(
            "{}: {} rows, {} columns after normalization",
            indicator.spec.code,
            table.height(),
            table.width()
        );
        dropped_columns.push((indicator.spec.code.clone(), dropped));

        match indicator.spec.role {
            IndicatorRole::Probability => {
                if probability.replace(table).is_some() {
                    return Err(PipelineError::Config(
                        "more than one probability indicator".to_string(),
                    ));
                }
            }
            IndicatorRole::Guideline { .. } => guideline_tables.push((&indicator.spec, table)),
        }
    }

    let probability = probability
        .ok_or_else(|| PipelineError::Config("no probability indicator".to_string()))?;
    let probability = finish_probability(probability, &refs, config)?;
    let guidelines = merge_guidelines(guideline_tables, config)?;

    info!(
        "Stage 1: probability table {} rows, guidelines table {} rows",
        probability.height(),
        guidelines.height()
    );

    Ok(NormalizationResult {
        probability,
        guidelines,
        dropped_columns,
    })
}

fn finish_probability(
    df: DataFrame,
    refs: &ReferenceData,
    config: &NormalizeConfig,
) -> Result<DataFrame, PipelineError> {
    let mut df = df;
    for column in &config.percent_columns {
        df = percent_to_fraction(df, column)?;
    }

    let income = IncomeGroupEntry::to_frame(&refs.income_groups)?;
    let df = join(
        &df,
        &income,
        &[(COUNTRY_CODE_COLUMN, INCOME_CODE_COLUMN)],
        JoinKind::Left,
    )?;

    drop_columns(&df, &config.probability_drop_columns)
}

/// Inner-join guideline frames on `Spatial Dimension`. Every frame must still
/// carry its flag column; one dropped as constant is an error.
fn merge_guidelines(
    tables: Vec<(&IndicatorSpec, DataFrame)>,
    config: &NormalizeConfig,
) -> Result<DataFrame, PipelineError> {
    let mut tables = tables.into_iter();
    let (first_spec, first) = tables
        .next()
        .ok_or_else(|| PipelineError::Config("no guideline indicators".to_string()))?;

    require_column(&first, first_spec.value_column())?;
    let mut merged = drop_columns(&first, &config.guideline_drop_columns)?;

    for (spec, table) in tables {
        require_column(&table, SPATIAL_COLUMN)?;
        require_column(&table, spec.value_column())?;
        let flags = table.select([SPATIAL_COLUMN, spec.value_column()])?;
        merged = join(
            &merged,
            &flags,
            &[(SPATIAL_COLUMN, SPATIAL_COLUMN)],
            JoinKind::Inner,
        )?;
    }

    Ok(merged.sort(
        [SPATIAL_COLUMN],
        SortMultipleOptions::default().with_maintain_order(true),
    )?)
}
