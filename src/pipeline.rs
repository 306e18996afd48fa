use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::sources::SourceClient;
use crate::stages::{
    NormalizeConfig, RawSources, Stage3Config, Stage3Result, execute_stage0, execute_stage1,
    execute_stage2, execute_stage3,
};

/// The two tables a run publishes
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub probability: DataFrame,
    pub guidelines: DataFrame,
}

/// Run stages 1 and 2 over already fetched sources
pub fn transform(
    raw: &RawSources,
    config: &PipelineConfig,
    normalize_config: &NormalizeConfig,
) -> Result<PipelineOutputs, PipelineError> {
    config.validate()?;

    let normalized = execute_stage1(
        &raw.indicators,
        &raw.country_codes,
        &raw.income_groups,
        normalize_config,
    )?;

    let joined = execute_stage2(&normalized.probability, &raw.gdp, &config.gdp_series_code)?;

    Ok(PipelineOutputs {
        probability: joined.table,
        guidelines: normalized.guidelines,
    })
}

/// Run the whole pipeline: fetch, transform, write
pub async fn run(config: &PipelineConfig) -> Result<Stage3Result> {
    config.validate()?;
    let client = SourceClient::new(&config.api_base)?;

    info!("Stage 0: Fetching sources...");
    let raw = execute_stage0(&client, config).await?;

    info!("Stages 1-2: Normalizing, reshaping and joining...");
    let outputs = transform(&raw, config, &NormalizeConfig::default())
        .context("Failed to transform fetched data")?;

    info!("Stage 3: Writing outputs...");
    execute_stage3(
        &outputs.probability,
        &outputs.guidelines,
        config,
        &Stage3Config::default(),
    )
}
