use anyhow::{Context, Result};
use tracing::info;

use crate::config::{IndicatorSpec, PipelineConfig};
use crate::io::{read_gdp_csv, write_raw_snapshot};
use crate::models::{CountryCodeEntry, IncomeGroupEntry, IndicatorRecord, WideGdpTable};
use crate::sources::SourceClient;

/// Records downloaded for one configured indicator
#[derive(Debug, Clone)]
pub struct FetchedIndicator {
    pub spec: IndicatorSpec,
    pub records: Vec<IndicatorRecord>,
}

/// Everything the transform stages consume
#[derive(Debug, Clone, Default)]
pub struct RawSources {
    pub indicators: Vec<FetchedIndicator>,
    pub country_codes: Vec<CountryCodeEntry>,
    pub income_groups: Vec<IncomeGroupEntry>,
    pub gdp: WideGdpTable,
}

/// Execute Stage 0: Fetch
///
/// Downloads each indicator in configured order, then the country code and
/// income group tables, then reads the local GDP export. Any failure aborts.
pub async fn execute_stage0(client: &SourceClient, config: &PipelineConfig) -> Result<RawSources> {
    let mut indicators = Vec::with_capacity(config.indicators.len());
    for spec in &config.indicators {
        info!("Fetching indicator {}", spec.code);
        let payload = client
            .fetch_indicator(&spec.code)
            .await
            .with_context(|| format!("Failed to fetch indicator {}", spec.code))?;

        if let Some(raw_dir) = &config.raw_dir {
            write_raw_snapshot(raw_dir, &spec.code, &payload.body)?;
        }

        info!("{}: {} records", spec.code, payload.response.value.len());
        indicators.push(FetchedIndicator {
            spec: spec.clone(),
            records: payload.response.value,
        });
    }

    info!("Fetching country codes from {}", config.country_codes_url);
    let country_codes = client
        .fetch_country_codes(&config.country_codes_url)
        .await
        .context("Failed to fetch country codes")?;
    info!("Loaded {} country codes", country_codes.len());

    info!("Fetching income groups from {}", config.income_groups_url);
    let income_groups = client
        .fetch_income_groups(&config.income_groups_url)
        .await
        .context("Failed to fetch income groups")?;
    info!("Loaded {} income classifications", income_groups.len());

    info!("Reading GDP export {:?}", config.gdp_csv);
    let gdp = read_gdp_csv(&config.gdp_csv)?;
    info!(
        "Loaded {} GDP rows across {} year columns",
        gdp.rows.len(),
        gdp.year_columns.len()
    );

    Ok(RawSources {
        indicators,
        country_codes,
        income_groups,
        gdp,
    })
}
