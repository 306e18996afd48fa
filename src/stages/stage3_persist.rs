use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use polars::prelude::*;
use tracing::info;

use crate::config::PipelineConfig;
use crate::frame::{column_names, project};
use crate::io::{RunManifest, write_frame_csv};
use crate::transform::SPATIAL_COLUMN;

/// Column order of the probability CSV. Downstream dashboards bind to these names.
pub const PROBABILITY_OUTPUT_COLUMNS: [&str; 11] = [
    "Spatial Dimension",
    "Spatial Dimension Type",
    "Year",
    "Gender",
    "Probability",
    "Low",
    "High",
    "Country Code",
    "income classification",
    "region",
    "GDP",
];

pub const MANIFEST_FILE: &str = "manifest.json";

/// Configuration for Stage 3 persistence
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Whether to write `manifest.json` next to the tables
    pub write_manifest: bool,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            write_manifest: true,
        }
    }
}

/// Result of Stage 3 persistence
#[derive(Debug)]
pub struct Stage3Result {
    pub probability_path: PathBuf,
    pub guidelines_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
}

/// Column order of the guidelines CSV: `Spatial Dimension` then one flag per
/// guideline indicator
pub fn guideline_output_columns(config: &PipelineConfig) -> Vec<&str> {
    let mut columns = vec![SPATIAL_COLUMN];
    columns.extend(config.guideline_columns());
    columns
}

/// Execute Stage 3: Persist
///
/// Projects both tables onto their published column lists and writes them,
/// plus an optional run manifest, into the output directory.
pub fn execute_stage3(
    probability: &DataFrame,
    guidelines: &DataFrame,
    config: &PipelineConfig,
    stage_config: &Stage3Config,
) -> Result<Stage3Result> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create directory: {:?}", config.output_dir))?;

    let mut probability = project(probability, &PROBABILITY_OUTPUT_COLUMNS)?;
    let guideline_columns = guideline_output_columns(config);
    let mut guidelines = project(guidelines, &guideline_columns)?;

    let probability_path = config.probability_path();
    info!("Writing probability table to {:?}", probability_path);
    write_frame_csv(&mut probability, &probability_path)?;

    let guidelines_path = config.guidelines_path();
    info!("Writing guidelines table to {:?}", guidelines_path);
    write_frame_csv(&mut guidelines, &guidelines_path)?;

    let mut manifest_path = None;
    if stage_config.write_manifest {
        let path = config.output_dir.join(MANIFEST_FILE);
        let manifest = RunManifest {
            generated_at: Utc::now(),
            indicators: config.indicators.iter().map(|i| i.code.clone()).collect(),
            gdp_series_code: config.gdp_series_code.clone(),
            probability_rows: probability.height(),
            guideline_rows: guidelines.height(),
            probability_columns: column_names(&probability),
            guideline_columns: column_names(&guidelines),
        };
        manifest.write_json(&path)?;
        manifest_path = Some(path);
    }

    Ok(Stage3Result {
        probability_path,
        guidelines_path,
        manifest_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage3_writes_contract_columns() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().join("csv"),
            ..Default::default()
        };

        // Gender was dropped as constant upstream; it must still be in the header
        let probability = df!(
            "GDP" => [65000i64],
            "Spatial Dimension" => ["Chad"],
            "Year" => [2019i64],
            "Probability" => [0.18],
            "Country Code" => ["TCD"],
            "Extra" => ["ignored"]
        )
        .unwrap();
        let guidelines = df!(
            "Country Code" => ["TCD"],
            "Spatial Dimension" => ["Chad"],
            "Has Cancer Guidelines?" => ["Yes"]
        )
        .unwrap();

        let result =
            execute_stage3(&probability, &guidelines, &config, &Stage3Config::default()).unwrap();

        let written = std::fs::read_to_string(&result.probability_path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next().unwrap(), PROBABILITY_OUTPUT_COLUMNS.join(","));
        assert_eq!(lines.next().unwrap(), "Chad,,2019,,0.18,,,TCD,,,65000");

        let written = std::fs::read_to_string(&result.guidelines_path).unwrap();
        let header = written.lines().next().unwrap();
        assert_eq!(
            header,
            "Spatial Dimension,Has Chronic Respiratory Disease Guidelines?,Has Cancer Guidelines?,\
             Has Diabetes Guidelines?,Has Cardiovascular Disease Guidelines?"
        );
        assert_eq!(written.lines().nth(1).unwrap(), "Chad,,Yes,,");

        let manifest: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(result.manifest_path.unwrap()).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest["probability_rows"], 1);
        assert_eq!(manifest["probability_columns"][10], "GDP");
    }

    #[test]
    fn test_stage3_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let result = execute_stage3(
            &DataFrame::empty(),
            &DataFrame::empty(),
            &config,
            &Stage3Config {
                write_manifest: false,
            },
        )
        .unwrap();
        assert!(result.manifest_path.is_none());
        assert!(!dir.path().join(MANIFEST_FILE).exists());
        let written = std::fs::read_to_string(&result.probability_path).unwrap();
        assert_eq!(written.trim_end(), PROBABILITY_OUTPUT_COLUMNS.join(","));
    }
}
