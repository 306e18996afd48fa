use std::path::PathBuf;

use crate::error::PipelineError;
use crate::models::GDP_PER_CAPITA_SERIES;

pub const GHO_API_BASE: &str = "https://ghoapi.azureedge.net/api/";
pub const IBAN_COUNTRY_CODES_URL: &str = "https://www.iban.com/country-codes";
pub const WORLD_BANK_COUNTRIES_URL: &str =
    "https://api.worldbank.org/v2/country?format=json&per_page=400";

/// What an indicator contributes to the outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorRole {
    /// The mortality probability series; becomes the probability table
    Probability,
    /// A guideline-presence indicator; its `Value` becomes `column` in the
    /// guidelines table
    Guideline { column: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSpec {
    /// GHO indicator code, e.g. "NCDMORT3070"
    pub code: String,
    pub role: IndicatorRole,
}

impl IndicatorSpec {
    pub fn probability(code: &str) -> Self {
        Self {
            code: code.to_string(),
            role: IndicatorRole::Probability,
        }
    }

    pub fn guideline(code: &str, column: &str) -> Self {
        Self {
            code: code.to_string(),
            role: IndicatorRole::Guideline {
                column: column.to_string(),
            },
        }
    }

    /// Name given to the indicator's `Value` column after normalization
    pub fn value_column(&self) -> &str {
        match &self.role {
            IndicatorRole::Probability => "Probability (Range)",
            IndicatorRole::Guideline { column } => column,
        }
    }
}

/// Everything a run needs to know. Built once and never mutated.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL the indicator code is appended to
    pub api_base: String,
    pub indicators: Vec<IndicatorSpec>,
    pub country_codes_url: String,
    pub income_groups_url: String,
    /// Local World Bank DataBank export holding the GDP series
    pub gdp_csv: PathBuf,
    pub gdp_series_code: String,
    pub output_dir: PathBuf,
    pub probability_file: String,
    pub guidelines_file: String,
    /// Where raw indicator responses are saved, if anywhere
    pub raw_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_base: GHO_API_BASE.to_string(),
            indicators: vec![
                IndicatorSpec::probability("NCDMORT3070"),
                IndicatorSpec::guideline(
                    "NCD_CCS_CRD_GUIDE",
                    "Has Chronic Respiratory Disease Guidelines?",
                ),
                IndicatorSpec::guideline("NCD_CCS_CANCER_GUIDE", "Has Cancer Guidelines?"),
                IndicatorSpec::guideline("NCD_CCS_DIAB_GUIDE", "Has Diabetes Guidelines?"),
                IndicatorSpec::guideline(
                    "NCD_CCS_CVD_GUIDE",
                    "Has Cardiovascular Disease Guidelines?",
                ),
            ],
            country_codes_url: IBAN_COUNTRY_CODES_URL.to_string(),
            income_groups_url: WORLD_BANK_COUNTRIES_URL.to_string(),
            gdp_csv: PathBuf::from("csv/wbi_gdp/gdp.csv"),
            gdp_series_code: GDP_PER_CAPITA_SERIES.to_string(),
            output_dir: PathBuf::from("csv"),
            probability_file: "df_probability.csv".to_string(),
            guidelines_file: "df_guidelines.csv".to_string(),
            raw_dir: None,
        }
    }
}

impl PipelineConfig {
    /// Check that exactly one indicator is the probability series and at
    /// least one is a guideline
    pub fn validate(&self) -> Result<(), PipelineError> {
        let probability = self
            .indicators
            .iter()
            .filter(|i| i.role == IndicatorRole::Probability)
            .count();
        if probability != 1 {
            return Err(PipelineError::Config(format!(
                "expected exactly one probability indicator, found {}",
                probability
            )));
        }
        if self.guideline_indicators().next().is_none() {
            return Err(PipelineError::Config(
                "at least one guideline indicator is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn guideline_indicators(&self) -> impl Iterator<Item = &IndicatorSpec> {
        self.indicators
            .iter()
            .filter(|i| matches!(i.role, IndicatorRole::Guideline { .. }))
    }

    /// Guideline flag column names, in configured order
    pub fn guideline_columns(&self) -> Vec<&str> {
        self.guideline_indicators().map(|i| i.value_column()).collect()
    }

    pub fn probability_path(&self) -> PathBuf {
        self.output_dir.join(&self.probability_file)
    }

    pub fn guidelines_path(&self) -> PathBuf {
        self.output_dir.join(&self.guidelines_file)
    }
}
