use std::collections::HashMap;

use polars::prelude::*;

use crate::error::PipelineError;

/// One row of the ISO country code table
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCodeEntry {
    /// Display name, e.g. "United States of America (the)"
    pub country: String,
    pub alpha2: String,
    pub alpha3: String,
    pub numeric: String,
}

/// World Bank income classification for one economy
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeGroupEntry {
    /// ISO 3166 alpha-3 code
    pub code: String,
    pub income_group: String,
    pub region: String,
}

/// Column names used when income groups are joined onto indicator tables
pub const INCOME_CODE_COLUMN: &str = "Code";
pub const INCOME_GROUP_COLUMN: &str = "income classification";
pub const INCOME_REGION_COLUMN: &str = "region";

impl IncomeGroupEntry {
    /// Build a joinable frame with `Code`, `income classification`, `region`
    pub fn to_frame(entries: &[IncomeGroupEntry]) -> Result<DataFrame, PipelineError> {
        let codes: Vec<&str> = entries.iter().map(|e| e.code.as_str()).collect();
        let groups: Vec<&str> = entries.iter().map(|e| e.income_group.as_str()).collect();
        let regions: Vec<&str> = entries.iter().map(|e| e.region.as_str()).collect();
        Ok(df!(
            INCOME_CODE_COLUMN => codes,
            INCOME_GROUP_COLUMN => groups,
            INCOME_REGION_COLUMN => regions
        )?)
    }
}

/// Reference lookups used to turn spatial codes into display names
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    /// alpha-3 code -> country display name
    pub countries: HashMap<String, String>,
    /// WHO region / income group code -> display name
    pub regions: HashMap<String, String>,
    pub income_groups: Vec<IncomeGroupEntry>,
}

impl ReferenceData {
    pub fn new(
        country_codes: &[CountryCodeEntry],
        regions: HashMap<String, String>,
        income_groups: Vec<IncomeGroupEntry>,
    ) -> Self {
        let countries = country_codes
            .iter()
            .map(|e| (e.alpha3.clone(), e.country.clone()))
            .collect();
        Self {
            countries,
            regions,
            income_groups,
        }
    }

    /// Resolve a spatial code to a display name.
    ///
    /// Country-typed codes (and codes of unknown type) prefer the ISO table;
    /// region and income-group codes prefer the hand-maintained region table.
    /// Unknown codes resolve to `None`.
    pub fn display_name(&self, code: &str, spatial_type: Option<&str>) -> Option<&str> {
        let country = || self.countries.get(code).map(String::as_str);
        let region = || self.regions.get(code).map(String::as_str);
        match spatial_type {
            None | Some("COUNTRY") => country().or_else(region),
            Some(_) => region().or_else(country),
        }
    }
}
