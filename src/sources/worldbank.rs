use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::models::IncomeGroupEntry;

/// Region value the World Bank API gives to aggregates such as "World"
const AGGREGATE_REGION: &str = "Aggregates";

#[derive(Debug, Deserialize)]
struct PageMeta {
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Country {
    id: String,
    region: Labelled,
    income_level: Labelled,
}

#[derive(Debug, Deserialize)]
struct Labelled {
    value: String,
}

/// Parse the `[page_meta, [country...]]` array returned by the World Bank
/// country endpoint into income classifications, skipping aggregates
pub fn parse_income_groups(body: &str) -> Result<Vec<IncomeGroupEntry>> {
    let (meta, countries): (PageMeta, Vec<Country>) =
        serde_json::from_str(body).context("Failed to parse World Bank country response")?;

    if let Some(total) = meta.total {
        if total as usize > countries.len() {
            warn!(
                "World Bank response is paginated: got {} of {} economies",
                countries.len(),
                total
            );
        }
    }

    Ok(countries
        .into_iter()
        .filter(|c| c.region.value.trim() != AGGREGATE_REGION)
        .map(|c| IncomeGroupEntry {
            code: c.id,
            income_group: c.income_level.value.trim().to_string(),
            region: c.region.value.trim().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_income_groups() {
        let body = r#"[
            {"page": 1, "pages": 1, "per_page": "400", "total": 3},
            [
                {"id": "USA", "iso2Code": "US", "name": "United States",
                 "region": {"id": "NAC", "iso2code": "XU", "value": "North America"},
                 "incomeLevel": {"id": "HIC", "iso2code": "XD", "value": "High income"}},
                {"id": "WLD", "iso2Code": "1W", "name": "World",
                 "region": {"id": "NA", "iso2code": "NA", "value": "Aggregates"},
                 "incomeLevel": {"id": "NA", "iso2code": "NA", "value": "Aggregates"}},
                {"id": "AFG", "iso2Code": "AF", "name": "Afghanistan",
                 "region": {"id": "SAS", "iso2code": "8S", "value": "South Asia "},
                 "incomeLevel": {"id": "LIC", "iso2code": "XM", "value": "Low income"}}
            ]
        ]"#;

        let groups = parse_income_groups(body).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].code, "USA");
        assert_eq!(groups[0].income_group, "High income");
        assert_eq!(groups[1].region, "South Asia");
    }

    #[test]
    fn test_error_payload_fails() {
        let body = r#"[{"message": [{"id": "120", "key": "Invalid value"}]}]"#;
        assert!(parse_income_groups(body).is_err());
    }
}
