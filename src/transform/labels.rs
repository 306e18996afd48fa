use polars::prelude::*;

use crate::error::PipelineError;
use crate::frame::{has_column, text_values};
use crate::models::ReferenceData;

pub const SPATIAL_COLUMN: &str = "Spatial Dimension";
pub const SPATIAL_TYPE_COLUMN: &str = "Spatial Dimension Type";
pub const COUNTRY_CODE_COLUMN: &str = "Country Code";
pub const YEAR_COLUMN: &str = "Year";
pub const PROBABILITY_COLUMN: &str = "Probability";
pub const VALUE_COLUMN: &str = "Value";

/// GHO field names mapped to readable column names
pub fn default_column_renames() -> Vec<(String, String)> {
    [
        ("SpatialDim", SPATIAL_COLUMN),
        ("SpatialDimType", SPATIAL_TYPE_COLUMN),
        ("ParentLocation", "Continent"),
        ("TimeDim", YEAR_COLUMN),
        ("Dim1", "Gender"),
        ("NumericValue", PROBABILITY_COLUMN),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// GHO category codes mapped to readable labels
pub fn default_value_relabels() -> Vec<(String, String)> {
    [
        ("SEX_FMLE", "Female"),
        ("SEX_BTSX", "Both Sexes"),
        ("SEX_MLE", "Male"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// Display names for WHO regions and World Bank income aggregates
pub fn default_region_names() -> Vec<(String, String)> {
    [
        ("EUR", "WHO European Region"),
        ("EMR", "WHO Eastern Mediterranean Region"),
        ("WPR", "WHO Western Pacific Region"),
        ("AFR", "WHO African Region"),
        ("AMR", "WHO Region of the Americas"),
        ("SEAR", "WHO South-East Asia Region"),
        ("GLOBAL", "Global"),
        ("WB_HI", "High Income Region"),
        ("WB_LI", "Low Income Region"),
        ("WB_LMI", "Lower-Middle Income Region"),
        ("WB_UMI", "Upper-Middle Income Region"),
    ]
    .into_iter()
    .map(|(code, name)| (code.to_string(), name.to_string()))
    .collect()
}

/// Copy raw spatial codes into `Country Code` and replace `Spatial Dimension`
/// with display names.
///
/// Frames without a `Spatial Dimension` column are returned unchanged. Codes
/// neither lookup knows keep their raw value.
pub fn resolve_spatial_names(
    mut df: DataFrame,
    refs: &ReferenceData,
) -> Result<DataFrame, PipelineError> {
    if !has_column(&df, SPATIAL_COLUMN) {
        return Ok(df);
    }
    let codes = text_values(&df, SPATIAL_COLUMN)?;
    let types = if has_column(&df, SPATIAL_TYPE_COLUMN) {
        text_values(&df, SPATIAL_TYPE_COLUMN)?
    } else {
        vec![None; codes.len()]
    };

    let names: Vec<Option<String>> = codes
        .iter()
        .zip(&types)
        .map(|(code, kind)| {
            code.as_deref().map(|raw| {
                refs.display_name(raw, kind.as_deref())
                    .unwrap_or(raw)
                    .to_string()
            })
        })
        .collect();

    df.with_column(Series::new(COUNTRY_CODE_COLUMN.into(), codes))?;
    df.with_column(Series::new(SPATIAL_COLUMN.into(), names))?;
    Ok(df)
}

/// Divide a numeric column by 100. Nulls stay null; text is an error.
/// Frames without the column are returned unchanged.
pub fn percent_to_fraction(mut df: DataFrame, column: &str) -> Result<DataFrame, PipelineError> {
    let scaled = match df.column(column) {
        Err(_) => return Ok(df),
        Ok(values) => match values.dtype() {
            DataType::Int64 | DataType::Float64 => values
                .as_materialized_series()
                .cast(&DataType::Float64)?
                .f64()?
                .apply_values(|v| v / 100.0)
                .with_name(column.into())
                .into_series(),
            _ if values.null_count() == values.len() => return Ok(df),
            _ => {
                let value = text_values(&df, column)?
                    .into_iter()
                    .flatten()
                    .next()
                    .unwrap_or_default();
                return Err(PipelineError::NonNumeric {
                    column: column.to_string(),
                    value,
                });
            }
        },
    };
    df.with_column(scaled)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::frame::testing::*;
    use crate::frame::{column_names, replace_text};
    use crate::models::CountryCodeEntry;

    fn refs() -> ReferenceData {
        let codes = vec![CountryCodeEntry {
            country: "United States of America (the)".to_string(),
            alpha2: "US".to_string(),
            alpha3: "USA".to_string(),
            numeric: "840".to_string(),
        }];
        ReferenceData::new(&codes, default_region_names().into_iter().collect(), vec![])
    }

    #[test]
    fn test_resolve_spatial_names() {
        let df = df!(
            SPATIAL_COLUMN => ["USA", "EUR", "WB_LMI", "XKX"],
            SPATIAL_TYPE_COLUMN => ["COUNTRY", "REGION", "WORLDBANKINCOMEGROUP", "COUNTRY"]
        )
        .unwrap();

        let resolved = resolve_spatial_names(df, &refs()).unwrap();
        assert_eq!(
            column_names(&resolved),
            vec![SPATIAL_COLUMN, SPATIAL_TYPE_COLUMN, COUNTRY_CODE_COLUMN]
        );

        let names: Vec<Option<String>> = text_values(&resolved, SPATIAL_COLUMN).unwrap();
        assert_eq!(
            names,
            vec![
                Some("United States of America (the)".to_string()),
                Some("WHO European Region".to_string()),
                Some("Lower-Middle Income Region".to_string()),
                Some("XKX".to_string()),
            ]
        );
        assert_eq!(str_at(&resolved, COUNTRY_CODE_COLUMN, 1).as_deref(), Some("EUR"));
    }

    #[test]
    fn test_resolve_without_type_column() {
        let df = df!(SPATIAL_COLUMN => ["GLOBAL"]).unwrap();
        let resolved = resolve_spatial_names(df, &refs()).unwrap();
        assert_eq!(str_at(&resolved, SPATIAL_COLUMN, 0).as_deref(), Some("Global"));
    }

    #[test]
    fn test_resolve_without_spatial_column() {
        let df = df!("Value" => ["Yes"]).unwrap();
        let resolved = resolve_spatial_names(df.clone(), &refs()).unwrap();
        assert!(resolved.equals_missing(&df));
    }

    #[test]
    fn test_relabel_sex_codes() {
        let relabels: HashMap<String, String> = default_value_relabels().into_iter().collect();
        let df = replace_text(df!("Gender" => ["SEX_FMLE", "SEX_BTSX"]).unwrap(), &relabels).unwrap();
        assert_eq!(str_at(&df, "Gender", 0).as_deref(), Some("Female"));
        assert_eq!(str_at(&df, "Gender", 1).as_deref(), Some("Both Sexes"));
    }

    #[test]
    fn test_percent_to_fraction() {
        let df = df!(
            PROBABILITY_COLUMN => [Some(18.0), None, Some(50.0)],
            "Low" => [15i64, 10, 40]
        )
        .unwrap();
        let scaled = percent_to_fraction(df, PROBABILITY_COLUMN).unwrap();
        let scaled = percent_to_fraction(scaled, "Low").unwrap();
        assert_eq!(f64_at(&scaled, PROBABILITY_COLUMN, 0), Some(0.18));
        assert_eq!(f64_at(&scaled, PROBABILITY_COLUMN, 1), None);
        assert_eq!(f64_at(&scaled, PROBABILITY_COLUMN, 2), Some(0.5));
        assert_eq!(f64_at(&scaled, "Low", 0), Some(0.15));

        let untouched = percent_to_fraction(scaled.clone(), "High").unwrap();
        assert!(untouched.equals_missing(&scaled));

        let bad = df!(PROBABILITY_COLUMN => [None, Some("high")]).unwrap();
        assert!(matches!(
            percent_to_fraction(bad, PROBABILITY_COLUMN),
            Err(PipelineError::NonNumeric { value, .. }) if value == "high"
        ));
    }
}
