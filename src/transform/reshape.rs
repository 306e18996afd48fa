use polars::prelude::*;

use crate::error::PipelineError;
use crate::models::{LongGdpRow, WideGdpTable};

/// Cell texts DataBank uses for "no data"
pub const MISSING_MARKERS: [&str; 2] = ["", ".."];

/// Column names of the long GDP table fed into the join
pub const GDP_COLUMNS: [&str; 3] = ["Country Code", "Year", "GDP"];

/// Parse the year out of a DataBank column label such as "2019 [YR2019]".
///
/// The label must start with four ASCII digits.
pub fn parse_year_label(label: &str) -> Result<i32, PipelineError> {
    let malformed = || PipelineError::YearLabel {
        label: label.to_string(),
    };
    let prefix = label
        .trim_start()
        .get(..4)
        .filter(|p| p.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(malformed)?;
    prefix.parse().map_err(|_| malformed())
}

/// Parse one GDP cell. `Ok(None)` for missing markers.
///
/// Values are truncated toward zero to whole currency units.
pub fn parse_gdp_value(raw: &str, column: &str) -> Result<Option<i64>, PipelineError> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return Ok(None);
    }
    let value: f64 = trimmed.parse().map_err(|_| PipelineError::NonNumeric {
        column: column.to_string(),
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(PipelineError::NonNumeric {
            column: column.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(Some(value.trunc() as i64))
}

/// Unpivot the rows of `series_code` into one row per (country, year).
///
/// Year labels are validated before any row is looked at, so a malformed
/// header fails even when no row matches the series. Rows of other series are
/// discarded before reshaping, and missing values produce no output row.
pub fn reshape_gdp(
    wide: &WideGdpTable,
    series_code: &str,
) -> Result<Vec<LongGdpRow>, PipelineError> {
    let years = wide
        .year_columns
        .iter()
        .map(|label| parse_year_label(label))
        .collect::<Result<Vec<_>, _>>()?;

    let mut long = Vec::new();
    for row in wide.rows.iter().filter(|r| r.series_code == series_code) {
        for ((year, label), raw) in years.iter().zip(&wide.year_columns).zip(&row.values) {
            if let Some(gdp) = parse_gdp_value(raw, label)? {
                long.push(LongGdpRow {
                    country_name: row.country_name.clone(),
                    country_code: row.country_code.clone(),
                    year: *year,
                    gdp,
                });
            }
        }
    }

    Ok(long)
}

/// Convert reshaped rows into a `Country Code`, `Year`, `GDP` frame
pub fn gdp_frame(rows: &[LongGdpRow]) -> Result<DataFrame, PipelineError> {
    let [code_column, year_column, gdp_column] = GDP_COLUMNS;
    let codes: Vec<&str> = rows.iter().map(|r| r.country_code.as_str()).collect();
    let years: Vec<i64> = rows.iter().map(|r| i64::from(r.year)).collect();
    let gdp: Vec<i64> = rows.iter().map(|r| r.gdp).collect();
    Ok(df!(
        code_column => codes,
        year_column => years,
        gdp_column => gdp
    )?)
}
