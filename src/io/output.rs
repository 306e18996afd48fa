use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Serialize;

/// Write a frame as comma-separated text with a header row.
///
/// Nulls become empty fields.
pub fn write_frame_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV to {:?}", path))?;
    Ok(())
}

/// Summary of a run, written next to the CSV outputs
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub generated_at: DateTime<Utc>,
    pub indicators: Vec<String>,
    pub gdp_series_code: String,
    pub probability_rows: usize,
    pub guideline_rows: usize,
    pub probability_columns: Vec<String>,
    pub guideline_columns: Vec<String>,
}

impl RunManifest {
    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_frame_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut df = df!(
            "Spatial Dimension" => ["Korea, Republic of", "Chad"],
            "Year" => [2019i64, 2019],
            "GDP" => [Some(31000i64), None]
        )
        .unwrap();

        write_frame_csv(&mut df, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "Spatial Dimension,Year,GDP\n\"Korea, Republic of\",2019,31000\nChad,2019,\n"
        );
    }

    #[test]
    fn test_write_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let manifest = RunManifest {
            generated_at: Utc::now(),
            indicators: vec!["NCDMORT3070".to_string()],
            gdp_series_code: "NY.GDP.PCAP.CD".to_string(),
            probability_rows: 3,
            guideline_rows: 2,
            probability_columns: vec!["Year".to_string()],
            guideline_columns: vec!["Spatial Dimension".to_string()],
        };
        manifest.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["probability_rows"], 3);
        assert_eq!(value["indicators"][0], "NCDMORT3070");
    }
}
