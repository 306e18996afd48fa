use std::path::Path;

use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

use crate::error::PipelineError;
use crate::models::{GDP_ID_COLUMNS, WideGdpRow, WideGdpTable};

/// Read a World Bank DataBank CSV export from disk
pub fn read_gdp_csv(path: &Path) -> Result<WideGdpTable> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read GDP file: {:?}", path))?;
    parse_gdp_csv(&bytes).with_context(|| format!("Failed to parse GDP file: {:?}", path))
}

/// Parse DataBank CSV bytes into the wide layout.
///
/// Exports are usually cp1252; the whole buffer is read as UTF-8 when it is
/// valid UTF-8 and as windows-1252 otherwise. Footer lines (source notes, "Last Updated") are ordinary short
/// records with an empty series code and are kept as rows here.
pub fn parse_gdp_csv(bytes: &[u8]) -> Result<WideGdpTable> {
    let encoding = detect_encoding(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()
        .context("Failed to read GDP header row")?
        .iter()
        .map(|h| decode(h, encoding))
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        position(name).ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    };
    let [name_col, code_col, series_name_col, series_code_col] = GDP_ID_COLUMNS;
    let code_idx = required(code_col)?;
    let series_code_idx = required(series_code_col)?;
    let name_idx = position(name_col);
    let series_name_idx = position(series_name_col);

    let year_indices: Vec<usize> = (0..headers.len())
        .filter(|i| !GDP_ID_COLUMNS.contains(&headers[*i].as_str()))
        .collect();

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .context("Failed to read GDP record")?
    {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(|b| decode(b, encoding).trim().to_string())
                .unwrap_or_default()
        };
        rows.push(WideGdpRow {
            country_name: field(name_idx),
            country_code: field(Some(code_idx)),
            series_name: field(series_name_idx),
            series_code: field(Some(series_code_idx)),
            values: year_indices.iter().map(|&i| field(Some(i))).collect(),
        });
    }

    Ok(WideGdpTable {
        year_columns: year_indices.iter().map(|&i| headers[i].clone()).collect(),
        rows,
    })
}

/// Save a raw indicator response as `<dir>/<code>.json`
pub fn write_raw_snapshot(dir: &Path, code: &str, body: &str) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {:?}", dir))?;
    let path = dir.join(format!("{}.json", code));
    std::fs::write(&path, body).with_context(|| format!("Failed to write file: {:?}", path))
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}

fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Country Name,Country Code,Series Name,Series Code,2019 [YR2019],2020 [YR2020]
United States,USA,GDP per capita (current US$),NY.GDP.PCAP.CD,65000.5,..
United States,USA,\"Population, total\",SP.POP.TOTL,328000000,331000000
,,,,,

Data from database: World Development Indicators,,,,,
Last Updated: 12/19/2023
";

    #[test]
    fn test_parse_gdp_csv() {
        let table = parse_gdp_csv(SAMPLE.as_bytes()).unwrap();

        assert_eq!(table.year_columns, vec!["2019 [YR2019]", "2020 [YR2020]"]);
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[0].country_code, "USA");
        assert_eq!(table.rows[0].series_code, "NY.GDP.PCAP.CD");
        assert_eq!(table.rows[0].values, vec!["65000.5", ".."]);
        assert_eq!(table.rows[1].series_name, "Population, total");
        // Short footer record pads missing year cells
        assert_eq!(table.rows[4].values, vec!["", ""]);
    }

    #[test]
    fn test_cp1252_names() {
        let mut bytes = b"Country Name,Country Code,Series Name,Series Code,2019 [YR2019]\n".to_vec();
        bytes.extend_from_slice(b"C\xf4te d'Ivoire,CIV,GDP,NY.GDP.PCAP.CD,2500\n");
        let table = parse_gdp_csv(&bytes).unwrap();
        assert_eq!(table.rows[0].country_code, "CIV");
        assert_eq!(table.rows[0].country_name, "Côte d'Ivoire");
    }

    #[test]
    fn test_utf8_names_with_bom() {
        let text = "\u{feff}Country Name,Country Code,Series Name,Series Code,2019 [YR2019]\n\
                    C\u{f4}te d'Ivoire,CIV,GDP,NY.GDP.PCAP.CD,2500\n";
        let table = parse_gdp_csv(text.as_bytes()).unwrap();
        assert_eq!(table.rows[0].country_name, "Côte d'Ivoire");
        assert_eq!(table.year_columns, vec!["2019 [YR2019]"]);
    }

    #[test]
    fn test_missing_series_code_column() {
        let err = parse_gdp_csv(b"Country Name,Country Code,2019 [YR2019]\nX,XXX,1\n").unwrap_err();
        assert!(err.to_string().contains("Series Code"));
    }

    #[test]
    fn test_read_gdp_csv_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gdp.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(read_gdp_csv(&path).unwrap().rows.len(), 5);

        let raw_dir = dir.path().join("raw");
        write_raw_snapshot(&raw_dir, "NCDMORT3070", "{\"value\": []}").unwrap();
        let saved = std::fs::read_to_string(raw_dir.join("NCDMORT3070.json")).unwrap();
        assert_eq!(saved, "{\"value\": []}");

        assert!(read_gdp_csv(&dir.path().join("missing.csv")).is_err());
    }
}
