/// Identifier columns of a World Bank DataBank export; every other column is a year
pub const GDP_ID_COLUMNS: [&str; 4] = ["Country Name", "Country Code", "Series Name", "Series Code"];

/// World Bank series code for GDP per capita in current US$
pub const GDP_PER_CAPITA_SERIES: &str = "NY.GDP.PCAP.CD";

/// A DataBank export in its native wide layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideGdpTable {
    /// Raw year column labels, e.g. "2019 [YR2019]"
    pub year_columns: Vec<String>,
    pub rows: Vec<WideGdpRow>,
}

/// One (country, series) row with raw cell text aligned to `year_columns`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideGdpRow {
    pub country_name: String,
    pub country_code: String,
    pub series_name: String,
    pub series_code: String,
    pub values: Vec<String>,
}

/// One (country, year) GDP observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongGdpRow {
    pub country_name: String,
    pub country_code: String,
    pub year: i32,
    /// Whole currency units
    pub gdp: i64,
}
