use serde::{Deserialize, Serialize};
use polars::prelude::*;
use serde_json::{Map, Value};

use crate::error::PipelineError;

/// OData envelope returned by the GHO API for one indicator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GhoResponse {
    #[serde(rename = "@odata.context", default)]
    pub context: Option<String>,
    pub value: Vec<IndicatorRecord>,
}

/// A single GHO observation.
///
/// Dimension fields hold category codes for some indicators and numbers for
/// others, so they stay as raw JSON values until flattened into cells.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndicatorRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub indicator_code: Value,
    #[serde(default)]
    pub spatial_dim_type: Value,
    #[serde(default)]
    pub spatial_dim: Value,
    #[serde(default)]
    pub time_dim_type: Value,
    #[serde(default)]
    pub parent_location_code: Value,
    #[serde(default)]
    pub parent_location: Value,
    #[serde(default)]
    pub time_dim: Value,
    #[serde(default)]
    pub dim1_type: Value,
    #[serde(default)]
    pub dim1: Value,
    #[serde(default)]
    pub dim2_type: Value,
    #[serde(default)]
    pub dim2: Value,
    #[serde(default)]
    pub dim3_type: Value,
    #[serde(default)]
    pub dim3: Value,
    #[serde(default)]
    pub data_source_dim_type: Value,
    #[serde(default)]
    pub data_source_dim: Value,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub numeric_value: Value,
    #[serde(default)]
    pub low: Value,
    #[serde(default)]
    pub high: Value,
    #[serde(default)]
    pub comments: Value,
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub time_dimension_value: Value,
    #[serde(default)]
    pub time_dimension_begin: Value,
    #[serde(default)]
    pub time_dimension_end: Value,
    /// Fields not known to this struct, kept so nothing is lost when flattening
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Column names of the known fields, in flattening order
pub const RECORD_COLUMNS: [&str; 25] = [
    "Id",
    "IndicatorCode",
    "SpatialDimType",
    "SpatialDim",
    "TimeDimType",
    "ParentLocationCode",
    "ParentLocation",
    "TimeDim",
    "Dim1Type",
    "Dim1",
    "Dim2Type",
    "Dim2",
    "Dim3Type",
    "Dim3",
    "DataSourceDimType",
    "DataSourceDim",
    "Value",
    "NumericValue",
    "Low",
    "High",
    "Comments",
    "Date",
    "TimeDimensionValue",
    "TimeDimensionBegin",
    "TimeDimensionEnd",
];

impl IndicatorRecord {
    fn known_fields(&self) -> [&Value; 25] {
        [
            &self.id,
            &self.indicator_code,
            &self.spatial_dim_type,
            &self.spatial_dim,
            &self.time_dim_type,
            &self.parent_location_code,
            &self.parent_location,
            &self.time_dim,
            &self.dim1_type,
            &self.dim1,
            &self.dim2_type,
            &self.dim2,
            &self.dim3_type,
            &self.dim3,
            &self.data_source_dim_type,
            &self.data_source_dim,
            &self.value,
            &self.numeric_value,
            &self.low,
            &self.high,
            &self.comments,
            &self.date,
            &self.time_dimension_value,
            &self.time_dimension_begin,
            &self.time_dimension_end,
        ]
    }

    /// Extra fields flattened to dotted paths
    fn flat_extra(&self) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        for (key, value) in &self.extra {
            flatten_value(key, value, &mut out);
        }
        out
    }

    /// Flatten a set of records into one frame.
    ///
    /// Known fields come first in `RECORD_COLUMNS` order, then extra fields in
    /// the order they are first seen. Records missing an extra field get null.
    pub fn flatten_all(records: &[IndicatorRecord]) -> Result<DataFrame, PipelineError> {
        let extras: Vec<Vec<(String, Value)>> = records.iter().map(|r| r.flat_extra()).collect();

        let mut extra_columns: Vec<String> = Vec::new();
        for (key, _) in extras.iter().flatten() {
            if !extra_columns.contains(key) {
                extra_columns.push(key.clone());
            }
        }

        let mut columns = Vec::with_capacity(RECORD_COLUMNS.len() + extra_columns.len());
        for (idx, name) in RECORD_COLUMNS.iter().enumerate() {
            let values: Vec<&Value> = records.iter().map(|r| r.known_fields()[idx]).collect();
            columns.push(json_column(name, &values));
        }
        for name in &extra_columns {
            let values: Vec<&Value> = extras
                .iter()
                .map(|extra| {
                    extra
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, v)| v)
                        .unwrap_or(&NULL)
                })
                .collect();
            columns.push(json_column(name, &values));
        }

        Ok(DataFrame::new(columns)?)
    }
}

static NULL: Value = Value::Null;

/// Build a column from JSON values, picking the narrowest dtype that holds
/// every non-null value: Int64, Float64, Boolean, else String.
fn json_column(name: &str, values: &[&Value]) -> Column {
    let name: PlSmallStr = name.into();
    let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();

    let series = if present.is_empty() {
        Series::full_null(name, values.len(), &DataType::String)
    } else if present.iter().all(|v| v.is_i64()) {
        let ints: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
        Series::new(name, ints)
    } else if present.iter().all(|v| v.is_number()) {
        let floats: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        Series::new(name, floats)
    } else if present.iter().all(|v| v.is_boolean()) {
        let flags: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
        Series::new(name, flags)
    } else {
        let texts: Vec<Option<String>> = values
            .iter()
            .map(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
            .collect();
        Series::new(name, texts)
    };
    series.into_column()
}

fn flatten_value(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, nested) in map {
                flatten_value(&format!("{}.{}", prefix, key), nested, out);
            }
        }
        other => out.push((prefix.to_string(), other.clone())),
    }
}
