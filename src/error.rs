use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the table transforms.
///
/// Network and filesystem failures are reported through `anyhow` at the
/// stage level; these variants cover malformed data and bad configuration.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("malformed year label {label:?}: expected a leading 4-digit year")]
    YearLabel { label: String },

    #[error("non-numeric value {value:?} in column {column:?}")]
    NonNumeric { column: String, value: String },

    #[error("missing column {0:?}")]
    MissingColumn(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
