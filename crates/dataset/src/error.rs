use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("No data found: {0}")]
    NotFound(String),

    #[error("A columnar read or write failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required column '{0}' is missing from the input table")]
    MissingColumn(String),

    #[error("Unsupported table format for '{0}' (expected .parquet or .csv)")]
    UnsupportedFormat(String),
}
