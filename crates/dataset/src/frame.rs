//! Column extraction helpers over `polars` frames.
//!
//! Everything is pulled out as `Option` vectors of the frame's height so that
//! callers can zip columns row by row without caring about physical dtypes.

use crate::error::DatasetError;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableFormat {
    Parquet,
    Csv,
}

impl TableFormat {
    pub(crate) fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("parquet") => Ok(TableFormat::Parquet),
            Some("csv") => Ok(TableFormat::Csv),
            _ => Err(DatasetError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub(crate) fn read_frame(path: &Path) -> Result<DataFrame, DatasetError> {
    let df = match TableFormat::from_path(path)? {
        TableFormat::Parquet => ParquetReader::new(File::open(path)?).finish()?,
        TableFormat::Csv => CsvReader::from_path(path)?.has_header(true).finish()?,
    };
    Ok(df)
}

pub(crate) fn write_frame(path: &Path, df: &mut DataFrame) -> Result<(), DatasetError> {
    let format = TableFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    match format {
        TableFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
        TableFormat::Csv => {
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
    }
    Ok(())
}

pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().contains(&name)
}

/// A float column; absent columns read as all-null.
pub(crate) fn optional_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DatasetError> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

pub(crate) fn optional_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DatasetError> {
    if !has_column(df, name) {
        return Ok(vec![None; df.height()]);
    }
    required_str(df, name)
}

pub(crate) fn required_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DatasetError> {
    let series = df
        .column(name)
        .map_err(|_| DatasetError::MissingColumn(name.to_string()))?
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Dates stored as `Date`, `Datetime` or ISO strings.
pub(crate) fn date_column(df: &DataFrame, name: &str, required: bool) -> Result<Vec<Option<NaiveDate>>, DatasetError> {
    let raw = if required {
        required_str(df, name)?
    } else {
        optional_str(df, name)?
    };
    Ok(raw
        .into_iter()
        .map(|v| v.as_deref().and_then(parse_date))
        .collect())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Names of numeric columns, in frame order, other than `excluded`.
pub(crate) fn numeric_columns(df: &DataFrame, excluded: &[&str]) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|s| s.dtype().is_numeric() && !excluded.contains(&s.name()))
        .map(|s| s.name().to_string())
        .collect()
}
