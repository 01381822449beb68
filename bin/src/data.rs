//! Data loading utilities for the Malaga CLI.

use anyhow::{Context, Result};
use malaga_eval::ReportConfig;
use malaga_traits::types::parse_date;
use malaga_traits::{KeyColumns, ListCalendar, LongFrame, MalagaError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Reads a long-format CSV file.
///
/// Key columns are read as text so asset codes keep their leading zeros.
/// Integer value columns are widened to `Float64`.
pub(crate) fn load_long(path: &Path, keys: &[&str]) -> Result<LongFrame> {
    let overwrite: Schema = keys
        .iter()
        .map(|name| Field::new((*name).into(), DataType::String))
        .collect();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(Arc::new(overwrite)))
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        if !keys.contains(&column.name().as_str()) && column.dtype().is_integer() {
            columns.push(column.cast(&DataType::Float64)?);
        } else {
            columns.push(column.clone());
        }
    }
    Ok(DataFrame::new(columns)?.into())
}

/// Reads a trading calendar: a CSV file whose first column lists trading dates.
pub(crate) fn load_calendar(path: &Path) -> Result<ListCalendar> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.into()))?
        .finish()
        .with_context(|| format!("failed to read {}", path.display()))?;

    let column = df
        .get_columns()
        .first()
        .ok_or_else(|| MalagaError::EmptyTable(format!("{} has no columns", path.display())))?;
    let mut days = Vec::with_capacity(df.height());
    for value in column.as_materialized_series().str()?.into_iter().flatten() {
        let day = parse_date(value).ok_or_else(|| MalagaError::InvalidDate(value.to_string()))?;
        days.push(day);
    }
    Ok(ListCalendar::new(days))
}

/// Loads a report configuration from a TOML file, or the defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    let Some(path) = path else {
        return Ok(ReportConfig::default());
    };
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .build()
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(settings.try_deserialize::<ReportConfig>()?)
}

/// Writes a DataFrame as CSV to `dir/name.csv`.
pub(crate) fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.csv"));
    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    tracing::info!(path = %path.display(), rows = df.height(), "Wrote table");
    Ok(())
}

/// Resolves key column names, flags taking precedence over configuration.
pub(crate) fn key_columns(
    base: &KeyColumns,
    date: Option<&str>,
    asset: Option<&str>,
) -> KeyColumns {
    KeyColumns {
        date: date.map_or_else(|| base.date.clone(), str::to_string),
        asset: asset.map_or_else(|| base.asset.clone(), str::to_string),
    }
}
