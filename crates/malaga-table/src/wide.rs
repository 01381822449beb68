//! Wide-table builder.
//!
//! Pivots long-format `(date, asset, label, value)` observations into a dense
//! date×asset table with one column per label. Every column is tagged with its
//! [`Role`] so factor, target and benchmark series never collide when joined.

use malaga_traits::types::{date_from_epoch_days, date_from_yyyymmdd, parse_date};
use malaga_traits::{
    AssetId, Date, KeyColumns, Logger, LongFrame, MalagaError, Observation, Result, Role,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

/// Declares which columns of a long-format frame hold what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongSchema {
    /// Key columns.
    pub keys: KeyColumns,
    /// String column naming the series of each row.
    pub label: String,
    /// Floating-point column holding the value.
    pub value: String,
}

impl LongSchema {
    /// Creates a schema from explicit column names.
    pub fn new(keys: KeyColumns, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            keys,
            label: label.into(),
            value: value.into(),
        }
    }

    /// Derives the label and value columns from a frame's dtypes.
    ///
    /// The frame must contain the key columns plus exactly one `String` column
    /// and one floating-point column.
    pub fn infer(frame: &LongFrame, keys: &KeyColumns) -> Result<Self> {
        let key_names = [keys.date.as_str(), keys.asset.as_str()];
        let (label, value) = infer_label_value(frame.data(), &key_names)?;
        Ok(Self::new(keys.clone(), label, value))
    }
}

/// Declares the columns of long-format benchmark data `(date, label, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkSchema {
    /// Date column name.
    pub date: String,
    /// String column naming the benchmark.
    pub label: String,
    /// Floating-point column holding the return.
    pub value: String,
}

impl BenchmarkSchema {
    /// Creates a schema from explicit column names.
    pub fn new(
        date: impl Into<String>,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            label: label.into(),
            value: value.into(),
        }
    }

    /// Derives the label and value columns from a frame's dtypes.
    pub fn infer(frame: &LongFrame, date: &str) -> Result<Self> {
        let (label, value) = infer_label_value(frame.data(), &[date])?;
        Ok(Self::new(date, label, value))
    }
}

/// A label/role pair identifying one wide column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WideColumn {
    /// Original label from the long-format data.
    pub label: String,
    /// Role of the series.
    pub role: Role,
}

impl WideColumn {
    /// Creates a column descriptor.
    pub fn new(label: impl Into<String>, role: Role) -> Self {
        Self {
            label: label.into(),
            role,
        }
    }

    /// Tagged column name, e.g. `momentum__factor__`.
    pub fn name(&self) -> String {
        self.role.column_name(&self.label)
    }
}

/// Date range and density of a wide table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    /// First date.
    pub first: Date,
    /// Last date.
    pub last: Date,
    /// Number of `(date, asset)` rows.
    pub rows: usize,
    /// Number of columns, keys excluded.
    pub columns: usize,
    /// Number of distinct dates.
    pub days: usize,
    /// Average number of assets per date.
    pub avg_assets_per_day: f64,
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "from {} to {}, shape ({}, {}), days {}, avg assets per day {:.1}",
            self.first,
            self.last,
            self.rows,
            self.columns + 2,
            self.days,
            self.avg_assets_per_day
        )
    }
}

/// Dense date×asset table with role-tagged value columns.
///
/// Rows are unique `(date, asset)` pairs sorted ascending. Values are stored
/// column-major; a missing observation is `None`, never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    keys: Vec<(Date, AssetId)>,
    columns: Vec<WideColumn>,
    values: Vec<Vec<Option<f64>>>,
}

impl WideTable {
    /// Pivots a long-format frame on its label column.
    ///
    /// # Errors
    ///
    /// - [`MalagaError::MissingColumn`] when a declared column is absent
    /// - [`MalagaError::Schema`] when the frame does not have exactly the key
    ///   columns plus one label and one value column, when dtypes do not
    ///   match, or when an observation is duplicated
    pub fn pivot(frame: &LongFrame, schema: &LongSchema, role: Role) -> Result<Self> {
        let rows = LongRows::read(
            frame.data(),
            &schema.keys.date,
            Some(&schema.keys.asset),
            &schema.label,
            &schema.value,
        )?;

        let labels: Vec<String> = rows
            .labels
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        let label_index: BTreeMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        let mut cells: BTreeMap<(Date, AssetId), Vec<Option<f64>>> = BTreeMap::new();
        for i in 0..rows.len() {
            let asset = rows.assets[i].clone();
            let slot = cells
                .entry((rows.dates[i], asset))
                .or_insert_with(|| vec![None; labels.len()]);
            let j = label_index[rows.labels[i].as_str()];
            if slot[j].is_some() {
                return Err(MalagaError::Schema(format!(
                    "duplicate observation for ({}, {}, {})",
                    rows.dates[i], rows.assets[i], rows.labels[i]
                )));
            }
            slot[j] = rows.values[i];
        }

        let mut values = vec![Vec::with_capacity(cells.len()); labels.len()];
        let mut keys = Vec::with_capacity(cells.len());
        for (key, row) in cells {
            keys.push(key);
            for (column, value) in values.iter_mut().zip(row) {
                column.push(value);
            }
        }

        let columns = labels
            .into_iter()
            .map(|label| WideColumn::new(label, role))
            .collect();

        Ok(Self {
            keys,
            columns,
            values,
        })
    }

    /// Left-joins `other` onto this table on `(date, asset)`.
    ///
    /// Rows of `self` are kept as they are; values of `other` are looked up and
    /// become `None` where `other` has no matching row.
    pub fn left_join(mut self, other: &Self) -> Result<Self> {
        for column in &other.columns {
            if self.columns.contains(column) {
                return Err(MalagaError::Schema(format!(
                    "column '{}' exists on both sides of the join",
                    column.name()
                )));
            }
        }

        let matches: Vec<Option<usize>> = self
            .keys
            .iter()
            .map(|key| other.keys.binary_search(key).ok())
            .collect();

        for (column, other_values) in other.columns.iter().zip(&other.values) {
            let joined = matches
                .iter()
                .map(|m| m.and_then(|row| other_values[row]))
                .collect();
            self.columns.push(column.clone());
            self.values.push(joined);
        }
        Ok(self)
    }

    /// Number of `(date, asset)` rows.
    pub fn height(&self) -> usize {
        self.keys.len()
    }

    /// Returns whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Row keys in ascending order.
    pub fn keys(&self) -> &[(Date, AssetId)] {
        &self.keys
    }

    /// Column descriptors in storage order.
    pub fn columns(&self) -> &[WideColumn] {
        &self.columns
    }

    /// Labels of every column with the given role.
    pub fn labels(&self, role: Role) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.label.as_str())
            .collect()
    }

    /// Values of the column identified by `label` and `role`.
    pub fn values(&self, label: &str, role: Role) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|c| c.role == role && c.label == label)
            .map(|i| self.values[i].as_slice())
    }

    /// Like [`Self::values`], failing with `MissingColumn` when absent.
    pub fn require(&self, label: &str, role: Role) -> Result<&[Option<f64>]> {
        self.values(label, role)
            .ok_or_else(|| MalagaError::MissingColumn(role.column_name(label)))
    }

    /// Distinct dates in ascending order.
    pub fn dates(&self) -> Vec<Date> {
        self.partitions().into_iter().map(|(d, _)| d).collect()
    }

    /// Contiguous row ranges sharing a date, in date order.
    pub fn partitions(&self) -> Vec<(Date, Range<usize>)> {
        let mut partitions = Vec::new();
        let mut start = 0;
        for i in 1..=self.keys.len() {
            if i == self.keys.len() || self.keys[i].0 != self.keys[start].0 {
                partitions.push((self.keys[start].0, start..i));
                start = i;
            }
        }
        partitions
    }

    /// Date range and density summary. `None` for an empty table.
    pub fn coverage(&self) -> Option<Coverage> {
        let first = self.keys.first()?.0;
        let last = self.keys.last()?.0;
        let days = self.partitions().len();
        Some(Coverage {
            first,
            last,
            rows: self.keys.len(),
            columns: self.columns.len(),
            days,
            avg_assets_per_day: self.keys.len() as f64 / days as f64,
        })
    }

    /// Flattens the table back to long-format observations, skipping missing values.
    ///
    /// Observations are ordered by column, then by `(date, asset)`.
    pub fn flatten(&self) -> Vec<Observation> {
        let mut observations = Vec::new();
        for (column, values) in self.columns.iter().zip(&self.values) {
            for ((date, asset), value) in self.keys.iter().zip(values) {
                if let Some(value) = value {
                    observations.push(Observation {
                        date: *date,
                        asset: asset.clone(),
                        label: column.label.clone(),
                        role: column.role,
                        value: *value,
                    });
                }
            }
        }
        observations
    }

    /// Converts the table to a DataFrame with key columns followed by the
    /// tagged value columns.
    pub fn to_frame(&self, keys: &KeyColumns) -> Result<DataFrame> {
        let dates: Vec<Date> = self.keys.iter().map(|(d, _)| *d).collect();
        let assets: Vec<&str> = self.keys.iter().map(|(_, a)| a.as_str()).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 2);
        columns.push(Series::new(keys.date.as_str().into(), dates).into());
        columns.push(Series::new(keys.asset.as_str().into(), assets).into());
        for (column, values) in self.columns.iter().zip(&self.values) {
            columns.push(Series::new(column.name().into(), values.as_slice()).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Pivots factor and target observations and left-joins them, targets first.
///
/// Emits one summary line through `logger` with the date range, shape and
/// average per-date asset coverage.
///
/// # Errors
///
/// Schema violations from either input, or [`MalagaError::EmptyTable`] when the
/// targets contain no observations.
pub fn prepare(
    factors: &LongFrame,
    factor_schema: &LongSchema,
    targets: &LongFrame,
    target_schema: &LongSchema,
    logger: &dyn Logger,
) -> Result<WideTable> {
    let factor_table = WideTable::pivot(factors, factor_schema, Role::Factor)?;
    let target_table = WideTable::pivot(targets, target_schema, Role::Target)?;
    let full = target_table.left_join(&factor_table)?;

    let coverage = full
        .coverage()
        .ok_or_else(|| MalagaError::EmptyTable("no target observations".to_string()))?;
    logger.info(&format!("Full data prepared {coverage}"));
    Ok(full)
}

/// Market-level return series pivoted by label.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkTable {
    dates: Vec<Date>,
    labels: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl BenchmarkTable {
    /// Pivots long-format benchmark returns.
    pub fn from_frame(frame: &LongFrame, schema: &BenchmarkSchema) -> Result<Self> {
        let rows = LongRows::read(frame.data(), &schema.date, None, &schema.label, &schema.value)?;

        let labels: Vec<String> = rows
            .labels
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();

        let label_index: BTreeMap<&str, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();

        let mut cells: BTreeMap<Date, Vec<Option<f64>>> = BTreeMap::new();
        for i in 0..rows.len() {
            let j = label_index[rows.labels[i].as_str()];
            let slot = cells
                .entry(rows.dates[i])
                .or_insert_with(|| vec![None; labels.len()]);
            if slot[j].is_some() {
                return Err(MalagaError::Schema(format!(
                    "duplicate benchmark observation for ({}, {})",
                    rows.dates[i], rows.labels[i]
                )));
            }
            slot[j] = rows.values[i];
        }

        let mut values = vec![Vec::with_capacity(cells.len()); labels.len()];
        let mut dates = Vec::with_capacity(cells.len());
        for (date, row) in cells {
            dates.push(date);
            for (column, value) in values.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Ok(Self {
            dates,
            labels,
            values,
        })
    }

    /// Benchmark labels in column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Dates with at least one benchmark observation.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Value of benchmark `index` on `date`, if observed.
    pub fn value(&self, index: usize, date: Date) -> Option<f64> {
        let row = self.dates.binary_search(&date).ok()?;
        self.values.get(index)?.get(row).copied().flatten()
    }
}

/// Validated row-wise extraction of a long-format frame. Rows with a null
/// value are dropped; null keys or labels are schema errors.
struct LongRows {
    dates: Vec<Date>,
    assets: Vec<AssetId>,
    labels: Vec<String>,
    values: Vec<Option<f64>>,
}

impl LongRows {
    fn read(
        frame: &DataFrame,
        date: &str,
        asset: Option<&str>,
        label: &str,
        value: &str,
    ) -> Result<Self> {
        let n_keys = if asset.is_some() { 2 } else { 1 };
        if frame.width() != n_keys + 2 {
            return Err(MalagaError::Schema(format!(
                "expected {} columns ({} key columns, one label and one value column), got {}",
                n_keys + 2,
                n_keys,
                frame.width()
            )));
        }

        let label_column = require_column(frame, label)?;
        if label_column.dtype() != &DataType::String {
            return Err(MalagaError::Schema(format!(
                "label column '{label}' must be String, got {}",
                label_column.dtype()
            )));
        }
        let value_column = require_column(frame, value)?;
        if !matches!(value_column.dtype(), DataType::Float64 | DataType::Float32) {
            return Err(MalagaError::Schema(format!(
                "value column '{value}' must be Float64 or Float32, got {}",
                value_column.dtype()
            )));
        }

        let dates = read_dates(require_column(frame, date)?)?;
        let assets = match asset {
            Some(name) => read_strings(require_column(frame, name)?)?,
            None => vec![String::new(); frame.height()],
        };
        let labels = read_strings(label_column)?;
        let values = read_values(value_column)?;

        let mut rows = Self {
            dates: Vec::with_capacity(frame.height()),
            assets: Vec::with_capacity(frame.height()),
            labels: Vec::with_capacity(frame.height()),
            values: Vec::with_capacity(frame.height()),
        };
        for (((d, a), l), v) in dates.into_iter().zip(assets).zip(labels).zip(values) {
            if v.is_some() {
                rows.dates.push(d);
                rows.assets.push(a);
                rows.labels.push(l);
                rows.values.push(v);
            }
        }
        Ok(rows)
    }

    fn len(&self) -> usize {
        self.dates.len()
    }
}

fn infer_label_value(frame: &DataFrame, keys: &[&str]) -> Result<(String, String)> {
    if frame.width() != keys.len() + 2 {
        return Err(MalagaError::Schema(format!(
            "expected {} columns, got {}",
            keys.len() + 2,
            frame.width()
        )));
    }
    let mut label = None;
    let mut value = None;
    for column in frame.get_columns() {
        let name = column.name().as_str();
        if keys.contains(&name) {
            continue;
        }
        match column.dtype() {
            DataType::String => label = Some(name.to_string()),
            DataType::Float64 | DataType::Float32 => value = Some(name.to_string()),
            other => {
                return Err(MalagaError::Schema(format!(
                    "column '{name}' has unexpected type {other}"
                )));
            }
        }
    }
    match (label, value) {
        (Some(label), Some(value)) => Ok((label, value)),
        _ => Err(MalagaError::Schema(
            "expected one String label column and one floating-point value column".to_string(),
        )),
    }
}

fn require_column<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Column> {
    frame
        .column(name)
        .map_err(|_| MalagaError::MissingColumn(name.to_string()))
}

fn read_dates(column: &Column) -> Result<Vec<Date>> {
    let name = column.name().to_string();
    let series = column.as_materialized_series();
    let null_date = || MalagaError::Schema(format!("date column '{name}' contains nulls"));

    match series.dtype() {
        DataType::Date => series
            .date()?
            .into_iter()
            .map(|d: Option<i32>| {
                let days = d.ok_or_else(null_date)?;
                date_from_epoch_days(days)
                    .ok_or_else(|| MalagaError::InvalidDate(format!("{days} days since epoch")))
            })
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|s: Option<&str>| {
                let text = s.ok_or_else(null_date)?;
                parse_date(text).ok_or_else(|| MalagaError::InvalidDate(text.to_string()))
            })
            .collect(),
        dtype if dtype.is_integer() => {
            let cast = series.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v: Option<i64>| {
                    let raw = v.ok_or_else(null_date)?;
                    date_from_yyyymmdd(raw)
                        .ok_or_else(|| MalagaError::InvalidDate(raw.to_string()))
                })
                .collect()
        }
        other => Err(MalagaError::Schema(format!(
            "date column '{name}' must be Date, String or integer YYYYMMDD, got {other}"
        ))),
    }
}

fn read_strings(column: &Column) -> Result<Vec<String>> {
    let name = column.name().to_string();
    let series = column.as_materialized_series();
    if !(series.dtype() == &DataType::String || series.dtype().is_integer()) {
        return Err(MalagaError::Schema(format!(
            "column '{name}' must be String, got {}",
            series.dtype()
        )));
    }
    let cast = series.cast(&DataType::String)?;
    cast.str()?
        .into_iter()
        .map(|s: Option<&str>| {
            s.map(str::to_string)
                .ok_or_else(|| MalagaError::Schema(format!("column '{name}' contains nulls")))
        })
        .collect()
}

fn read_values(column: &Column) -> Result<Vec<Option<f64>>> {
    let cast = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v: Option<f64>| v.filter(|x| !x.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use malaga_traits::{Level, MemoryLogger};

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn factor_frame() -> LongFrame {
        df! {
            "date" => &["2024-01-02", "2024-01-02", "2024-01-02", "2024-01-03", "2024-01-03"],
            "code" => &["A", "B", "A", "A", "B"],
            "factor" => &["mom", "mom", "size", "mom", "mom"],
            "value" => &[1.0, 2.0, 10.0, 3.0, 4.0],
        }
        .unwrap()
        .into()
    }

    fn target_frame() -> LongFrame {
        df! {
            "date" => &["2024-01-02", "2024-01-02", "2024-01-02", "2024-01-03"],
            "code" => &["A", "B", "C", "A"],
            "target" => &["ret", "ret", "ret", "ret"],
            "value" => &[0.01, 0.02, 0.03, -0.01],
        }
        .unwrap()
        .into()
    }

    fn schema(label: &str) -> LongSchema {
        LongSchema::new(KeyColumns::default(), label, "value")
    }

    #[test]
    fn test_pivot_one_column_per_label() {
        let table = WideTable::pivot(&factor_frame(), &schema("factor"), Role::Factor).unwrap();
        assert_eq!(table.height(), 4);
        assert_eq!(table.labels(Role::Factor), vec!["mom", "size"]);
        assert_eq!(table.columns()[0].name(), "mom__factor__");
        assert_eq!(
            table.values("size", Role::Factor).unwrap(),
            &[Some(10.0), None, None, None]
        );
    }

    #[test]
    fn test_pivot_rejects_wrong_column_count() {
        let df = df! {
            "date" => &["2024-01-02"],
            "code" => &["A"],
            "factor" => &["mom"],
            "value" => &[1.0],
            "extra" => &[2.0],
        }
        .unwrap();
        let err = WideTable::pivot(&df.into(), &schema("factor"), Role::Factor).unwrap_err();
        assert!(matches!(err, MalagaError::Schema(_)));
    }

    #[test]
    fn test_pivot_rejects_wrong_types() {
        let df = df! {
            "date" => &["2024-01-02"],
            "code" => &["A"],
            "factor" => &["mom"],
            "value" => &[1i32],
        }
        .unwrap();
        let err = WideTable::pivot(&df.into(), &schema("factor"), Role::Factor).unwrap_err();
        assert!(matches!(err, MalagaError::Schema(_)));
    }

    #[test]
    fn test_pivot_rejects_duplicates() {
        let df = df! {
            "date" => &["2024-01-02", "2024-01-02"],
            "code" => &["A", "A"],
            "factor" => &["mom", "mom"],
            "value" => &[1.0, 2.0],
        }
        .unwrap();
        let err = WideTable::pivot(&df.into(), &schema("factor"), Role::Factor).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_integer_dates_are_yyyymmdd() {
        let df = df! {
            "date" => &[20240102i64, 20240103],
            "code" => &["A", "A"],
            "factor" => &["mom", "mom"],
            "value" => &[1.0, 2.0],
        }
        .unwrap();
        let table = WideTable::pivot(&df.into(), &schema("factor"), Role::Factor).unwrap();
        assert_eq!(table.dates(), vec![d(2), d(3)]);
    }

    #[test]
    fn test_prepare_left_joins_on_targets() {
        let logger = MemoryLogger::new();
        let full = prepare(
            &factor_frame(),
            &schema("factor"),
            &target_frame(),
            &schema("target"),
            &logger,
        )
        .unwrap();

        // Target rows are the anchor: C on 01-02 survives with missing factors,
        // B on 01-03 (factor only) is dropped.
        assert_eq!(full.height(), 4);
        assert_eq!(
            full.keys()[2],
            (d(2), "C".to_string())
        );
        assert_eq!(
            full.values("mom", Role::Factor).unwrap(),
            &[Some(1.0), Some(2.0), None, Some(3.0)]
        );
        assert_eq!(full.labels(Role::Target), vec!["ret"]);

        let info = logger.messages(Level::Info);
        assert_eq!(info.len(), 1);
        assert!(info[0].contains("from 2024-01-02 to 2024-01-03"));
    }

    #[test]
    fn test_flatten_round_trip() {
        let frame = factor_frame();
        let table = WideTable::pivot(&frame, &schema("factor"), Role::Factor).unwrap();

        let mut recovered: Vec<(Date, String, String, i64)> = table
            .flatten()
            .into_iter()
            .map(|o| (o.date, o.asset, o.label, (o.value * 1e6) as i64))
            .collect();
        recovered.sort();

        let mut original = vec![
            (d(2), "A".to_string(), "mom".to_string(), 1_000_000),
            (d(2), "B".to_string(), "mom".to_string(), 2_000_000),
            (d(2), "A".to_string(), "size".to_string(), 10_000_000),
            (d(3), "A".to_string(), "mom".to_string(), 3_000_000),
            (d(3), "B".to_string(), "mom".to_string(), 4_000_000),
        ];
        original.sort();
        assert_eq!(recovered, original);
    }

    #[test]
    fn test_partitions_follow_dates() {
        let table = WideTable::pivot(&factor_frame(), &schema("factor"), Role::Factor).unwrap();
        let partitions = table.partitions();
        assert_eq!(partitions, vec![(d(2), 0..2), (d(3), 2..4)]);
        let coverage = table.coverage().unwrap();
        assert_eq!(coverage.days, 2);
        assert!((coverage.avg_assets_per_day - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_schema_inference() {
        let schema = LongSchema::infer(&factor_frame(), &KeyColumns::default()).unwrap();
        assert_eq!(schema.label, "factor");
        assert_eq!(schema.value, "value");
    }

    #[test]
    fn test_to_frame_columns() {
        let table = WideTable::pivot(&factor_frame(), &schema("factor"), Role::Factor).unwrap();
        let df = table.to_frame(&KeyColumns::default()).unwrap();
        assert_eq!(df.height(), 4);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["date", "code", "mom__factor__", "size__factor__"]);
    }

    #[test]
    fn test_benchmark_table() {
        let df = df! {
            "date" => &["2024-01-02", "2024-01-03", "2024-01-03"],
            "index" => &["csi300", "csi300", "csi500"],
            "value" => &[0.01, -0.02, 0.005],
        }
        .unwrap();
        let frame: LongFrame = df.into();
        let schema = BenchmarkSchema::infer(&frame, "date").unwrap();
        let table = BenchmarkTable::from_frame(&frame, &schema).unwrap();

        assert_eq!(table.labels(), &["csi300".to_string(), "csi500".to_string()]);
        assert_eq!(table.value(0, d(3)), Some(-0.02));
        assert_eq!(table.value(1, d(2)), None);
        assert_eq!(table.value(0, d(4)), None);
    }
}
