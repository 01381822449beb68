//! Return-table assembly.
//!
//! Joins long/short, group and benchmark returns on date and seeds a zero row
//! one trading day before the first observation, so every NAV series starts at
//! 1.0 on the same date.

use crate::group::GroupReturns;
use crate::long_short::LongShortReturns;
use crate::wide::BenchmarkTable;
use malaga_traits::{Date, MalagaError, Result, Role, TradingCalendar};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Source of a return-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ColumnKind {
    /// Top-K portfolio.
    Long(usize),
    /// Bottom-K portfolio.
    Short(usize),
    /// Quantile group, 0-based.
    Group(usize),
    /// Benchmark series.
    Benchmark,
}

/// A named return-table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnColumn {
    /// Column name, e.g. `l_200`, `G10N03` or `csi300__benchmark__`.
    pub name: String,
    /// Column source.
    pub kind: ColumnKind,
}

/// Date-indexed return series with a leading zero-return anchor row.
///
/// Only [`assemble`] builds one, so the anchor row is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnTable {
    dates: Vec<Date>,
    columns: Vec<ReturnColumn>,
    values: Vec<Vec<Option<f64>>>,
}

/// One column of a return table with missing rows removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    /// Column name.
    pub name: String,
    /// Dates, anchor first.
    pub dates: Vec<Date>,
    /// Returns, `0.0` at the anchor.
    pub values: Vec<f64>,
}

impl ReturnSeries {
    /// Returns of the real rows, anchor excluded.
    pub fn returns(&self) -> &[f64] {
        self.values.get(1..).unwrap_or_default()
    }

    /// Dates of the real rows, anchor excluded.
    pub fn real_dates(&self) -> &[Date] {
        self.dates.get(1..).unwrap_or_default()
    }
}

impl ReturnTable {
    /// Dates including the anchor, ascending.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The synthetic anchor date.
    pub fn anchor(&self) -> Date {
        self.dates[0]
    }

    /// Dates of real observations.
    pub fn real_dates(&self) -> &[Date] {
        self.dates.get(1..).unwrap_or_default()
    }

    /// Columns in layout order.
    pub fn columns(&self) -> &[ReturnColumn] {
        &self.columns
    }

    /// Number of rows, anchor included.
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// Values of a column by name.
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Extracts one column as a series, dropping rows where it is missing.
    pub fn series(&self, name: &str) -> Result<ReturnSeries> {
        let values = self
            .column(name)
            .ok_or_else(|| MalagaError::MissingColumn(name.to_string()))?;
        let (dates, values) = self
            .dates
            .iter()
            .zip(values)
            .filter_map(|(d, v)| v.map(|v| (*d, v)))
            .unzip();
        Ok(ReturnSeries {
            name: name.to_string(),
            dates,
            values,
        })
    }

    /// Every column as a series, in layout order.
    pub fn all_series(&self) -> Result<Vec<ReturnSeries>> {
        self.columns.iter().map(|c| self.series(&c.name)).collect()
    }

    /// Converts to a DataFrame with a `date` column followed by every return
    /// column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Series::new("date".into(), self.dates.clone()).into());
        for (column, values) in self.columns.iter().zip(&self.values) {
            columns.push(Series::new(column.name.as_str().into(), values.as_slice()).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Builds the return table.
///
/// Group and long/short returns are inner-joined on date; benchmark returns
/// are left-joined. The anchor row is dated `calendar.previous_trading_day` of
/// the first joined date and holds `0.0` in every column.
///
/// # Errors
///
/// - [`MalagaError::EmptyTable`] when the join has no rows
/// - [`MalagaError::Calendar`] when the calendar has no earlier trading day
pub fn assemble(
    groups: &GroupReturns,
    long_short: &LongShortReturns,
    benchmarks: Option<&BenchmarkTable>,
    calendar: &dyn TradingCalendar,
) -> Result<ReturnTable> {
    let mut columns = Vec::new();
    for &k in &long_short.cutoffs {
        columns.push(ReturnColumn {
            name: LongShortReturns::long_label(k),
            kind: ColumnKind::Long(k),
        });
    }
    for &k in &long_short.cutoffs {
        columns.push(ReturnColumn {
            name: LongShortReturns::short_label(k),
            kind: ColumnKind::Short(k),
        });
    }
    for (i, label) in groups.labels.iter().enumerate() {
        columns.push(ReturnColumn {
            name: label.clone(),
            kind: ColumnKind::Group(i),
        });
    }
    if let Some(benchmarks) = benchmarks {
        for label in benchmarks.labels() {
            columns.push(ReturnColumn {
                name: Role::Benchmark.column_name(label),
                kind: ColumnKind::Benchmark,
            });
        }
    }

    // both inputs are sorted by date
    let mut joined: Vec<(usize, usize)> = Vec::new();
    let (mut g, mut l) = (0, 0);
    while g < groups.dates.len() && l < long_short.dates.len() {
        match groups.dates[g].cmp(&long_short.dates[l]) {
            std::cmp::Ordering::Less => g += 1,
            std::cmp::Ordering::Greater => l += 1,
            std::cmp::Ordering::Equal => {
                joined.push((g, l));
                g += 1;
                l += 1;
            }
        }
    }

    let first = joined
        .first()
        .map(|&(g, _)| groups.dates[g])
        .ok_or_else(|| MalagaError::EmptyTable("no dates common to group and long/short returns".to_string()))?;
    let anchor = calendar.previous_trading_day(first).ok_or_else(|| {
        MalagaError::Calendar(format!("no trading day before {first}"))
    })?;

    let mut dates = Vec::with_capacity(joined.len() + 1);
    dates.push(anchor);
    dates.extend(joined.iter().map(|&(g, _)| groups.dates[g]));

    let mut values: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    let anchored = |column: Vec<Option<f64>>| {
        let mut out = Vec::with_capacity(column.len() + 1);
        out.push(Some(0.0));
        out.extend(column);
        out
    };
    for legs in [&long_short.long, &long_short.short] {
        for leg in legs {
            values.push(anchored(joined.iter().map(|&(_, l)| leg[l]).collect()));
        }
    }
    for group in &groups.values {
        values.push(anchored(joined.iter().map(|&(g, _)| group[g]).collect()));
    }
    if let Some(benchmarks) = benchmarks {
        for i in 0..benchmarks.labels().len() {
            values.push(anchored(
                dates[1..].iter().map(|&d| benchmarks.value(i, d)).collect(),
            ));
        }
    }

    Ok(ReturnTable {
        dates,
        columns,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wide::BenchmarkSchema;
    use malaga_traits::{ListCalendar, LongFrame, WeekdayCalendar};

    fn date(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn groups(days: &[u32]) -> GroupReturns {
        GroupReturns {
            labels: vec!["G2N01".to_string(), "G2N02".to_string()],
            dates: days.iter().map(|&d| date(d)).collect(),
            values: vec![
                days.iter().map(|_| Some(-0.01)).collect(),
                days.iter().map(|_| Some(0.01)).collect(),
            ],
            dropped: Vec::new(),
        }
    }

    fn long_short(days: &[u32]) -> LongShortReturns {
        LongShortReturns {
            cutoffs: vec![1],
            dates: days.iter().map(|&d| date(d)).collect(),
            long: vec![days.iter().map(|_| Some(0.02)).collect()],
            short: vec![days.iter().map(|_| Some(-0.02)).collect()],
            shortfalls: Vec::new(),
        }
    }

    #[test]
    fn test_anchor_row_on_previous_trading_day() {
        // 2024-01-08 is a Monday; the anchor is the preceding Friday.
        let table = assemble(&groups(&[8, 9]), &long_short(&[8, 9]), None, &WeekdayCalendar::new()).unwrap();
        assert_eq!(table.anchor(), date(5));
        assert_eq!(table.dates(), &[date(5), date(8), date(9)]);
        assert_eq!(table.real_dates(), &[date(8), date(9)]);
        assert_eq!(table.height(), table.real_dates().len() + 1);
        for column in table.columns() {
            assert_eq!(table.column(&column.name).unwrap()[0], Some(0.0));
        }
    }

    #[test]
    fn test_column_layout() {
        let table = assemble(&groups(&[8]), &long_short(&[8]), None, &WeekdayCalendar::new()).unwrap();
        let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["l_1", "s_1", "G2N01", "G2N02"]);
        let df = table.to_frame().unwrap();
        assert_eq!(df.shape(), (2, 5));
    }

    #[test]
    fn test_inner_join_and_benchmark_left_join() {
        let bench: LongFrame = df! {
            "date" => &["2024-01-09"],
            "index" => &["mkt"],
            "value" => &[0.005],
        }
        .unwrap()
        .into();
        let bench = BenchmarkTable::from_frame(&bench, &BenchmarkSchema::new("date", "index", "value")).unwrap();

        let table = assemble(
            &groups(&[8, 9, 10]),
            &long_short(&[9, 10, 11]),
            Some(&bench),
            &WeekdayCalendar::new(),
        )
        .unwrap();
        assert_eq!(table.real_dates(), &[date(9), date(10)]);
        assert_eq!(table.anchor(), date(8));
        assert_eq!(
            table.column("mkt__benchmark__").unwrap(),
            &[Some(0.0), Some(0.005), None]
        );

        let series = table.series("mkt__benchmark__").unwrap();
        assert_eq!(series.dates, vec![date(8), date(9)]);
        assert_eq!(series.returns(), &[0.005]);
    }

    #[test]
    fn test_empty_join_fails() {
        let err = assemble(&groups(&[8]), &long_short(&[9]), None, &WeekdayCalendar::new()).unwrap_err();
        assert!(matches!(err, MalagaError::EmptyTable(_)));
    }

    #[test]
    fn test_calendar_without_previous_day_fails() {
        let calendar = ListCalendar::new([date(8), date(9)]);
        let err = assemble(&groups(&[8]), &long_short(&[8]), None, &calendar).unwrap_err();
        assert!(matches!(err, MalagaError::Calendar(_)));
    }
}
