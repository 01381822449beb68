//! Common types used throughout the Malaga framework.
//!
//! This module defines the observation model (dates, asset identifiers and the
//! role a numeric series plays) and the `LongFrame` container for long-format
//! input data.

use derive_more::Display;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Days between 0001-01-01 (CE) and 1970-01-01, the offset between chrono's
/// day numbering and the epoch-based storage of polars `Date` columns.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// An asset identifier, such as a ticker or exchange code.
pub type AssetId = String;

/// The role a numeric series plays in an analysis.
///
/// Roles keep column names from different inputs apart when they are joined:
/// every wide column carries the role suffix after its label.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A per-asset score used to rank assets.
    #[display("factor")]
    Factor,
    /// A forward return used to evaluate a factor.
    #[display("target")]
    Target,
    /// A market-level return series.
    #[display("benchmark")]
    Benchmark,
}

impl Role {
    /// Column-name suffix for this role.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Factor => "__factor__",
            Self::Target => "__target__",
            Self::Benchmark => "__benchmark__",
        }
    }

    /// Builds the tagged column name for a label.
    pub fn column_name(self, label: &str) -> String {
        format!("{label}{}", self.suffix())
    }

    /// Splits a tagged column name back into its label and role.
    pub fn parse_column_name(name: &str) -> Option<(&str, Self)> {
        [Self::Factor, Self::Target, Self::Benchmark]
            .into_iter()
            .find_map(|role| name.strip_suffix(role.suffix()).map(|label| (label, role)))
    }
}

/// A single numeric reading for one asset on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date.
    pub date: Date,
    /// Asset the value belongs to.
    pub asset: AssetId,
    /// Series label, e.g. `momentum` or `ret_5d`.
    pub label: String,
    /// Role of the series.
    pub role: Role,
    /// The value.
    pub value: f64,
}

/// Names of the key columns in long-format input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyColumns {
    /// Date column name.
    pub date: String,
    /// Asset identifier column name.
    pub asset: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            asset: "code".to_string(),
        }
    }
}

/// Container for long-format observations.
///
/// `LongFrame` wraps a Polars DataFrame holding `(date, asset, label, value)`
/// rows for asset-level series, or `(date, label, value)` rows for benchmarks.
/// Column names are declared separately through a schema, see
/// `malaga_table::LongSchema`.
#[derive(Debug, Clone)]
pub struct LongFrame {
    data: DataFrame,
}

impl LongFrame {
    /// Creates a new `LongFrame` from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Returns the column names.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }
}

impl From<DataFrame> for LongFrame {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for LongFrame {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// Converts days since the Unix epoch (polars `Date` storage) to a date.
pub fn date_from_epoch_days(days: i32) -> Option<Date> {
    Date::from_num_days_from_ce_opt(days.checked_add(CE_TO_UNIX_EPOCH_DAYS)?)
}

/// Converts a date to days since the Unix epoch.
pub fn date_to_epoch_days(date: Date) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS
}

/// Converts an integer in `YYYYMMDD` form to a date.
pub fn date_from_yyyymmdd(value: i64) -> Option<Date> {
    let year = i32::try_from(value / 10_000).ok()?;
    let month = u32::try_from((value / 100) % 100).ok()?;
    let day = u32::try_from(value % 100).ok()?;
    Date::from_ymd_opt(year, month, day)
}

/// Parses a date written as `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();
    Date::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| Date::parse_from_str(text, "%Y%m%d"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_role_suffixes_are_distinct() {
        assert_eq!(Role::Factor.column_name("mom"), "mom__factor__");
        assert_eq!(Role::Target.column_name("ret"), "ret__target__");
        assert_eq!(Role::Benchmark.column_name("csi300"), "csi300__benchmark__");
        assert_eq!(Role::Target.to_string(), "target");
    }

    #[test]
    fn test_parse_column_name() {
        assert_eq!(
            Role::parse_column_name("ret_5d__target__"),
            Some(("ret_5d", Role::Target))
        );
        assert_eq!(Role::parse_column_name("plain"), None);
    }

    #[test]
    fn test_long_frame_from_dataframe() {
        let df = df! {
            "date" => &["2024-01-02", "2024-01-02"],
            "code" => &["A", "B"],
            "factor" => &["mom", "mom"],
            "value" => &[1.0, 2.0],
        }
        .unwrap();

        let frame = LongFrame::from(df);
        assert_eq!(frame.len(), 2);
        assert!(frame.has_column("code"));
        assert!(!frame.has_column("symbol"));
        assert_eq!(frame.columns().len(), 4);
    }

    #[test]
    fn test_epoch_day_round_trip() {
        let date = Date::from_ymd_opt(2024, 3, 15).unwrap();
        let days = date_to_epoch_days(date);
        assert_eq!(date_from_epoch_days(days), Some(date));
        assert_eq!(date_from_epoch_days(0), Date::from_ymd_opt(1970, 1, 1));
    }

    #[test]
    fn test_date_parsing() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));
        assert_eq!(parse_date("20240115"), Some(date));
        assert_eq!(date_from_yyyymmdd(20240115), Some(date));
        assert!(parse_date("15/01/2024").is_none());
        assert!(date_from_yyyymmdd(20241345).is_none());
    }

    #[test]
    fn test_key_columns_default() {
        let keys = KeyColumns::default();
        assert_eq!(keys.date, "date");
        assert_eq!(keys.asset, "code");
    }
}
