//! Cross-sectional quantile grouping.
//!
//! Each date is ranked by factor and split into `N` buckets of near-equal
//! size. Tied factor values never straddle a boundary: a bucket whose break
//! value equals an earlier one stays empty and its assets fall into the
//! earlier bucket.

use crate::section::CrossSection;
use malaga_traits::{Date, Logger, MalagaError, Result};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do with a date that has fewer ranked assets than groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientDataPolicy {
    /// Fail with `InsufficientData`, naming every offending date.
    #[default]
    Fail,
    /// Drop the date, record it and log a warning.
    Skip,
}

/// Grouper configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Number of quantile groups.
    pub n_groups: usize,
    /// Handling of under-populated dates.
    pub policy: InsufficientDataPolicy,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            n_groups: 10,
            policy: InsufficientDataPolicy::Fail,
        }
    }
}

impl GroupingConfig {
    /// Creates a configuration with `n_groups` groups and the default policy.
    pub fn new(n_groups: usize) -> Self {
        Self {
            n_groups,
            ..Self::default()
        }
    }

    /// Sets the insufficient-data policy.
    pub const fn with_policy(mut self, policy: InsufficientDataPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Label of group `index` (0-based) out of `n`: `group_label(10, 0) == "G10N01"`.
pub fn group_label(n: usize, index: usize) -> String {
    format!("G{n}N{:02}", index + 1)
}

/// Assigns each of the ascending `sorted` values to one of `n` buckets.
///
/// Positions are split as `floor(p·n/m)`. The break of a bucket is the value
/// at its last position, and a value goes to the first bucket whose break is
/// not below it, so equal values always share a bucket.
pub fn assign_buckets(sorted: &[f64], n: usize) -> Vec<usize> {
    let m = sorted.len();
    if m == 0 || n == 0 {
        return Vec::new();
    }

    let mut breaks: Vec<f64> = Vec::with_capacity(n);
    for p in 0..m {
        let bucket = p * n / m;
        if bucket < breaks.len() {
            breaks[bucket] = sorted[p];
        } else {
            // buckets skipped when m < n inherit the previous break
            while breaks.len() < bucket {
                let last = breaks.last().copied().unwrap_or(f64::NEG_INFINITY);
                breaks.push(last);
            }
            breaks.push(sorted[p]);
        }
    }

    sorted
        .iter()
        .map(|v| breaks.partition_point(|b| b < v))
        .collect()
}

/// A date left out of the output for lack of assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedDate {
    /// The dropped date.
    pub date: Date,
    /// Ranked assets available.
    pub available: usize,
    /// Assets required.
    pub required: usize,
}

/// Mean forward return per quantile group and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReturns {
    /// Group labels, lowest factor bucket first.
    pub labels: Vec<String>,
    /// Output dates in ascending order.
    pub dates: Vec<Date>,
    /// `values[g][t]`: mean return of group `g` on `dates[t]`; `None` for an
    /// empty bucket.
    pub values: Vec<Vec<Option<f64>>>,
    /// Dates dropped under [`InsufficientDataPolicy::Skip`].
    pub dropped: Vec<DroppedDate>,
}

impl GroupReturns {
    /// Converts to a DataFrame with a `date` column followed by one column per
    /// group.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.labels.len() + 1);
        columns.push(Series::new("date".into(), self.dates.clone()).into());
        for (label, values) in self.labels.iter().zip(&self.values) {
            columns.push(Series::new(label.as_str().into(), values.as_slice()).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Computes per-date mean forward returns of `config.n_groups` quantile groups.
///
/// # Errors
///
/// - [`MalagaError::InvalidConfig`] when `n_groups` is zero
/// - [`MalagaError::InsufficientData`] under [`InsufficientDataPolicy::Fail`]
///   when any date ranks fewer assets than groups
pub fn group_returns(
    sections: &[CrossSection],
    config: &GroupingConfig,
    logger: &dyn Logger,
) -> Result<GroupReturns> {
    let n = config.n_groups;
    if n == 0 {
        return Err(MalagaError::InvalidConfig(
            "number of groups must be positive".to_string(),
        ));
    }

    let short: Vec<DroppedDate> = sections
        .iter()
        .filter(|s| s.len() < n)
        .map(|s| DroppedDate {
            date: s.date,
            available: s.len(),
            required: n,
        })
        .collect();

    if !short.is_empty() {
        let listing = short
            .iter()
            .map(|d| format!("{} ({} < {})", d.date, d.available, d.required))
            .collect::<Vec<_>>()
            .join(", ");
        match config.policy {
            InsufficientDataPolicy::Fail => {
                return Err(MalagaError::InsufficientData(format!(
                    "fewer assets than {n} groups on {} date(s): {listing}",
                    short.len()
                )));
            }
            InsufficientDataPolicy::Skip => {
                logger.warn(&format!(
                    "Dropped {} date(s) with fewer assets than {n} groups: {listing}",
                    short.len()
                ));
            }
        }
    }

    let rows: Vec<(Date, Vec<Option<f64>>)> = sections
        .par_iter()
        .filter(|s| s.len() >= n)
        .map(|section| (section.date, bucket_means(section, n)))
        .collect();

    let mut values = vec![Vec::with_capacity(rows.len()); n];
    let mut dates = Vec::with_capacity(rows.len());
    for (date, means) in rows {
        dates.push(date);
        for (column, mean) in values.iter_mut().zip(means) {
            column.push(mean);
        }
    }

    Ok(GroupReturns {
        labels: (0..n).map(|i| group_label(n, i)).collect(),
        dates,
        values,
        dropped: short,
    })
}

fn bucket_means(section: &CrossSection, n: usize) -> Vec<Option<f64>> {
    let buckets = assign_buckets(&section.factors(), n);
    // buckets are non-decreasing along the ranked members
    (0..n)
        .map(|b| {
            let start = buckets.partition_point(|&x| x < b);
            let end = buckets.partition_point(|&x| x <= b);
            section.mean_target(start..end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Member;
    use approx::assert_abs_diff_eq;
    use malaga_traits::{Level, MemoryLogger, NullLogger};
    use rstest::rstest;

    fn date(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn section(day: u32, factors: &[f64]) -> CrossSection {
        let members = factors
            .iter()
            .enumerate()
            .map(|(i, &f)| Member {
                asset: format!("A{i:03}"),
                factor: f,
                target: Some(i as f64 / 100.0),
            })
            .collect();
        CrossSection::new(date(day), members, 0)
    }

    #[test]
    fn test_group_label_format() {
        assert_eq!(group_label(10, 0), "G10N01");
        assert_eq!(group_label(10, 9), "G10N10");
        assert_eq!(group_label(5, 2), "G5N03");
    }

    #[rstest]
    #[case(10, 3)]
    #[case(10, 10)]
    #[case(11, 3)]
    #[case(103, 10)]
    #[case(7, 7)]
    fn test_bucket_sizes_differ_by_at_most_one(#[case] m: usize, #[case] n: usize) {
        let sorted: Vec<f64> = (0..m).map(|i| i as f64).collect();
        let buckets = assign_buckets(&sorted, n);
        let mut sizes = vec![0usize; n];
        for b in buckets {
            sizes[b] += 1;
        }
        assert_eq!(sizes.iter().sum::<usize>(), m);
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max - min <= 1, "sizes {sizes:?}");
    }

    #[test]
    fn test_ties_are_never_split() {
        // Positional breaks: [1, 1, 3]; the tie at 1.0 spans the first boundary.
        let sorted = [1.0, 1.0, 1.0, 1.0, 2.0, 3.0];
        let buckets = assign_buckets(&sorted, 3);
        assert_eq!(buckets, vec![0, 0, 0, 0, 2, 2]);
    }

    #[test]
    fn test_group_returns_means() {
        let sections = vec![section(2, &[1.0, 2.0, 3.0, 4.0]), section(3, &[4.0, 3.0, 2.0, 1.0])];
        let result = group_returns(&sections, &GroupingConfig::new(2), &NullLogger).unwrap();

        assert_eq!(result.labels, vec!["G2N01", "G2N02"]);
        assert_eq!(result.dates, vec![date(2), date(3)]);
        // Date 2: low factor assets are A000, A001 -> mean(0.00, 0.01)
        assert_abs_diff_eq!(result.values[0][0].unwrap(), 0.005, epsilon = 1e-12);
        assert_abs_diff_eq!(result.values[1][0].unwrap(), 0.025, epsilon = 1e-12);
        // Date 3: ranking is reversed
        assert_abs_diff_eq!(result.values[0][1].unwrap(), 0.025, epsilon = 1e-12);
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn test_merged_bucket_is_missing() {
        let sections = vec![section(2, &[1.0, 1.0, 1.0, 2.0])];
        let result = group_returns(&sections, &GroupingConfig::new(2), &NullLogger).unwrap();
        assert!(result.values[0][0].is_some());
        assert!(result.values[1][0].is_some());

        let sections = vec![section(2, &[1.0, 1.0, 1.0, 1.0])];
        let result = group_returns(&sections, &GroupingConfig::new(2), &NullLogger).unwrap();
        assert_abs_diff_eq!(result.values[0][0].unwrap(), 0.015, epsilon = 1e-12);
        assert_eq!(result.values[1][0], None);
    }

    #[test]
    fn test_insufficient_data_fails_by_default() {
        let sections = vec![section(2, &[1.0, 2.0, 3.0]), section(3, &[1.0])];
        let err = group_returns(&sections, &GroupingConfig::new(3), &NullLogger).unwrap_err();
        assert!(matches!(err, MalagaError::InsufficientData(_)));
        assert!(err.to_string().contains("2024-01-03"));
    }

    #[test]
    fn test_insufficient_data_skip_is_reported() {
        let logger = MemoryLogger::new();
        let sections = vec![section(2, &[1.0, 2.0, 3.0]), section(3, &[1.0])];
        let config = GroupingConfig::new(3).with_policy(InsufficientDataPolicy::Skip);
        let result = group_returns(&sections, &config, &logger).unwrap();

        assert_eq!(result.dates, vec![date(2)]);
        assert_eq!(
            result.dropped,
            vec![DroppedDate {
                date: date(3),
                available: 1,
                required: 3
            }]
        );
        assert_eq!(logger.messages(Level::Warn).len(), 1);
    }

    #[test]
    fn test_zero_groups_is_invalid() {
        let err = group_returns(&[], &GroupingConfig::new(0), &NullLogger).unwrap_err();
        assert!(matches!(err, MalagaError::InvalidConfig(_)));
    }

    #[test]
    fn test_to_frame() {
        let sections = vec![section(2, &[1.0, 2.0])];
        let result = group_returns(&sections, &GroupingConfig::new(2), &NullLogger).unwrap();
        let df = result.to_frame().unwrap();
        assert_eq!(df.shape(), (1, 3));
    }
}
