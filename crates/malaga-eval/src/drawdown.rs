//! Drawdown series and episode segmentation.
//!
//! The drawdown `D[t] = 1 - NAV[t] / max(NAV[..=t])` is exactly zero at every
//! new peak. The timeline is split at those zeros; every maximal run of
//! positive drawdown between two zeros (or between a zero and the end of the
//! series) is one [`DrawdownEpisode`].

use crate::nav::nav;
use malaga_table::{ReturnSeries, ReturnTable};
use malaga_traits::{Date, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A period under water between two peaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownEpisode {
    /// Date of the peak preceding the decline.
    pub start: Date,
    /// Date of the trough (first date of maximum drawdown).
    pub end: Date,
    /// Date the previous peak was regained; `None` while still under water.
    pub recovery: Option<Date>,
    /// Maximum drawdown within the episode, in `(0, 1)`.
    pub depth: f64,
    /// Number of dates with positive drawdown.
    pub duration: usize,
}

/// Drawdown from the running peak of a NAV series.
pub fn drawdown_series(navs: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    navs.iter()
        .map(|&v| {
            if v >= peak {
                peak = v;
            }
            1.0 - v / peak
        })
        .collect()
}

/// Splits a drawdown series into episodes, in chronological order.
///
/// `dates` and `drawdowns` must have equal length. Episodes that would start
/// before the first zero are anchored at the first date.
pub fn segment_episodes(dates: &[Date], drawdowns: &[f64]) -> Vec<DrawdownEpisode> {
    let n = dates.len().min(drawdowns.len());
    let mut episodes = Vec::new();
    let mut t = 0;
    while t < n {
        if drawdowns[t] <= 0.0 {
            t += 1;
            continue;
        }
        let start = dates[t.saturating_sub(1)];
        let begin = t;
        let mut trough = t;
        while t < n && drawdowns[t] > 0.0 {
            if drawdowns[t] > drawdowns[trough] {
                trough = t;
            }
            t += 1;
        }
        episodes.push(DrawdownEpisode {
            start,
            end: dates[trough],
            recovery: (t < n).then(|| dates[t]),
            depth: drawdowns[trough],
            duration: t - begin,
        });
    }
    episodes
}

/// All drawdown episodes of a return series, deepest first.
///
/// The series is compounded from its first value, so an anchored series
/// measures a loss on the first real date against a NAV of 1.0. Episodes of
/// equal depth keep their chronological order.
pub fn drawdown_episodes(series: &ReturnSeries) -> Vec<DrawdownEpisode> {
    let drawdowns = drawdown_series(&nav(&series.values));
    let mut episodes = segment_episodes(&series.dates, &drawdowns);
    episodes.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    episodes
}

/// The `n` deepest drawdown episodes.
pub fn worst_drawdowns(series: &ReturnSeries, n: usize) -> Vec<DrawdownEpisode> {
    let mut episodes = drawdown_episodes(series);
    episodes.truncate(n);
    episodes
}

/// Drawdown of every return column, one `{name}_dd` column each.
pub fn drawdown_table(table: &ReturnTable) -> Result<DataFrame> {
    let dates = table.dates();
    let mut columns: Vec<Column> = Vec::with_capacity(table.columns().len() + 1);
    columns.push(Series::new("date".into(), dates.to_vec()).into());
    for column in table.columns() {
        let series = table.series(&column.name)?;
        let drawdowns = drawdown_series(&nav(&series.values));
        let mut aligned: Vec<Option<f64>> = vec![None; dates.len()];
        let mut cursor = 0;
        for (date, dd) in series.dates.iter().zip(drawdowns) {
            while dates[cursor] < *date {
                cursor += 1;
            }
            aligned[cursor] = Some(dd);
        }
        columns.push(Series::new(format!("{}_dd", column.name).into(), aligned).into());
    }
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dates(n: usize) -> Vec<Date> {
        let first = Date::from_ymd_opt(2024, 1, 1).unwrap();
        first.iter_days().take(n).collect()
    }

    fn series(values: &[f64]) -> ReturnSeries {
        ReturnSeries {
            name: "x".to_string(),
            dates: dates(values.len()),
            values: values.to_vec(),
        }
    }

    #[test]
    fn test_drawdown_zero_at_peaks() {
        let navs = [1.0, 1.1, 1.0, 1.2, 0.9, 1.2];
        let dd = drawdown_series(&navs);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert_eq!(dd[3], 0.0);
        assert_eq!(dd[5], 0.0);
        assert_abs_diff_eq!(dd[2], 1.0 - 1.0 / 1.1, epsilon = 1e-12);
        assert_abs_diff_eq!(dd[4], 0.25, epsilon = 1e-12);
        assert!(dd.iter().all(|d| (0.0..1.0).contains(d)));
    }

    #[test]
    fn test_segmentation_partitions_the_timeline() {
        let returns = [0.0, 0.05, -0.1, -0.05, 0.2, 0.01, -0.02, 0.03, -0.01];
        let navs = nav(&returns);
        let dd = drawdown_series(&navs);
        let d = dates(returns.len());
        let episodes = segment_episodes(&d, &dd);

        let zeros = dd.iter().filter(|x| **x == 0.0).count();
        let total: usize = episodes.iter().map(|e| e.duration).sum();
        assert_eq!(total + zeros, returns.len());
    }

    #[test]
    fn test_episode_dates() {
        // peak on day 1, trough on day 3, recovery on day 4
        let returns = [0.0, 0.1, -0.1, -0.1, 0.5, -0.01];
        let d = dates(returns.len());
        let dd = drawdown_series(&nav(&returns));
        let episodes = segment_episodes(&d, &dd);

        assert_eq!(episodes.len(), 2);
        let first = &episodes[0];
        assert_eq!(first.start, d[1]);
        assert_eq!(first.end, d[3]);
        assert_eq!(first.recovery, Some(d[4]));
        assert_eq!(first.duration, 2);
        assert_abs_diff_eq!(first.depth, 0.19, epsilon = 1e-12);

        let open = &episodes[1];
        assert_eq!(open.start, d[4]);
        assert_eq!(open.recovery, None);
        assert_eq!(open.duration, 1);
    }

    #[test]
    fn test_trough_is_first_maximum() {
        let d = dates(5);
        let dd = [0.0, 0.2, 0.3, 0.3, 0.0];
        let episodes = segment_episodes(&d, &dd);
        assert_eq!(episodes[0].end, d[2]);
    }

    #[test]
    fn test_loss_on_first_real_date_is_a_drawdown() {
        let episodes = drawdown_episodes(&series(&[0.0, -0.1, 0.05]));
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].start, dates(1)[0]);
        assert_abs_diff_eq!(episodes[0].depth, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_worst_drawdowns_sorted_by_depth() {
        let returns = [0.0, -0.05, 0.2, -0.15, 0.3, -0.02, 0.1, -0.08];
        let worst = worst_drawdowns(&series(&returns), 3);
        assert_eq!(worst.len(), 3);
        assert!(worst.windows(2).all(|w| w[0].depth >= w[1].depth));
        assert_abs_diff_eq!(worst[0].depth, 0.15, epsilon = 1e-12);

        assert!(worst_drawdowns(&series(&returns), 0).is_empty());
        assert_eq!(worst_drawdowns(&series(&returns), 10).len(), 4);
    }

    #[test]
    fn test_no_drawdown() {
        assert!(drawdown_episodes(&series(&[0.0, 0.01, 0.02])).is_empty());
    }
}
