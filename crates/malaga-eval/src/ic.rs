//! Information Coefficient (IC) calculations.
//!
//! The IC of a date is the cross-sectional Pearson correlation between factor
//! values and forward returns; the rank IC uses Spearman correlation instead.
//! Both are reported per date and per target, then summarized.

use malaga_table::{WideTable, cross_sections};
use malaga_traits::stats::{mean, pearson, safe_ratio, sample_std, spearman};
use malaga_traits::{Date, Result, Role};
use ndarray::Array1;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pearson correlation between factor values and forward returns.
///
/// Pairs where either side is not finite are ignored. `NaN` when fewer than
/// two pairs remain or either side is constant.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use malaga_eval::calculate_ic;
///
/// let factor = array![1.0, 2.0, 3.0, 4.0];
/// let returns = array![0.01, 0.02, 0.03, 0.04];
/// assert!((calculate_ic(&factor, &returns) - 1.0).abs() < 1e-10);
/// ```
pub fn calculate_ic(factor: &Array1<f64>, forward_returns: &Array1<f64>) -> f64 {
    let (x, y) = finite_pairs(factor, forward_returns);
    pearson(&x, &y)
}

/// Spearman rank correlation between factor values and forward returns.
pub fn calculate_rank_ic(factor: &Array1<f64>, forward_returns: &Array1<f64>) -> f64 {
    let (x, y) = finite_pairs(factor, forward_returns);
    spearman(&x, &y)
}

fn finite_pairs(x: &Array1<f64>, y: &Array1<f64>) -> (Vec<f64>, Vec<f64>) {
    if x.len() != y.len() {
        return (Vec::new(), Vec::new());
    }
    x.iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip()
}

/// Information Ratio: mean IC divided by the standard deviation of IC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationRatio {
    /// Mean IC
    pub mean_ic: f64,
    /// Standard deviation of IC
    pub std_ic: f64,
    /// Information Ratio
    pub ir: f64,
    /// Number of finite observations
    pub n_obs: usize,
}

impl InformationRatio {
    /// Calculates the ratio from an IC time series, ignoring `NaN` entries.
    pub fn calculate(ic_series: &[f64]) -> Self {
        let valid: Vec<f64> = ic_series.iter().copied().filter(|x| x.is_finite()).collect();
        let mean_ic = mean(&valid);
        let std_ic = sample_std(&valid);
        Self {
            mean_ic,
            std_ic,
            ir: safe_ratio(mean_ic, std_ic),
            n_obs: valid.len(),
        }
    }
}

/// Per-date IC and rank IC of one factor against every target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcTable {
    /// Factor label.
    pub factor: String,
    /// Target labels in column order.
    pub targets: Vec<String>,
    /// Dates in ascending order.
    pub dates: Vec<Date>,
    /// `ic[k][t]`: IC against `targets[k]` on `dates[t]`; `None` when undefined.
    pub ic: Vec<Vec<Option<f64>>>,
    /// Rank IC, laid out like `ic`.
    pub rank_ic: Vec<Vec<Option<f64>>>,
}

impl IcTable {
    /// Computes IC and rank IC of `factor` against every target of `wide`.
    pub fn calculate(wide: &WideTable, factor: &str) -> Result<Self> {
        let targets: Vec<String> = wide
            .labels(Role::Target)
            .into_iter()
            .map(str::to_string)
            .collect();
        let dates = wide.dates();

        let mut ic = Vec::with_capacity(targets.len());
        let mut rank_ic = Vec::with_capacity(targets.len());
        for target in &targets {
            let sections = cross_sections(wide, factor, target)?;
            let (pearson_ics, spearman_ics): (Vec<_>, Vec<_>) = sections
                .par_iter()
                .map(|section| {
                    let (x, y) = section.pairs();
                    let (x, y) = (Array1::from_vec(x), Array1::from_vec(y));
                    (
                        defined(calculate_ic(&x, &y)),
                        defined(calculate_rank_ic(&x, &y)),
                    )
                })
                .unzip();
            ic.push(pearson_ics);
            rank_ic.push(spearman_ics);
        }

        Ok(Self {
            factor: factor.to_string(),
            targets,
            dates,
            ic,
            rank_ic,
        })
    }

    /// Column name of the IC series for `target`.
    pub fn ic_label(target: &str) -> String {
        format!("IC_{target}")
    }

    /// Column name of the rank IC series for `target`.
    pub fn rank_ic_label(target: &str) -> String {
        format!("rankIC_{target}")
    }

    /// Summarizes every target.
    pub fn summary(&self) -> Vec<IcSummary> {
        self.targets
            .iter()
            .enumerate()
            .map(|(k, target)| IcSummary::calculate(target, &self.dates, &self.ic[k], &self.rank_ic[k]))
            .collect()
    }

    /// Converts to a DataFrame: `date`, then `IC_{t}` and `rankIC_{t}` per target.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(2 * self.targets.len() + 1);
        columns.push(Series::new("date".into(), self.dates.clone()).into());
        for (k, target) in self.targets.iter().enumerate() {
            columns.push(Series::new(Self::ic_label(target).into(), self.ic[k].as_slice()).into());
            columns.push(
                Series::new(Self::rank_ic_label(target).into(), self.rank_ic[k].as_slice()).into(),
            );
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Summary of the IC series of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcSummary {
    /// Target label.
    pub target: String,
    /// Mean IC.
    pub ic: f64,
    /// Mean rank IC.
    pub rank_ic: f64,
    /// Mean IC over its standard deviation.
    pub ir: f64,
    /// Mean rank IC over its standard deviation.
    pub rank_ir: f64,
    /// Fraction of dates with a positive IC.
    pub ic_hit_rate: f64,
    /// Dates with a defined IC.
    pub n_obs: usize,
    /// First date with a defined IC.
    pub begin: Option<Date>,
    /// Last date with a defined IC.
    pub end: Option<Date>,
}

impl IcSummary {
    fn calculate(target: &str, dates: &[Date], ic: &[Option<f64>], rank_ic: &[Option<f64>]) -> Self {
        let ics: Vec<f64> = ic.iter().flatten().copied().collect();
        let rank_ics: Vec<f64> = rank_ic.iter().flatten().copied().collect();
        let ir = InformationRatio::calculate(&ics);
        let rank_ir = InformationRatio::calculate(&rank_ics);

        let defined_dates: Vec<Date> = dates
            .iter()
            .zip(ic)
            .filter_map(|(d, v)| v.map(|_| *d))
            .collect();
        let ic_hit_rate = if ics.is_empty() {
            f64::NAN
        } else {
            ics.iter().filter(|v| **v > 0.0).count() as f64 / ics.len() as f64
        };

        Self {
            target: target.to_string(),
            ic: ir.mean_ic,
            rank_ic: rank_ir.mean_ic,
            ir: ir.ir,
            rank_ir: rank_ir.ir,
            ic_hit_rate,
            n_obs: ir.n_obs,
            begin: defined_dates.first().copied(),
            end: defined_dates.last().copied(),
        }
    }
}

/// Converts IC summaries to a DataFrame with one row per target.
pub fn summary_frame(summaries: &[IcSummary]) -> Result<DataFrame> {
    let float = |name: &str, f: fn(&IcSummary) -> f64| -> Column {
        Series::new(name.into(), summaries.iter().map(f).collect::<Vec<f64>>()).into()
    };
    let columns = vec![
        Series::new(
            "target".into(),
            summaries.iter().map(|s| s.target.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        float("IC", |s| s.ic),
        float("rankIC", |s| s.rank_ic),
        float("IR", |s| s.ir),
        float("rankIR", |s| s.rank_ir),
        float("IC_hit_rate", |s| s.ic_hit_rate),
        Series::new(
            "n_obs".into(),
            summaries.iter().map(|s| s.n_obs as u64).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "begin".into(),
            summaries.iter().map(|s| s.begin).collect::<Vec<Option<Date>>>(),
        )
        .into(),
        Series::new(
            "end".into(),
            summaries.iter().map(|s| s.end).collect::<Vec<Option<Date>>>(),
        )
        .into(),
    ];
    Ok(DataFrame::new(columns)?)
}

fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use malaga_table::{LongSchema, WideTable};
    use malaga_traits::{KeyColumns, LongFrame};
    use ndarray::array;

    #[test]
    fn test_calculate_ic_perfect_correlation() {
        let scores = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let returns = array![0.01, 0.02, 0.03, 0.04, 0.05];
        assert_abs_diff_eq!(calculate_ic(&scores, &returns), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(calculate_rank_ic(&scores, &returns), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_calculate_ic_negative_correlation() {
        let scores = array![5.0, 4.0, 3.0, 2.0, 1.0];
        let returns = array![0.01, 0.02, 0.03, 0.04, 0.05];
        assert_abs_diff_eq!(calculate_ic(&scores, &returns), -1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_calculate_ic_small_scale_inputs() {
        let scores = array![1e-7, 2e-7, 3e-7, 4e-7, 5e-7];
        let returns = array![0.01, 0.02, 0.03, 0.04, 0.05];
        assert_abs_diff_eq!(calculate_ic(&scores, &returns), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(calculate_ic(&returns, &scores), 1.0, epsilon = 1e-10);
        assert!(calculate_ic(&array![2e-7, 2e-7, 2e-7], &array![0.01, 0.02, 0.03]).is_nan());
    }

    #[test]
    fn test_rank_ic_differs_from_pearson() {
        let scores = array![1.0, 2.0, 3.0, 4.0];
        let returns = array![0.01, 0.02, 0.03, 1.0];
        assert_abs_diff_eq!(calculate_rank_ic(&scores, &returns), 1.0, epsilon = 1e-10);
        assert!(calculate_ic(&scores, &returns) < 0.99);
    }

    #[test]
    fn test_calculate_ic_with_nans() {
        let scores = array![1.0, 2.0, f64::NAN, 4.0];
        let returns = array![0.01, 0.02, 0.03, 0.04];
        assert_abs_diff_eq!(calculate_ic(&scores, &returns), 1.0, epsilon = 1e-10);
        assert!(calculate_ic(&array![1.0], &array![0.01]).is_nan());
    }

    #[test]
    fn test_information_ratio() {
        let ir = InformationRatio::calculate(&[0.05, f64::NAN, 0.03, 0.07]);
        assert_eq!(ir.n_obs, 3);
        assert_abs_diff_eq!(ir.mean_ic, 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(ir.std_ic, 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(ir.ir, 2.5, epsilon = 1e-9);
    }

    fn wide() -> WideTable {
        let days = ["2024-01-02", "2024-01-03"];
        let mut date = Vec::new();
        let mut code = Vec::new();
        let mut factor = Vec::new();
        let mut target = Vec::new();
        let mut fwd1 = Vec::new();
        for (t, day) in days.iter().enumerate() {
            for i in 0..5 {
                date.push(*day);
                code.push(format!("A{i}"));
                factor.push(i as f64);
                // first day perfectly aligned, second day perfectly reversed
                let sign = if t == 0 { 1.0 } else { -1.0 };
                fwd1.push(sign * i as f64 / 100.0);
                target.push("ret1");
            }
        }
        let factors: LongFrame = df! {
            "date" => &date,
            "code" => &code,
            "factor" => vec!["mom"; date.len()],
            "value" => &factor,
        }
        .unwrap()
        .into();
        let targets: LongFrame = df! {
            "date" => &date,
            "code" => &code,
            "target" => &target,
            "value" => &fwd1,
        }
        .unwrap()
        .into();
        let keys = KeyColumns::default();
        let f = WideTable::pivot(&factors, &LongSchema::new(keys.clone(), "factor", "value"), Role::Factor)
            .unwrap();
        WideTable::pivot(&targets, &LongSchema::new(keys, "target", "value"), Role::Target)
            .unwrap()
            .left_join(&f)
            .unwrap()
    }

    #[test]
    fn test_ic_table_and_summary() {
        let table = IcTable::calculate(&wide(), "mom").unwrap();
        assert_eq!(table.targets, vec!["ret1"]);
        assert_abs_diff_eq!(table.ic[0][0].unwrap(), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(table.ic[0][1].unwrap(), -1.0, epsilon = 1e-10);

        let summary = &table.summary()[0];
        assert_abs_diff_eq!(summary.ic, 0.0, epsilon = 1e-10);
        assert_eq!(summary.n_obs, 2);
        assert_abs_diff_eq!(summary.ic_hit_rate, 0.5, epsilon = 1e-12);

        let df = table.to_frame().unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["date", "IC_ret1", "rankIC_ret1"]);
        assert_eq!(summary_frame(&table.summary()).unwrap().height(), 1);
    }
}
