//! Return statistics.
//!
//! Every statistic is a pure reduction over a return series. Ratios with a
//! zero or undefined denominator are `NaN`, never an error.

use crate::drawdown::drawdown_episodes;
use malaga_table::{ReturnSeries, ReturnTable};
use malaga_traits::stats::{mean, safe_ratio, sample_std};
use malaga_traits::{Date, MalagaError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the statistics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Number of periods per year used for annualization.
    pub annualization: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            annualization: 252.0,
        }
    }
}

impl StatsConfig {
    /// Creates a configuration with the given annualization factor.
    pub const fn new(annualization: f64) -> Self {
        Self { annualization }
    }

    /// Rejects non-positive or non-finite annualization factors.
    pub fn validate(&self) -> Result<()> {
        if !(self.annualization.is_finite() && self.annualization > 0.0) {
            return Err(MalagaError::InvalidConfig(format!(
                "annualization factor must be positive, got {}",
                self.annualization
            )));
        }
        Ok(())
    }
}

/// Simple annualized return: `mean(returns) × annualization`.
pub fn arr_si(returns: &[f64], annualization: f64) -> f64 {
    mean(returns) * annualization
}

/// Compound annualized return: `(∏(1 + r))^(annualization / n) - 1`.
pub fn arr_ci(returns: &[f64], annualization: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    growth.powf(annualization / returns.len() as f64) - 1.0
}

/// Annualized volatility: sample standard deviation × `sqrt(annualization)`.
pub fn volatility(returns: &[f64], annualization: f64) -> f64 {
    sample_std(returns) * annualization.sqrt()
}

/// Simple annualized return over annualized volatility.
pub fn sharpe(returns: &[f64], annualization: f64) -> f64 {
    safe_ratio(arr_si(returns, annualization), volatility(returns, annualization))
}

/// Simple annualized return over maximum drawdown depth.
pub fn calmar(returns: &[f64], annualization: f64, max_drawdown: f64) -> f64 {
    safe_ratio(arr_si(returns, annualization), max_drawdown)
}

/// Fraction of periods with a positive return.
pub fn win_rate(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    returns.iter().filter(|r| **r > 0.0).count() as f64 / returns.len() as f64
}

/// Mean gain over mean loss: `mean(r > 0) / -mean(r < 0)`.
pub fn pl_ratio(returns: &[f64]) -> f64 {
    let gains: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
    let losses: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if gains.is_empty() || losses.is_empty() {
        return f64::NAN;
    }
    safe_ratio(mean(&gains), -mean(&losses))
}

/// Summary statistics of one return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Series name.
    pub name: String,
    /// First real date.
    pub begin: Option<Date>,
    /// Last real date.
    pub end: Option<Date>,
    /// Number of real periods.
    pub periods: usize,
    /// Simple annualized return.
    pub arr_si: f64,
    /// Compound annualized return.
    pub arr_ci: f64,
    /// Annualized volatility.
    pub volatility: f64,
    /// Sharpe ratio.
    pub sharpe: f64,
    /// Calmar ratio.
    pub calmar: f64,
    /// Win rate.
    pub win_rate: f64,
    /// Profit/loss ratio.
    pub pl_ratio: f64,
    /// Maximum drawdown depth, `0.0` without any drawdown.
    pub max_drawdown: f64,
    /// Peak date of the deepest drawdown.
    pub max_drawdown_start: Option<Date>,
    /// Trough date of the deepest drawdown.
    pub max_drawdown_end: Option<Date>,
}

impl PortfolioStats {
    /// Computes every statistic for `series`.
    ///
    /// Return-based statistics use the real rows only; the drawdown uses the
    /// anchored series so the first real return is measured from 1.0.
    pub fn calculate(series: &ReturnSeries, config: &StatsConfig) -> Self {
        let returns = series.returns();
        let af = config.annualization;
        let deepest = drawdown_episodes(series).into_iter().next();
        let max_drawdown = deepest.as_ref().map_or(0.0, |e| e.depth);

        Self {
            name: series.name.clone(),
            begin: series.real_dates().first().copied(),
            end: series.real_dates().last().copied(),
            periods: returns.len(),
            arr_si: arr_si(returns, af),
            arr_ci: arr_ci(returns, af),
            volatility: volatility(returns, af),
            sharpe: sharpe(returns, af),
            calmar: calmar(returns, af, max_drawdown),
            win_rate: win_rate(returns),
            pl_ratio: pl_ratio(returns),
            max_drawdown,
            max_drawdown_start: deepest.as_ref().map(|e| e.start),
            max_drawdown_end: deepest.as_ref().map(|e| e.end),
        }
    }
}

/// One row of [`PortfolioStats`] per return column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    /// Rows in return-table column order.
    pub rows: Vec<PortfolioStats>,
}

impl StatsTable {
    /// Computes statistics for every column of `table`.
    pub fn calculate(table: &ReturnTable, config: &StatsConfig) -> Result<Self> {
        let rows = table
            .all_series()?
            .iter()
            .map(|series| PortfolioStats::calculate(series, config))
            .collect();
        Ok(Self { rows })
    }

    /// Statistics of the named series.
    pub fn get(&self, name: &str) -> Option<&PortfolioStats> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Converts to a DataFrame with one row per series.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let rows = &self.rows;
        let float = |name: &str, f: fn(&PortfolioStats) -> f64| -> Column {
            Series::new(name.into(), rows.iter().map(f).collect::<Vec<f64>>()).into()
        };
        let date = |name: &str, f: fn(&PortfolioStats) -> Option<Date>| -> Column {
            Series::new(name.into(), rows.iter().map(f).collect::<Vec<Option<Date>>>()).into()
        };

        let columns = vec![
            Series::new(
                "series".into(),
                rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            date("begin", |r| r.begin),
            date("end", |r| r.end),
            Series::new(
                "periods".into(),
                rows.iter().map(|r| r.periods as u64).collect::<Vec<_>>(),
            )
            .into(),
            float("arr_si", |r| r.arr_si),
            float("arr_ci", |r| r.arr_ci),
            float("volatility", |r| r.volatility),
            float("sharpe", |r| r.sharpe),
            float("calmar", |r| r.calmar),
            float("win_rate", |r| r.win_rate),
            float("pl_ratio", |r| r.pl_ratio),
            float("max_drawdown", |r| r.max_drawdown),
            date("max_drawdown_start", |r| r.max_drawdown_start),
            date("max_drawdown_end", |r| r.max_drawdown_end),
        ];
        Ok(DataFrame::new(columns)?)
    }
}
