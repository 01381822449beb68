//! End-to-end factor report.
//!
//! [`FactorReport::build`] runs the whole pipeline for one factor and one
//! target: cross-sections, grouping and long/short returns, return-table
//! assembly, IC, statistics and worst drawdowns.

use crate::drawdown::{DrawdownEpisode, drawdown_table, worst_drawdowns};
use crate::ic::{IcSummary, IcTable, summary_frame};
use crate::metrics::{StatsConfig, StatsTable};
use crate::nav::nav_table;
use malaga_table::{
    BenchmarkTable, DroppedDate, Exclusion, GroupingConfig, InsufficientDataPolicy, ReturnTable,
    Shortfall, WideTable, assemble, cross_sections, exclusions, group_returns, long_short_returns,
};
use malaga_traits::{Date, KeyColumns, Logger, MalagaError, Result, Timer, TradingCalendar};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration of a factor report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of quantile groups.
    pub n_groups: usize,
    /// Long/short cutoffs, in assets.
    pub cutoffs: Vec<usize>,
    /// Periods per year used for annualization.
    pub annualization: f64,
    /// Number of worst drawdown episodes reported per series.
    pub worst_drawdowns: usize,
    /// Key column names of the long-format inputs.
    pub keys: KeyColumns,
    /// Handling of dates with fewer assets than groups.
    pub insufficient_data: InsufficientDataPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            n_groups: 10,
            cutoffs: vec![200, 1000],
            annualization: 252.0,
            worst_drawdowns: 5,
            keys: KeyColumns::default(),
            insufficient_data: InsufficientDataPolicy::Fail,
        }
    }
}

impl ReportConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// [`MalagaError::InvalidConfig`] for zero groups, missing or zero
    /// cutoffs, or a non-positive annualization factor.
    pub fn validate(&self) -> Result<()> {
        if self.n_groups == 0 {
            return Err(MalagaError::InvalidConfig(
                "n_groups must be positive".to_string(),
            ));
        }
        if self.cutoffs.is_empty() {
            return Err(MalagaError::InvalidConfig(
                "at least one cutoff is required".to_string(),
            ));
        }
        if self.cutoffs.contains(&0) {
            return Err(MalagaError::InvalidConfig(
                "cutoffs must be positive".to_string(),
            ));
        }
        self.stats().validate()
    }

    /// Grouper settings.
    pub fn grouping(&self) -> GroupingConfig {
        GroupingConfig::new(self.n_groups).with_policy(self.insufficient_data)
    }

    /// Statistics settings.
    pub const fn stats(&self) -> StatsConfig {
        StatsConfig::new(self.annualization)
    }
}

/// One reported drawdown episode of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorstDrawdown {
    /// Return-table column.
    pub series: String,
    /// 1-based rank by depth.
    pub rank: usize,
    /// The episode.
    #[serde(flatten)]
    pub episode: DrawdownEpisode,
}

/// All tables produced for one factor/target pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorReport {
    /// Factor label.
    pub factor: String,
    /// Target label used for grouping and long/short returns.
    pub target: String,
    /// Settings the report was built with.
    pub config: ReportConfig,
    /// Anchored return table.
    pub returns: ReturnTable,
    /// Per-date IC of the factor against every target.
    pub ic: IcTable,
    /// IC summary per target.
    pub ic_summary: Vec<IcSummary>,
    /// Statistics per return column.
    pub stats: StatsTable,
    /// Worst drawdown episodes per return column.
    pub worst_drawdowns: Vec<WorstDrawdown>,
    /// Dates on which assets without a finite factor value were left unranked.
    pub excluded: Vec<Exclusion>,
    /// Dates dropped by the grouper.
    pub dropped: Vec<DroppedDate>,
    /// Dates where a cutoff exceeded the available assets.
    pub shortfalls: Vec<Shortfall>,
}

impl FactorReport {
    /// Builds the report from a prepared wide table.
    ///
    /// # Errors
    ///
    /// Invalid configuration, missing factor or target columns, insufficient
    /// data under the `fail` policy, an empty return table or a calendar
    /// without a trading day before the first date.
    pub fn build(
        wide: &WideTable,
        factor: &str,
        target: &str,
        benchmarks: Option<&BenchmarkTable>,
        calendar: &dyn TradingCalendar,
        config: &ReportConfig,
        logger: &dyn Logger,
    ) -> Result<Self> {
        config.validate()?;
        let _timer = Timer::start(logger, format!("Report {factor} on {target}"));

        let sections = cross_sections(wide, factor, target)?;
        let excluded = exclusions(&sections, logger);
        let (groups, long_short) = rayon::join(
            || group_returns(&sections, &config.grouping(), logger),
            || long_short_returns(&sections, &config.cutoffs, logger),
        );
        let (groups, long_short) = (groups?, long_short?);

        let returns = assemble(&groups, &long_short, benchmarks, calendar)?;
        logger.info(&format!(
            "Return table from {} to {}, {} columns",
            returns.anchor(),
            returns.dates().last().copied().unwrap_or(returns.anchor()),
            returns.columns().len()
        ));

        let ic = IcTable::calculate(wide, factor)?;
        let ic_summary = ic.summary();
        let stats = StatsTable::calculate(&returns, &config.stats())?;

        let mut worst = Vec::new();
        for series in returns.all_series()? {
            for (i, episode) in worst_drawdowns(&series, config.worst_drawdowns)
                .into_iter()
                .enumerate()
            {
                worst.push(WorstDrawdown {
                    series: series.name.clone(),
                    rank: i + 1,
                    episode,
                });
            }
        }

        Ok(Self {
            factor: factor.to_string(),
            target: target.to_string(),
            config: config.clone(),
            returns,
            ic,
            ic_summary,
            stats,
            worst_drawdowns: worst,
            excluded,
            dropped: groups.dropped,
            shortfalls: long_short.shortfalls,
        })
    }

    /// Cumulative NAV of every return column.
    pub fn nav_frame(&self) -> Result<DataFrame> {
        nav_table(&self.returns)
    }

    /// Drawdown of every return column.
    pub fn drawdown_frame(&self) -> Result<DataFrame> {
        drawdown_table(&self.returns)
    }

    /// IC summary as a DataFrame.
    pub fn ic_summary_frame(&self) -> Result<DataFrame> {
        summary_frame(&self.ic_summary)
    }

    /// Worst drawdowns as a DataFrame: series, rank, start, end, recovery,
    /// depth and duration.
    pub fn worst_drawdowns_frame(&self) -> Result<DataFrame> {
        let rows = &self.worst_drawdowns;
        let date = |name: &str, f: fn(&WorstDrawdown) -> Option<Date>| -> Column {
            Series::new(name.into(), rows.iter().map(f).collect::<Vec<_>>()).into()
        };
        let columns = vec![
            Series::new(
                "series".into(),
                rows.iter().map(|r| r.series.as_str()).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "rank".into(),
                rows.iter().map(|r| r.rank as u64).collect::<Vec<_>>(),
            )
            .into(),
            date("start", |r| Some(r.episode.start)),
            date("end", |r| Some(r.episode.end)),
            date("recovery", |r| r.episode.recovery),
            Series::new(
                "depth".into(),
                rows.iter().map(|r| r.episode.depth).collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                "duration".into(),
                rows.iter()
                    .map(|r| r.episode.duration as u64)
                    .collect::<Vec<_>>(),
            )
            .into(),
        ];
        Ok(DataFrame::new(columns)?)
    }

    /// Serializes the report as pretty-printed JSON. Undefined statistics
    /// become `null`.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MalagaError::Other(e.to_string()))
    }
}
