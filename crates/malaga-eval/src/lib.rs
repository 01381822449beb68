#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Evaluation engine for Malaga.
//!
//! # Example
//!
//! ```rust,ignore
//! use malaga_eval::{FactorReport, ReportConfig};
//! use malaga_traits::{TracingLogger, WeekdayCalendar};
//!
//! let report = FactorReport::build(
//!     &wide,
//!     "momentum",
//!     "ret_5d",
//!     None,
//!     &WeekdayCalendar::new(),
//!     &ReportConfig::default(),
//!     &TracingLogger::new("report"),
//! )?;
//! println!("{}", report.stats.to_frame()?);
//! ```

/// The version of the malaga-eval crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod drawdown;
pub mod ic;
pub mod metrics;
pub mod nav;
pub mod report;

// Re-export main types
pub use drawdown::{
    DrawdownEpisode, drawdown_episodes, drawdown_series, drawdown_table, segment_episodes,
    worst_drawdowns,
};
pub use ic::{
    IcSummary, IcTable, InformationRatio, calculate_ic, calculate_rank_ic, summary_frame,
};
pub use metrics::{
    PortfolioStats, StatsConfig, StatsTable, arr_ci, arr_si, calmar, pl_ratio, sharpe,
    volatility, win_rate,
};
pub use nav::{nav, nav_table};
pub use report::{FactorReport, ReportConfig, WorstDrawdown};
