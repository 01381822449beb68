#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # malaga
//!
//! Factor performance analytics.
//!
//! malaga is an umbrella crate that re-exports all malaga sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```ignore
//! use malaga::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let keys = KeyColumns::default();
//! let wide = prepare(
//!     &factors,
//!     &LongSchema::infer(&factors, &keys)?,
//!     &targets,
//!     &LongSchema::infer(&targets, &keys)?,
//!     &TracingLogger::new("prepare"),
//! )?;
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
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types, errors, the logging and calendar collaborators
//! - [`table`] - Wide tables, quantile grouping, long/short returns, return tables
//! - [`eval`] - NAV, drawdowns, return statistics, IC and the factor report
//!
//! ## Pipeline
//!
//! 1. **Wide-table builder** pivots long-format factors and targets and joins
//!    them on `(date, asset)`
//! 2. **Grouper** and **long/short aggregator** reduce each date's ranked
//!    cross-section, in parallel over dates
//! 3. **Assembler** joins their outputs with benchmarks and seeds the
//!    zero-return anchor row
//! 4. **Statistics engine** derives NAV, drawdown episodes, ratios and IC

/// Version information for the malaga crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core
// ============================================================================

/// Core types, errors and collaborator traits.
pub mod traits {
    pub use malaga_traits::*;
}

pub use malaga_traits::{
    Date, KeyColumns, Logger, LongFrame, MalagaError, Result, Role, TradingCalendar,
};

// ============================================================================
// Tables
// ============================================================================

/// Table construction.
///
/// ## Column naming
///
/// - Wide-table columns: `{label}__factor__`, `{label}__target__`
/// - Return-table columns: `l_{K}`, `s_{K}`, `G{N}N{i:02}`, `{label}__benchmark__`
pub mod table {
    pub use malaga_table::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluation engine.
///
/// ## Statistics
///
/// ```text
/// ARR_SI     = mean(r) × A
/// ARR_CI     = (∏(1 + r))^(A / n) - 1
/// Volatility = std(r) × √A
/// Sharpe     = ARR_SI / Volatility
/// Calmar     = ARR_SI / MaxDD
/// IR         = mean(IC) / std(IC)
/// ```
///
/// `A` is the annualization factor. Ratios with a zero denominator are `NaN`.
pub mod eval {
    pub use malaga_eval::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use malaga::prelude::*;
/// ```
pub mod prelude {
    pub use malaga_eval::{FactorReport, ReportConfig, StatsConfig};
    pub use malaga_table::{
        BenchmarkSchema, BenchmarkTable, GroupingConfig, InsufficientDataPolicy, LongSchema,
        ReturnTable, WideTable, prepare,
    };
    pub use malaga_traits::{
        Date, KeyColumns, ListCalendar, Logger, LongFrame, MalagaError, NullLogger, Result, Role,
        TracingLogger, TradingCalendar, WeekdayCalendar,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use polars::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        let parts: Vec<&str> = super::VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_prelude_pipeline() {
        let factors: LongFrame = df! {
            "date" => &[20240102i64, 20240102, 20240103, 20240103],
            "code" => &[1i64, 2, 1, 2],
            "factor" => &["mom", "mom", "mom", "mom"],
            "value" => &[1.0, 2.0, 2.0, 1.0],
        }
        .unwrap()
        .into();
        let targets: LongFrame = df! {
            "date" => &[20240102i64, 20240102, 20240103, 20240103],
            "code" => &[1i64, 2, 1, 2],
            "target" => &["ret", "ret", "ret", "ret"],
            "value" => &[0.01, 0.02, 0.01, 0.02],
        }
        .unwrap()
        .into();

        let keys = KeyColumns::default();
        let wide = prepare(
            &factors,
            &LongSchema::infer(&factors, &keys).unwrap(),
            &targets,
            &LongSchema::infer(&targets, &keys).unwrap(),
            &NullLogger,
        )
        .unwrap();

        let config = ReportConfig {
            n_groups: 2,
            cutoffs: vec![1],
            ..Default::default()
        };
        let report = FactorReport::build(
            &wide,
            "mom",
            "ret",
            None,
            &WeekdayCalendar::new(),
            &config,
            &NullLogger,
        )
        .unwrap();
        assert_eq!(report.returns.real_dates().len(), 2);
        assert_eq!(report.returns.column("l_1").unwrap()[1], Some(0.02));
        assert_eq!(report.returns.column("l_1").unwrap()[2], Some(0.01));
    }
}
