#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Table construction for the Malaga factor analytics framework.
//!
//! Data flows one way: long-format frames are pivoted into a [`WideTable`],
//! split into ranked [`CrossSection`]s, reduced to [`GroupReturns`] and
//! [`LongShortReturns`] in parallel over dates, and finally joined into a
//! [`ReturnTable`].

/// The version of the malaga-table crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod group;
pub mod long_short;
pub mod return_table;
pub mod section;
pub mod wide;

pub use group::{
    DroppedDate, GroupReturns, GroupingConfig, InsufficientDataPolicy, assign_buckets,
    group_label, group_returns,
};
pub use long_short::{LongShortReturns, Shortfall, long_short_returns};
pub use return_table::{ColumnKind, ReturnColumn, ReturnSeries, ReturnTable, assemble};
pub use section::{CrossSection, Exclusion, Member, cross_sections, exclusions};
pub use wide::{
    BenchmarkSchema, BenchmarkTable, Coverage, LongSchema, WideColumn, WideTable, prepare,
};
