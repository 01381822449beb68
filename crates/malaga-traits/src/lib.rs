#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core definitions for the Malaga factor analytics framework.
//!
//! This crate provides the foundational types and collaborator traits used by
//! the table builder and the evaluation engine.

/// The version of the malaga-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod calendar;
pub mod error;
pub mod logger;
pub mod stats;
pub mod types;

// Re-exports
pub use calendar::{ListCalendar, TradingCalendar, WeekdayCalendar};
pub use error::{MalagaError, Result};
pub use logger::{Level, Logger, MemoryLogger, NullLogger, Timer, TracingLogger};
pub use types::{AssetId, CE_TO_UNIX_EPOCH_DAYS, Date, KeyColumns, LongFrame, Observation, Role};
