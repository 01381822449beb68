//! CLI subcommand modules.
//!
//! This module contains the implementations for all malaga CLI subcommands.

pub(crate) mod ic;
pub(crate) mod prepare;
pub(crate) mod report;
