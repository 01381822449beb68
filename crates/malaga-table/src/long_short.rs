//! Top-K / bottom-K portfolio returns.

use crate::section::CrossSection;
use malaga_traits::{Date, Logger, MalagaError, Result};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A date on which a cutoff exceeded the ranked assets available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// Affected date.
    pub date: Date,
    /// Requested cutoff.
    pub cutoff: usize,
    /// Assets actually used.
    pub available: usize,
}

/// Long and short returns for every cutoff and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongShortReturns {
    /// Cutoffs in request order.
    pub cutoffs: Vec<usize>,
    /// Dates in ascending order.
    pub dates: Vec<Date>,
    /// `long[k][t]`: mean return of the top `cutoffs[k]` assets.
    pub long: Vec<Vec<Option<f64>>>,
    /// `short[k][t]`: mean return of the bottom `cutoffs[k]` assets.
    pub short: Vec<Vec<Option<f64>>>,
    /// Dates where a cutoff used fewer assets than requested.
    pub shortfalls: Vec<Shortfall>,
}

impl LongShortReturns {
    /// Label of the long column for `cutoff`.
    pub fn long_label(cutoff: usize) -> String {
        format!("l_{cutoff}")
    }

    /// Label of the short column for `cutoff`.
    pub fn short_label(cutoff: usize) -> String {
        format!("s_{cutoff}")
    }

    /// Converts to a DataFrame: `date`, then `l_K` columns, then `s_K` columns.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(2 * self.cutoffs.len() + 1);
        columns.push(Series::new("date".into(), self.dates.clone()).into());
        for (cutoff, values) in self.cutoffs.iter().zip(&self.long) {
            columns.push(Series::new(Self::long_label(*cutoff).into(), values.as_slice()).into());
        }
        for (cutoff, values) in self.cutoffs.iter().zip(&self.short) {
            columns.push(Series::new(Self::short_label(*cutoff).into(), values.as_slice()).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Computes equal-weighted long and short returns for each cutoff.
///
/// The short leg holds the `K` lowest-ranked assets and the long leg the `K`
/// highest. When a date ranks fewer than `K` assets every available asset is
/// used; each such case is recorded in [`LongShortReturns::shortfalls`] and
/// logged as a warning.
///
/// # Errors
///
/// [`MalagaError::InvalidConfig`] for an empty cutoff list, a zero cutoff or a
/// repeated cutoff.
pub fn long_short_returns(
    sections: &[CrossSection],
    cutoffs: &[usize],
    logger: &dyn Logger,
) -> Result<LongShortReturns> {
    validate_cutoffs(cutoffs)?;

    let rows: Vec<(Date, Vec<(Option<f64>, Option<f64>)>)> = sections
        .par_iter()
        .map(|section| {
            let m = section.len();
            let legs = cutoffs
                .iter()
                .map(|&k| {
                    let k = k.min(m);
                    (section.mean_target(m - k..m), section.mean_target(0..k))
                })
                .collect();
            (section.date, legs)
        })
        .collect();

    let shortfalls: Vec<Shortfall> = sections
        .iter()
        .flat_map(|section| {
            cutoffs
                .iter()
                .filter(|&&k| k > section.len())
                .map(|&k| Shortfall {
                    date: section.date,
                    cutoff: k,
                    available: section.len(),
                })
        })
        .collect();

    if !shortfalls.is_empty() {
        logger.warn(&format!(
            "{} date/cutoff pair(s) had fewer assets than the cutoff; all available assets were used",
            shortfalls.len()
        ));
    }

    let mut long = vec![Vec::with_capacity(rows.len()); cutoffs.len()];
    let mut short = vec![Vec::with_capacity(rows.len()); cutoffs.len()];
    let mut dates = Vec::with_capacity(rows.len());
    for (date, legs) in rows {
        dates.push(date);
        for (k, (l, s)) in legs.into_iter().enumerate() {
            long[k].push(l);
            short[k].push(s);
        }
    }

    Ok(LongShortReturns {
        cutoffs: cutoffs.to_vec(),
        dates,
        long,
        short,
        shortfalls,
    })
}

fn validate_cutoffs(cutoffs: &[usize]) -> Result<()> {
    if cutoffs.is_empty() {
        return Err(MalagaError::InvalidConfig(
            "at least one long/short cutoff is required".to_string(),
        ));
    }
    if cutoffs.contains(&0) {
        return Err(MalagaError::InvalidConfig(
            "long/short cutoffs must be positive".to_string(),
        ));
    }
    for (i, k) in cutoffs.iter().enumerate() {
        if cutoffs[..i].contains(k) {
            return Err(MalagaError::InvalidConfig(format!("duplicate cutoff {k}")));
        }
    }
    Ok(())
}
