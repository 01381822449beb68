//! Per-date cross-sections of a wide table.

use crate::wide::WideTable;
use malaga_traits::{AssetId, Date, Logger, Result, Role};
use serde::{Deserialize, Serialize};

/// One asset's factor value and forward return on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Asset identifier.
    pub asset: AssetId,
    /// Finite factor value.
    pub factor: f64,
    /// Forward return, if observed.
    pub target: Option<f64>,
}

/// Assets of a single date, ranked ascending by factor.
///
/// Ties are broken by ascending asset id, so the order does not depend on the
/// row order of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Partition date.
    pub date: Date,
    /// Ranked members, lowest factor first.
    pub members: Vec<Member>,
    /// Number of assets excluded for a missing or non-finite factor value.
    pub excluded: usize,
}

impl CrossSection {
    /// Builds a ranked cross-section from unordered members.
    pub fn new(date: Date, mut members: Vec<Member>, excluded: usize) -> Self {
        members.sort_by(|a, b| {
            a.factor
                .total_cmp(&b.factor)
                .then_with(|| a.asset.cmp(&b.asset))
        });
        Self {
            date,
            members,
            excluded,
        }
    }

    /// Number of ranked assets.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns whether no asset has a usable factor value.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Factor values in rank order.
    pub fn factors(&self) -> Vec<f64> {
        self.members.iter().map(|m| m.factor).collect()
    }

    /// Mean of the finite targets of the members in `range`. `None` when there
    /// are none.
    pub fn mean_target(&self, range: std::ops::Range<usize>) -> Option<f64> {
        let targets: Vec<f64> = self.members[range]
            .iter()
            .filter_map(|m| m.target)
            .filter(|t| t.is_finite())
            .collect();
        if targets.is_empty() {
            None
        } else {
            Some(targets.iter().sum::<f64>() / targets.len() as f64)
        }
    }

    /// Pairs of finite `(factor, target)` values in rank order.
    pub fn pairs(&self) -> (Vec<f64>, Vec<f64>) {
        self.members
            .iter()
            .filter_map(|m| m.target.filter(|t| t.is_finite()).map(|t| (m.factor, t)))
            .unzip()
    }
}

/// Assets left out of a date's ranking for a missing or non-finite factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    /// Partition date.
    pub date: Date,
    /// Assets with a target row but no usable factor value.
    pub excluded: usize,
}

/// Collects the dates on which assets were excluded from the ranking and
/// warns once when there are any.
pub fn exclusions(sections: &[CrossSection], logger: &dyn Logger) -> Vec<Exclusion> {
    let found: Vec<Exclusion> = sections
        .iter()
        .filter(|s| s.excluded > 0)
        .map(|s| Exclusion {
            date: s.date,
            excluded: s.excluded,
        })
        .collect();

    if !found.is_empty() {
        let total: usize = found.iter().map(|e| e.excluded).sum();
        logger.warn(&format!(
            "Excluded {total} asset row(s) without a finite factor value on {} date(s)",
            found.len()
        ));
    }
    found
}

/// Splits a wide table into ranked cross-sections, one per date.
///
/// # Errors
///
/// `MissingColumn` when either label is not present with the expected role.
pub fn cross_sections(
    wide: &WideTable,
    factor: &str,
    target: &str,
) -> Result<Vec<CrossSection>> {
    let factor_values = wide.require(factor, Role::Factor)?;
    let target_values = wide.require(target, Role::Target)?;
    let keys = wide.keys();

    Ok(wide
        .partitions()
        .into_iter()
        .map(|(date, rows)| {
            let mut excluded = 0;
            let mut members = Vec::with_capacity(rows.len());
            for row in rows {
                match factor_values[row] {
                    Some(f) if f.is_finite() => members.push(Member {
                        asset: keys[row].1.clone(),
                        factor: f,
                        target: target_values[row],
                    }),
                    _ => excluded += 1,
                }
            }
            CrossSection::new(date, members, excluded)
        })
        .collect())
}
