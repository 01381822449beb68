//! Net asset value.

use malaga_table::ReturnTable;
use malaga_traits::Result;
use polars::prelude::*;

/// Cumulative compounded value: `nav[t] = ∏_{s≤t} (1 + returns[s])`.
///
/// For an anchored series (leading `0.0`) the first value is exactly `1.0`.
pub fn nav(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |value, r| {
            *value *= 1.0 + r;
            Some(*value)
        })
        .collect()
}

/// NAV of every return column, aligned to the table's dates.
///
/// Missing returns leave the NAV unchanged from the previous observed row but
/// are reported as null.
pub fn nav_table(table: &ReturnTable) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(table.columns().len() + 1);
    columns.push(Series::new("date".into(), table.dates().to_vec()).into());
    for column in table.columns() {
        let values = table.column(&column.name).unwrap_or_default();
        let mut value = 1.0;
        let navs: Vec<Option<f64>> = values
            .iter()
            .map(|r| {
                r.map(|r| {
                    value *= 1.0 + r;
                    value
                })
            })
            .collect();
        columns.push(Series::new(column.name.as_str().into(), navs).into());
    }
    Ok(DataFrame::new(columns)?)
}
