//! Prepare command implementation.

use crate::InputArgs;
use crate::data;
use anyhow::Result;
use malaga_table::{LongSchema, WideTable, prepare};
use malaga_traits::{KeyColumns, Role, TracingLogger};

/// Loads factor and target CSV files and builds the joined wide table.
pub(crate) fn load_wide(inputs: &InputArgs, keys: &KeyColumns) -> Result<WideTable> {
    let key_names = [keys.date.as_str(), keys.asset.as_str()];
    let factors = data::load_long(&inputs.factors, &key_names)?;
    let targets = data::load_long(&inputs.targets, &key_names)?;
    let wide = prepare(
        &factors,
        &LongSchema::infer(&factors, keys)?,
        &targets,
        &LongSchema::infer(&targets, keys)?,
        &TracingLogger::new("prepare"),
    )?;
    Ok(wide)
}

/// Prints the coverage and available labels of the prepared wide table.
pub(crate) fn run(inputs: &InputArgs) -> Result<()> {
    let keys = data::key_columns(
        &KeyColumns::default(),
        inputs.date_column.as_deref(),
        inputs.asset_column.as_deref(),
    );
    let wide = load_wide(inputs, &keys)?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                       Prepared Data                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if let Some(coverage) = wide.coverage() {
        println!("Range:     {} to {}", coverage.first, coverage.last);
        println!("Rows:      {}", coverage.rows);
        println!("Days:      {}", coverage.days);
        println!("Assets:    {:.1} per day", coverage.avg_assets_per_day);
    }
    println!("Factors:   {}", wide.labels(Role::Factor).join(", "));
    println!("Targets:   {}", wide.labels(Role::Target).join(", "));
    Ok(())
}
