//! IC command implementation.

use crate::cmd::prepare::load_wide;
use crate::{InputArgs, OutputFormat, data};
use anyhow::Result;
use malaga_eval::{IcSummary, IcTable, summary_frame};
use malaga_traits::KeyColumns;
use serde::Serialize;

#[derive(Serialize)]
struct IcOutput<'a> {
    ic: &'a IcTable,
    summary: &'a [IcSummary],
}

/// Computes per-date IC and rank IC of `factor` against every target.
pub(crate) fn run(inputs: &InputArgs, factor: &str, format: OutputFormat) -> Result<()> {
    let keys = data::key_columns(
        &KeyColumns::default(),
        inputs.date_column.as_deref(),
        inputs.asset_column.as_deref(),
    );
    let wide = load_wide(inputs, &keys)?;
    let table = IcTable::calculate(&wide, factor)?;
    let summary = table.summary();

    match format {
        OutputFormat::Json => {
            let output = IcOutput {
                ic: &table,
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║                 Information Coefficient                      ║");
            println!("╚══════════════════════════════════════════════════════════════╝\n");
            println!("Factor: {factor}\n");
            println!("{}", summary_frame(&summary)?);
            println!("{}", table.to_frame()?);
        }
    }
    Ok(())
}
