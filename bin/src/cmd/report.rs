//! Report command implementation.

use crate::cmd::prepare::load_wide;
use crate::{OutputFormat, ReportArgs, data};
use anyhow::Result;
use malaga_eval::FactorReport;
use malaga_table::{BenchmarkSchema, BenchmarkTable};
use malaga_traits::{TracingLogger, TradingCalendar, WeekdayCalendar};

/// Builds the full factor report and prints or writes its tables.
pub(crate) fn run(args: &ReportArgs) -> Result<()> {
    let mut config = data::load_config(args.config.as_deref())?;
    if let Some(n_groups) = args.groups {
        config.n_groups = n_groups;
    }
    if let Some(cutoffs) = &args.cutoffs {
        config.cutoffs = cutoffs.clone();
    }
    if let Some(worst) = args.worst_drawdowns {
        config.worst_drawdowns = worst;
    }
    config.keys = data::key_columns(
        &config.keys,
        args.inputs.date_column.as_deref(),
        args.inputs.asset_column.as_deref(),
    );
    config.validate()?;

    let wide = load_wide(&args.inputs, &config.keys)?;

    let benchmarks = match &args.benchmarks {
        Some(path) => {
            let frame = data::load_long(path, &[config.keys.date.as_str()])?;
            let schema = BenchmarkSchema::infer(&frame, &config.keys.date)?;
            Some(BenchmarkTable::from_frame(&frame, &schema)?)
        }
        None => None,
    };

    let calendar: Box<dyn TradingCalendar> = match &args.calendar {
        Some(path) => Box::new(data::load_calendar(path)?),
        None => Box::new(WeekdayCalendar::new()),
    };

    let report = FactorReport::build(
        &wide,
        &args.factor,
        &args.target,
        benchmarks.as_ref(),
        calendar.as_ref(),
        &config,
        &TracingLogger::new("report"),
    )?;

    if let Some(dir) = &args.output_dir {
        data::write_csv(dir, "returns", &mut report.returns.to_frame()?)?;
        data::write_csv(dir, "nav", &mut report.nav_frame()?)?;
        data::write_csv(dir, "drawdown", &mut report.drawdown_frame()?)?;
        data::write_csv(dir, "ic", &mut report.ic.to_frame()?)?;
        data::write_csv(dir, "ic_summary", &mut report.ic_summary_frame()?)?;
        data::write_csv(dir, "stats", &mut report.stats.to_frame()?)?;
        data::write_csv(dir, "worst_drawdowns", &mut report.worst_drawdowns_frame()?)?;
    }

    match args.format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => print_report(&report)?,
    }
    Ok(())
}

fn print_report(report: &FactorReport) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Factor Report                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Factor:   {}", report.factor);
    println!("Target:   {}", report.target);
    println!(
        "Period:   {} to {} ({} dates, anchor {})",
        report.returns.real_dates().first().map_or_else(String::new, ToString::to_string),
        report.returns.real_dates().last().map_or_else(String::new, ToString::to_string),
        report.returns.real_dates().len(),
        report.returns.anchor()
    );
    if !report.excluded.is_empty() {
        println!(
            "Excluded: {} asset row(s) without a factor value on {} date(s)",
            report.excluded.iter().map(|e| e.excluded).sum::<usize>(),
            report.excluded.len()
        );
    }
    if !report.dropped.is_empty() {
        println!("Dropped:  {} date(s) with too few assets", report.dropped.len());
    }
    if !report.shortfalls.is_empty() {
        println!(
            "Note:     {} date/cutoff pair(s) used fewer assets than the cutoff",
            report.shortfalls.len()
        );
    }

    println!("\n── Statistics ──────────────────────────────────────────────────\n");
    println!("{}", report.stats.to_frame()?);

    println!("\n── Information Coefficient ─────────────────────────────────────\n");
    println!("{}", report.ic_summary_frame()?);

    println!("\n── Worst Drawdowns ─────────────────────────────────────────────\n");
    println!("{}", report.worst_drawdowns_frame()?);
    Ok(())
}
