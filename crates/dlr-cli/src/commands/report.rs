use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tabwriter::TabWriter;
use tracing::info;

use dlr_algo::ScreeningReport;
use dlr_cli::common::{build_engine, fmt_pct, resolve_ambient};
use dlr_cli::ReportArgs;

pub fn handle(args: &ReportArgs) -> Result<()> {
    info!("Building full screening report for {}", args.data_dir);
    let engine = build_engine(&args.data_dir)?;
    let ambient = resolve_ambient(args.ambient.as_deref(), args.date, args.temp, args.wind)?;
    let report = engine.full_report(&ambient, true);

    match &args.json {
        Some(path) => {
            let payload = serde_json::to_string_pretty(&report)
                .map_err(|err| anyhow::anyhow!("serializing report to JSON: {err}"))?;
            fs::write(path, payload)
                .with_context(|| format!("writing report to {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => print_report(&report)?,
    }
    Ok(())
}

fn print_report(report: &ScreeningReport) -> Result<()> {
    println!(
        "Screening report generated {} (ambient {:.0} °C, wind {:.1} ft/s)",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        report.ambient.temperature.value(),
        report.ambient.wind_speed.value()
    );

    println!();
    println!("Base case ({} lines rated):", report.base_case.loadings.len());
    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "LINE\tBRANCH\tLOADING\tSTATUS")?;
    for r in report.base_case.top_lines(10) {
        writeln!(
            tw,
            "{}\t{}\t{:.1}%\t{}",
            r.line,
            r.branch_name,
            r.loading_pct.value(),
            r.category
        )?;
    }
    tw.flush()?;
    for unrated in &report.base_case.unrated {
        println!("unrated: {}: {}", unrated.line, unrated.reason);
    }

    println!();
    println!("Contingencies:");
    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "RANK\tOUTAGE\tSTATUS\tVIOLATIONS\tMAX_LOADING")?;
    for (rank, r) in report.contingencies.iter().enumerate() {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}",
            rank + 1,
            r.outage,
            r.status,
            r.violation_count(),
            fmt_pct(r.max_loading_pct)
        )?;
    }
    tw.flush()?;
    let s = &report.summary;
    println!(
        "{} evaluated: {} overloaded / {} critical / {} caution / {} normal / {} errors",
        s.evaluated, s.overloaded, s.critical, s.caution, s.normal, s.errors
    );

    if let Some(sweep) = &report.temperature_sweep {
        println!();
        println!("Temperature sweep:");
        let mut tw = TabWriter::new(io::stdout());
        writeln!(tw, "TEMP_C\tMAX_LOADING\tOVERLOADED")?;
        for p in sweep {
            writeln!(
                tw,
                "{:.0}\t{}\t{}",
                p.temperature.value(),
                fmt_pct(p.max_loading_pct),
                p.overloaded
            )?;
        }
        tw.flush()?;
    }
    Ok(())
}
