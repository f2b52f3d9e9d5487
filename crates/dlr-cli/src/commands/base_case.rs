use std::io::{self, Write};

use anyhow::Result;
use tabwriter::TabWriter;
use tracing::info;

use dlr_algo::conductor_breakdown;
use dlr_cli::common::{build_engine, emit_json, resolve_ambient};
use dlr_cli::BaseCaseArgs;

pub fn handle(args: &BaseCaseArgs) -> Result<()> {
    info!("Analyzing base case for {}", args.data_dir);
    let engine = build_engine(&args.data_dir)?;
    let ambient = resolve_ambient(args.ambient.as_deref(), args.date, args.temp, args.wind)?;
    let report = engine.analyze_base_case(&ambient);

    if args.json {
        return emit_json(&report);
    }

    let shown = match args.top {
        Some(n) => report.top_lines(n),
        None => &report.loadings[..],
    };
    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "LINE\tBRANCH\tCONDUCTOR\tKV\tFLOW_MW\tRATING_MVA\tLOADING\tSTATUS")?;
    for r in shown {
        writeln!(
            tw,
            "{}\t{}\t{}\t{:.0}\t{:.1}\t{:.1}\t{:.1}%\t{}",
            r.line,
            r.branch_name,
            r.conductor_display,
            r.voltage.value(),
            r.flow.value(),
            r.rating.value(),
            r.loading_pct.value(),
            r.category
        )?;
    }
    tw.flush()?;

    for unrated in &report.unrated {
        println!(
            "unrated: {} ({}): {}",
            unrated.line, unrated.branch_name, unrated.reason
        );
    }

    let breakdown = conductor_breakdown(&report.loadings);
    if breakdown.len() > 1 {
        println!();
        let mut tw = TabWriter::new(io::stdout());
        writeln!(tw, "CONDUCTOR\tLINES\tMAX\tAVG\tOVERLOADED")?;
        for group in &breakdown {
            writeln!(
                tw,
                "{}\t{}\t{:.1}%\t{:.1}%\t{}",
                group.display_name,
                group.lines,
                group.max_loading_pct,
                group.avg_loading_pct,
                group.overloaded
            )?;
        }
        tw.flush()?;
    }

    if let Some(stress) = &report.stress {
        println!();
        println!(
            "Stress: max {:.1}%, avg {:.1}% | {} critical / {} caution / {} normal",
            stress.max_loading_pct,
            stress.avg_loading_pct,
            stress.critical,
            stress.caution,
            stress.normal
        );
    }
    Ok(())
}
