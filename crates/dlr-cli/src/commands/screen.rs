use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tabwriter::TabWriter;
use tracing::info;

use dlr_algo::{DcFlowSolver, ScreenerConfig, ScreeningSummary};
use dlr_cli::common::{build_engine, emit_json, fmt_pct, resolve_ambient};
use dlr_cli::ScreenArgs;
use dlr_core::solver::SolverKind;

use crate::commands::util::configure_threads;

pub fn handle(args: &ScreenArgs) -> Result<()> {
    configure_threads(&args.threads);
    info!("Screening contingencies for {}", args.data_dir);

    let backend = SolverKind::parse(&args.backend)?;
    let config = ScreenerConfig {
        violation_threshold_pct: args.threshold,
        max_outages: args.max_outages,
        solve_timeout: args.timeout_secs.map(Duration::from_secs_f64),
        parallel: !args.sequential,
        ..ScreenerConfig::default()
    };
    let engine = build_engine(&args.data_dir)?
        .with_solver(Arc::new(DcFlowSolver::new(backend.build())))
        .with_config(config);

    let ambient = resolve_ambient(args.ambient.as_deref(), args.date, args.temp, args.wind)?;
    let results = engine.screen_contingencies(&ambient, None);
    let summary = ScreeningSummary::from_results(&results);

    if args.json {
        return emit_json(&json!({
            "ambient": ambient,
            "summary": summary,
            "contingencies": results,
        }));
    }

    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "RANK\tOUTAGE\tBRANCH\tSTATUS\tVIOLATIONS\tMAX_LOADING\tDETAIL")?;
    for (rank, r) in results.iter().enumerate() {
        let detail = match (&r.failure, r.violations.first()) {
            (Some(reason), _) => reason.clone(),
            (None, Some(worst)) => {
                format!("worst {} at {:.1}%", worst.line, worst.loading_pct.value())
            }
            (None, None) => String::new(),
        };
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            rank + 1,
            r.outage,
            r.outage_name,
            r.status,
            r.violation_count(),
            fmt_pct(r.max_loading_pct),
            detail
        )?;
    }
    tw.flush()?;

    println!();
    println!(
        "Screened {} outages: {} overloaded / {} critical / {} caution / {} normal / {} errors | {} violations",
        summary.evaluated,
        summary.overloaded,
        summary.critical,
        summary.caution,
        summary.normal,
        summary.errors,
        summary.total_violations
    );
    Ok(())
}
