use anyhow::Result;
use tracing::info;

use dlr_algo::SweepRange;
use dlr_cli::common::{build_engine, resolve_ambient};
use dlr_cli::CriticalTempArgs;

pub fn handle(args: &CriticalTempArgs) -> Result<()> {
    info!("Scanning for the critical temperature of {}", args.data_dir);
    let engine = build_engine(&args.data_dir)?;
    let ambient = resolve_ambient(args.ambient.as_deref(), args.date, None, args.wind)?;

    let scan = SweepRange::critical_scan();
    match engine.find_critical_temperature(&ambient, scan) {
        Some(critical) => {
            println!(
                "Critical ambient temperature: {:.0} °C",
                critical.temperature.value()
            );
            let worst = &critical.first_overload;
            println!(
                "First overload: {} ({}) at {:.1}% of a {:.1} MVA rating",
                worst.line,
                worst.branch_name,
                worst.loading_pct.value(),
                worst.rating.value()
            );
        }
        None => println!(
            "No base-case overload between {:.0} °C and {:.0} °C",
            scan.start, scan.end
        ),
    }
    Ok(())
}
