use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

use dlr_algo::{SweepPoint, SweepRange, WindSweepPoint};
use dlr_cli::common::{build_engine, fmt_pct, resolve_ambient};
use dlr_cli::SweepArgs;

pub fn handle(args: &SweepArgs) -> Result<()> {
    let axis = if args.by_wind { "wind speed" } else { "ambient temperature" };
    info!("Sweeping {axis} for {}", args.data_dir);

    let engine = build_engine(&args.data_dir)?;
    let ambient = resolve_ambient(args.ambient.as_deref(), args.date, args.temp, args.wind)?;

    let defaults = if args.by_wind {
        SweepRange::wind()
    } else {
        SweepRange::temperature()
    };
    let range = SweepRange::new(
        args.start.unwrap_or(defaults.start),
        args.end.unwrap_or(defaults.end),
        args.step.unwrap_or(defaults.step),
    );

    if args.by_wind {
        let points: Vec<WindSweepPoint> = engine.wind_sweep(&ambient, range).collect();
        match &args.csv {
            Some(path) => write_csv(path, &points)?,
            None => {
                let mut tw = TabWriter::new(io::stdout());
                writeln!(tw, "WIND_FT_S\tMAX_LOADING\tOVERLOADED")?;
                for p in &points {
                    writeln!(
                        tw,
                        "{:.1}\t{}\t{}",
                        p.wind_speed.value(),
                        fmt_pct(p.max_loading_pct),
                        p.overloaded
                    )?;
                }
                tw.flush()?;
            }
        }
    } else {
        let points: Vec<SweepPoint> = engine.temperature_sweep(&ambient, range).collect();
        match &args.csv {
            Some(path) => write_csv(path, &points)?,
            None => {
                let mut tw = TabWriter::new(io::stdout());
                writeln!(tw, "TEMP_C\tMAX_LOADING\tOVERLOADED")?;
                for p in &points {
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
        }
    }
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, points: &[T]) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for point in points {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    println!("Sweep written to {}", path.display());
    Ok(())
}
