use std::io::{self, Write};

use anyhow::{Context, Result};
use tabwriter::TabWriter;
use tracing::info;

use dlr_io::load_grid;

pub fn info(data_dir: &str) -> Result<()> {
    info!("Inspecting grid dataset at {data_dir}");
    let (grid, diagnostics) =
        load_grid(data_dir).with_context(|| format!("loading grid dataset from {data_dir}"))?;

    println!("Import: {}", diagnostics.summary());
    println!("{}", grid.stats());
    println!();

    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "CONDUCTOR\tLINES\tR25\tR50\tDIA_IN")?;
    for spec in grid.conductors() {
        let lines = grid
            .lines()
            .iter()
            .filter(|l| l.conductor == spec.name)
            .count();
        writeln!(
            tw,
            "{}\t{}\t{:.3}\t{:.3}\t{:.3}",
            spec.display_name(),
            lines,
            spec.resistance_25c,
            spec.resistance_50c,
            spec.diameter()
        )?;
    }
    tw.flush()?;

    if diagnostics.has_issues() {
        println!();
        println!("Issues:");
        for issue in &diagnostics.issues {
            println!("  {issue}");
        }
    }
    Ok(())
}
