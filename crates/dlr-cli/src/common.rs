//! Shared plumbing for the command handlers: dataset loading, ambient
//! resolution, and output helpers.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use dlr_algo::ScreeningEngine;
use dlr_core::units::{Celsius, FeetPerSecond};
use dlr_core::{AmbientConditions, GridModel};
use dlr_io::load_grid;
use dlr_rating::{ambient_for_date, HeatBalanceProvider};

/// Load a dataset directory, surfacing import diagnostics as log warnings.
pub fn load_dataset(dir: &str) -> Result<GridModel> {
    let (grid, diagnostics) =
        load_grid(dir).with_context(|| format!("loading grid dataset from {dir}"))?;
    for issue in &diagnostics.issues {
        warn!("{issue}");
    }
    Ok(grid)
}

/// Screening engine over a freshly loaded dataset, rated with the
/// heat-balance model.
pub fn build_engine(dir: &str) -> Result<ScreeningEngine> {
    let grid = load_dataset(dir)?;
    Ok(ScreeningEngine::new(
        Arc::new(grid),
        Arc::new(HeatBalanceProvider),
    ))
}

/// Resolve the effective weather for a command.
///
/// Precedence, lowest to highest: built-in defaults, the `--ambient` TOML
/// file, `--date`, then the explicit `--temp`/`--wind` flags.
pub fn resolve_ambient(
    file: Option<&Path>,
    date: Option<NaiveDate>,
    temp: Option<f64>,
    wind: Option<f64>,
) -> Result<AmbientConditions> {
    let mut ambient: AmbientConditions = match file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading ambient overrides from {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("parsing ambient overrides from {}", path.display()))?
        }
        None => AmbientConditions::default(),
    };
    if let Some(date) = date {
        ambient.day_of_year = ambient_for_date(date).day_of_year;
    }
    if let Some(t) = temp {
        ambient.temperature = Celsius(t);
    }
    if let Some(w) = wind {
        ambient.wind_speed = FeetPerSecond(w);
    }
    Ok(ambient)
}

/// Pretty-print a serializable value as JSON on stdout.
pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(io::stdout(), value)
        .map_err(|err| anyhow::anyhow!("serializing to JSON: {err}"))?;
    println!();
    Ok(())
}

/// `107.3%` with one decimal, or a dash when there is nothing to show.
pub fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}%"))
}
