use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grid dataset utilities
    Grid {
        #[command(subcommand)]
        command: GridCommands,
    },
    /// Rate and classify every line at the nominal operating point
    BaseCase(BaseCaseArgs),
    /// N-1 contingency screening with weather-adjusted ratings
    Screen(ScreenArgs),
    /// Base-case stress curve across a temperature or wind axis
    Sweep(SweepArgs),
    /// First ambient temperature at which the base case overloads
    CriticalTemp(CriticalTempArgs),
    /// Full screening report: base case, contingencies, sweep
    Report(ReportArgs),
}

#[derive(Subcommand, Debug)]
pub enum GridCommands {
    /// Load a dataset and print its headline statistics
    Info {
        /// Directory holding the CSV tables
        data_dir: String,
    },
}

#[derive(Args, Debug)]
pub struct BaseCaseArgs {
    /// Directory holding the CSV tables
    pub data_dir: String,
    /// Ambient air temperature in °C
    #[arg(long)]
    pub temp: Option<f64>,
    /// Wind speed at conductor height in ft/s
    #[arg(long)]
    pub wind: Option<f64>,
    /// Calendar date for the solar position (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// TOML file of ambient condition overrides
    #[arg(long)]
    pub ambient: Option<PathBuf>,
    /// Show only the N most loaded lines
    #[arg(long)]
    pub top: Option<usize>,
    /// Emit the report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Directory holding the CSV tables
    pub data_dir: String,
    /// Ambient air temperature in °C
    #[arg(long)]
    pub temp: Option<f64>,
    /// Wind speed at conductor height in ft/s
    #[arg(long)]
    pub wind: Option<f64>,
    /// Calendar date for the solar position (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// TOML file of ambient condition overrides
    #[arg(long)]
    pub ambient: Option<PathBuf>,
    /// Loading percentage above which a surviving line counts as a violation
    #[arg(long, default_value_t = 80.0)]
    pub threshold: f64,
    /// Evaluate only the first N outages in canonical id order
    #[arg(long)]
    pub max_outages: Option<usize>,
    /// Per-outage solve budget in seconds
    #[arg(long)]
    pub timeout_secs: Option<f64>,
    /// Evaluate outages one at a time instead of on the thread pool
    #[arg(long)]
    pub sequential: bool,
    /// Linear system backend (gauss, faer)
    #[arg(long, default_value = "gauss")]
    pub backend: String,
    /// Threading hint (`auto` or integer)
    #[arg(long, default_value = "auto")]
    pub threads: String,
    /// Emit the results as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Directory holding the CSV tables
    pub data_dir: String,
    /// Axis start (°C, or ft/s with --by-wind)
    #[arg(long)]
    pub start: Option<f64>,
    /// Axis end, exclusive (°C, or ft/s with --by-wind)
    #[arg(long)]
    pub end: Option<f64>,
    /// Axis step size
    #[arg(long)]
    pub step: Option<f64>,
    /// Fixed wind speed in ft/s while sweeping temperature
    #[arg(long)]
    pub wind: Option<f64>,
    /// Fixed air temperature in °C while sweeping wind
    #[arg(long)]
    pub temp: Option<f64>,
    /// Calendar date for the solar position (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// TOML file of ambient condition overrides
    #[arg(long)]
    pub ambient: Option<PathBuf>,
    /// Sweep wind speed instead of ambient temperature
    #[arg(long)]
    pub by_wind: bool,
    /// Write the curve as CSV to this path instead of printing a table
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CriticalTempArgs {
    /// Directory holding the CSV tables
    pub data_dir: String,
    /// Wind speed held fixed during the scan, in ft/s
    #[arg(long)]
    pub wind: Option<f64>,
    /// Calendar date for the solar position (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// TOML file of ambient condition overrides
    #[arg(long)]
    pub ambient: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory holding the CSV tables
    pub data_dir: String,
    /// Ambient air temperature in °C
    #[arg(long)]
    pub temp: Option<f64>,
    /// Wind speed at conductor height in ft/s
    #[arg(long)]
    pub wind: Option<f64>,
    /// Calendar date for the solar position (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// TOML file of ambient condition overrides
    #[arg(long)]
    pub ambient: Option<PathBuf>,
    /// Write the report as JSON to this file instead of printing tables
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}
