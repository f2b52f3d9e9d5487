//! Row shapes for the CSV tables.
//!
//! Column names follow the source exports: lines and buses use the
//! planning-tool conventions (`bus0`/`bus1`, `v_nom`), the conductor
//! library keeps its catalog headers (`RES_25C` in ohms per mile,
//! `CDRAD_in` in inches).

use serde::Deserialize;

/// **Expected CSV format:** name, branch_name, bus0, bus1, conductor, MOT, x
///
/// `branch_name` and `x` may be absent; the loader falls back to the line
/// name and the default reactance.
#[derive(Debug, Clone, Deserialize)]
pub struct LineRow {
    pub name: String,
    pub branch_name: Option<String>,
    pub bus0: String,
    pub bus1: String,
    pub conductor: String,
    #[serde(rename = "MOT")]
    pub max_operating_temp: f64,
    pub x: Option<f64>,
}

/// **Expected CSV format:** name, v_nom (kV)
#[derive(Debug, Clone, Deserialize)]
pub struct BusRow {
    pub name: String,
    pub v_nom: f64,
}

/// **Expected CSV format:** ConductorName, RES_25C, RES_50C, CDRAD_in
#[derive(Debug, Clone, Deserialize)]
pub struct ConductorRow {
    #[serde(rename = "ConductorName")]
    pub name: String,
    #[serde(rename = "RES_25C")]
    pub resistance_25c: f64,
    #[serde(rename = "RES_50C")]
    pub resistance_50c: f64,
    #[serde(rename = "CDRAD_in")]
    pub core_radius: f64,
}

/// **Expected CSV format:** name, p0_nominal (MW, signed, from-bus side)
#[derive(Debug, Clone, Deserialize)]
pub struct FlowRow {
    pub name: String,
    pub p0_nominal: f64,
}
