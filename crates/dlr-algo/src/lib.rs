//! # dlr-algo: Thermal Screening Analyses
//!
//! The analysis layer on top of [`dlr_core`] and [`dlr_rating`]: base-case
//! loading classification, N-1 contingency screening, weather sweeps, and
//! report assembly.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`classify`] | Loading percentages and risk bands |
//! | [`power_flow`] | DC power flow behind the [`PowerFlowSolver`] seam |
//! | [`screening`] | Per-outage evaluation with failure isolation |
//! | [`sweep`] | Temperature and wind curves, critical temperature search |
//! | [`report`] | Rollups and the serializable [`ScreeningReport`] |
//! | [`engine`] | [`ScreeningEngine`], the facade the CLI drives |
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dlr_algo::ScreeningEngine;
//! use dlr_core::AmbientConditions;
//! use dlr_core::units::Celsius;
//! use dlr_rating::HeatBalanceProvider;
//!
//! let engine = ScreeningEngine::new(Arc::new(grid), Arc::new(HeatBalanceProvider));
//! let ambient = AmbientConditions::default().with_temperature(Celsius(35.0));
//! let report = engine.full_report(&ambient, true);
//! println!("{} contingencies, {} violations",
//!     report.summary.evaluated, report.summary.total_violations);
//! ```

pub mod classify;
pub mod engine;
pub mod power_flow;
pub mod report;
pub mod screening;
pub mod sweep;
#[cfg(test)]
pub mod test_utils;

pub use classify::{
    classify_base_case, classify_line, loading_percent, LoadingBands, LoadingResult, RiskCategory,
    UnratedLine,
};
pub use engine::ScreeningEngine;
pub use power_flow::{
    solve_with_timeout, DcFlowSolver, FlowSolution, PowerFlowSolver, SolveError,
};
pub use report::{
    conductor_breakdown, BaseCaseReport, CategoryCounts, ConductorGroup, ScreeningReport,
    ScreeningSummary, StressSummary,
};
pub use screening::{
    rank_contingencies, screen_all, screen_one, CancelToken, ContingencyResult, ContingencyStatus,
    ScreenerConfig,
};
pub use sweep::{
    find_critical_temperature, CriticalTemperature, SweepPoint, SweepRange, TemperatureSweep,
    WindSweep, WindSweepPoint,
};
