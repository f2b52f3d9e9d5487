//! N-1 contingency screening.
//!
//! Every line outage is simulated independently: solve the post-outage
//! flows, classify every surviving line against its thermal rating, and
//! collect the loadings that cross the violation threshold. A scenario the
//! solver cannot handle becomes an `Error` entry with its failure reason;
//! it never takes the rest of the batch down with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use dlr_core::{GridModel, LineId};
use dlr_rating::RatingContext;

use crate::classify::{classify_line, sort_by_loading, LoadingBands, LoadingResult, RiskCategory};
use crate::power_flow::{solve_with_timeout, PowerFlowSolver};

/// Knobs for a screening run.
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Loadings above this percentage are recorded as violations.
    pub violation_threshold_pct: f64,
    /// Band boundaries used to categorize loadings.
    pub bands: LoadingBands,
    /// Cap on the number of outages evaluated, in canonical line order.
    pub max_outages: Option<usize>,
    /// Per-scenario bound on the solver call.
    pub solve_timeout: Option<Duration>,
    /// Evaluate outages across threads. Output ordering is identical
    /// either way.
    pub parallel: bool,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            violation_threshold_pct: 80.0,
            bands: LoadingBands::default(),
            max_outages: None,
            solve_timeout: None,
            parallel: true,
        }
    }
}

/// Outcome category for one screened outage.
///
/// The first four mirror [`RiskCategory`] for the worst surviving line;
/// `Error` means the scenario could not be evaluated at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContingencyStatus {
    Normal,
    Caution,
    Critical,
    Overloaded,
    Error,
}

impl From<RiskCategory> for ContingencyStatus {
    fn from(category: RiskCategory) -> Self {
        match category {
            RiskCategory::Normal => ContingencyStatus::Normal,
            RiskCategory::Caution => ContingencyStatus::Caution,
            RiskCategory::Critical => ContingencyStatus::Critical,
            RiskCategory::Overloaded => ContingencyStatus::Overloaded,
        }
    }
}

impl ContingencyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContingencyStatus::Normal => "NORMAL",
            ContingencyStatus::Caution => "CAUTION",
            ContingencyStatus::Critical => "CRITICAL",
            ContingencyStatus::Overloaded => "OVERLOADED",
            ContingencyStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for ContingencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One screened outage.
///
/// For a solved scenario, `violations` holds the surviving lines above the
/// threshold ranked worst first, and `max_loading_pct` the worst loading
/// over all rated survivors. For a failed scenario both are empty and
/// `failure` says why.
#[derive(Debug, Clone, Serialize)]
pub struct ContingencyResult {
    pub outage: LineId,
    pub outage_name: String,
    pub status: ContingencyStatus,
    pub violations: Vec<LoadingResult>,
    pub max_loading_pct: Option<f64>,
    pub failure: Option<String>,
}

impl ContingencyResult {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn is_error(&self) -> bool {
        self.status == ContingencyStatus::Error
    }

    fn failed(outage: &LineId, outage_name: String, reason: String) -> Self {
        Self {
            outage: outage.clone(),
            outage_name,
            status: ContingencyStatus::Error,
            violations: Vec::new(),
            max_loading_pct: None,
            failure: Some(reason),
        }
    }
}

/// Cooperative stop signal for long batches.
///
/// Cancelling stops new scenarios from starting; scenarios already in
/// flight run to completion and their results are kept.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Screen a single line outage.
pub fn screen_one(
    grid: &Arc<GridModel>,
    solver: &Arc<dyn PowerFlowSolver>,
    ctx: &RatingContext<'_>,
    config: &ScreenerConfig,
    outage: &LineId,
) -> ContingencyResult {
    let outaged_line = match grid.line(outage) {
        Some(line) => line,
        None => {
            return ContingencyResult::failed(
                outage,
                outage.to_string(),
                format!("line '{}' not in the model", outage),
            );
        }
    };
    let outage_name = outaged_line.branch_name.clone();

    let solved = match config.solve_timeout {
        Some(timeout) => solve_with_timeout(
            Arc::clone(solver),
            Arc::clone(grid),
            Some(outage.clone()),
            timeout,
        ),
        None => solver.solve(grid, Some(outage)),
    };
    let flows = match solved {
        Ok(flows) => flows,
        Err(err) => return ContingencyResult::failed(outage, outage_name, err.to_string()),
    };

    let mut violations = Vec::new();
    let mut max_loading: Option<f64> = None;
    for line in grid.lines() {
        if line.id == *outage {
            continue;
        }
        let Some(flow) = flows.flow(&line.id) else {
            continue;
        };
        // unrated lines carry unknown risk; they are enumerated once per
        // request by the base-case report rather than per outage
        let Ok(result) = classify_line(grid, ctx, line, flow, &config.bands) else {
            continue;
        };
        let pct = result.loading_pct.value();
        max_loading = Some(max_loading.map_or(pct, |m| m.max(pct)));
        if pct > config.violation_threshold_pct {
            violations.push(result);
        }
    }
    sort_by_loading(&mut violations);

    let status = if violations.is_empty() {
        ContingencyStatus::Normal
    } else {
        // with violations present the overall max sits among them
        config
            .bands
            .categorize(max_loading.unwrap_or(0.0))
            .into()
    };

    ContingencyResult {
        outage: outage.clone(),
        outage_name,
        status,
        violations,
        max_loading_pct: max_loading,
        failure: None,
    }
}

/// Screen a batch of outages and rank the results.
///
/// Ranking is by violation count descending, then maximum loading
/// descending (failed scenarios sort last), then outage id ascending. The
/// ranking is applied after collection, so parallel completion order never
/// shows through.
pub fn screen_all(
    grid: &Arc<GridModel>,
    solver: &Arc<dyn PowerFlowSolver>,
    ctx: &RatingContext<'_>,
    config: &ScreenerConfig,
    outages: &[LineId],
    cancel: Option<&CancelToken>,
) -> Vec<ContingencyResult> {
    let run = |outage: &LineId| -> Option<ContingencyResult> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return None;
        }
        Some(screen_one(grid, solver, ctx, config, outage))
    };

    #[cfg(feature = "parallel")]
    let mut results: Vec<ContingencyResult> = if config.parallel {
        outages.par_iter().filter_map(run).collect()
    } else {
        outages.iter().filter_map(run).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let mut results: Vec<ContingencyResult> = outages.iter().filter_map(run).collect();

    rank_contingencies(&mut results);
    results
}

/// Deterministic ranking shared by every screening entry point.
pub fn rank_contingencies(results: &mut [ContingencyResult]) {
    results.sort_by(|a, b| {
        b.violations
            .len()
            .cmp(&a.violations.len())
            .then_with(|| {
                let la = a.max_loading_pct.unwrap_or(f64::NEG_INFINITY);
                let lb = b.max_loading_pct.unwrap_or(f64::NEG_INFINITY);
                lb.total_cmp(&la)
            })
            .then_with(|| a.outage.cmp(&b.outage))
    });
}
