//! Report aggregation.
//!
//! Pure data shaping: the analysis modules produce ranked pieces and this
//! module assembles them into one serializable report. An empty grid
//! yields a report full of zeros, not an error.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dlr_core::AmbientConditions;

use crate::classify::{LoadingResult, RiskCategory, UnratedLine};
use crate::screening::{ContingencyResult, ContingencyStatus};
use crate::sweep::SweepPoint;

/// How many lines landed in each risk band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub normal: usize,
    pub caution: usize,
    pub critical: usize,
    pub overloaded: usize,
}

impl CategoryCounts {
    pub fn tally<'a>(results: impl IntoIterator<Item = &'a LoadingResult>) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.category {
                RiskCategory::Normal => counts.normal += 1,
                RiskCategory::Caution => counts.caution += 1,
                RiskCategory::Critical => counts.critical += 1,
                RiskCategory::Overloaded => counts.overloaded += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.normal + self.caution + self.critical + self.overloaded
    }
}

/// Coarse operator-facing stress rollup.
///
/// Uses three bands, not four: the critical count absorbs overloads, since
/// for at-a-glance triage anything at or past 90% is the same fire.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StressSummary {
    pub max_loading_pct: f64,
    pub avg_loading_pct: f64,
    /// Lines at or above 90%, overloads included.
    pub critical: usize,
    /// Lines between 60% and 90%.
    pub caution: usize,
    /// Lines below 60%.
    pub normal: usize,
}

impl StressSummary {
    /// `None` when nothing was rated, so there is no average to take.
    pub fn from_loadings(loadings: &[LoadingResult]) -> Option<Self> {
        if loadings.is_empty() {
            return None;
        }
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let (mut critical, mut caution, mut normal) = (0usize, 0usize, 0usize);
        for result in loadings {
            let pct = result.loading_pct.value();
            max = max.max(pct);
            sum += pct;
            if pct >= 90.0 {
                critical += 1;
            } else if pct >= 60.0 {
                caution += 1;
            } else {
                normal += 1;
            }
        }
        Some(Self {
            max_loading_pct: max,
            avg_loading_pct: sum / loadings.len() as f64,
            critical,
            caution,
            normal,
        })
    }
}

/// Base-case loadings with their rollups.
#[derive(Debug, Clone, Serialize)]
pub struct BaseCaseReport {
    /// Rated lines, worst first.
    pub loadings: Vec<LoadingResult>,
    /// Lines the rating model declined, with reasons.
    pub unrated: Vec<UnratedLine>,
    pub counts: CategoryCounts,
    pub stress: Option<StressSummary>,
}

impl BaseCaseReport {
    pub fn new(loadings: Vec<LoadingResult>, unrated: Vec<UnratedLine>) -> Self {
        let counts = CategoryCounts::tally(&loadings);
        let stress = StressSummary::from_loadings(&loadings);
        Self {
            loadings,
            unrated,
            counts,
            stress,
        }
    }

    /// The `n` most loaded lines.
    pub fn top_lines(&self, n: usize) -> &[LoadingResult] {
        &self.loadings[..self.loadings.len().min(n)]
    }
}

/// Loading statistics grouped by conductor type.
#[derive(Debug, Clone, Serialize)]
pub struct ConductorGroup {
    pub conductor: String,
    pub display_name: String,
    pub lines: usize,
    pub max_loading_pct: f64,
    pub avg_loading_pct: f64,
    pub overloaded: usize,
}

/// Group base-case loadings by conductor, sorted by conductor name.
pub fn conductor_breakdown(loadings: &[LoadingResult]) -> Vec<ConductorGroup> {
    let mut groups: Vec<ConductorGroup> = Vec::new();
    for result in loadings {
        let pct = result.loading_pct.value();
        let overload = usize::from(result.category == RiskCategory::Overloaded);
        match groups.iter_mut().find(|g| g.conductor == result.conductor) {
            Some(group) => {
                group.lines += 1;
                group.max_loading_pct = group.max_loading_pct.max(pct);
                // carries the running sum until the final pass below
                group.avg_loading_pct += pct;
                group.overloaded += overload;
            }
            None => groups.push(ConductorGroup {
                conductor: result.conductor.clone(),
                display_name: result.conductor_display.clone(),
                lines: 1,
                max_loading_pct: pct,
                avg_loading_pct: pct,
                overloaded: overload,
            }),
        }
    }
    for group in &mut groups {
        group.avg_loading_pct /= group.lines as f64;
    }
    groups.sort_by(|a, b| a.conductor.cmp(&b.conductor));
    groups
}

/// Rollup counts over a screened contingency batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScreeningSummary {
    pub evaluated: usize,
    pub normal: usize,
    pub caution: usize,
    pub critical: usize,
    pub overloaded: usize,
    pub errors: usize,
    pub total_violations: usize,
}

impl ScreeningSummary {
    pub fn from_results(results: &[ContingencyResult]) -> Self {
        let mut summary = Self {
            evaluated: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                ContingencyStatus::Normal => summary.normal += 1,
                ContingencyStatus::Caution => summary.caution += 1,
                ContingencyStatus::Critical => summary.critical += 1,
                ContingencyStatus::Overloaded => summary.overloaded += 1,
                ContingencyStatus::Error => summary.errors += 1,
            }
            summary.total_violations += result.violation_count();
        }
        summary
    }
}

/// The full screening deliverable.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub generated_at: DateTime<Utc>,
    pub ambient: AmbientConditions,
    pub base_case: BaseCaseReport,
    pub contingencies: Vec<ContingencyResult>,
    pub summary: ScreeningSummary,
    pub temperature_sweep: Option<Vec<SweepPoint>>,
}

impl ScreeningReport {
    pub fn new(
        ambient: AmbientConditions,
        base_case: BaseCaseReport,
        contingencies: Vec<ContingencyResult>,
        temperature_sweep: Option<Vec<SweepPoint>>,
    ) -> Self {
        let summary = ScreeningSummary::from_results(&contingencies);
        Self {
            generated_at: Utc::now(),
            ambient,
            base_case,
            contingencies,
            summary,
            temperature_sweep,
        }
    }
}
