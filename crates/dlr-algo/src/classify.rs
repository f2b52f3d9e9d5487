//! Loading classification against thermal ratings.
//!
//! A line's loading is its power flow as a percentage of the MVA rating its
//! conductor supports under the request's weather. Classification maps that
//! percentage into operator risk bands. Both steps are pure: same inputs,
//! same answer, no state.

use serde::Serialize;

use dlr_core::units::{Kilovolts, Megawatts, MegavoltAmperes, Percent};
use dlr_core::{GridModel, LineId, TransmissionLine};
use dlr_rating::RatingContext;

/// Risk band for a single loading percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Normal,
    Caution,
    Critical,
    Overloaded,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Normal => "NORMAL",
            RiskCategory::Caution => "CAUTION",
            RiskCategory::Critical => "CRITICAL",
            RiskCategory::Overloaded => "OVERLOADED",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band boundaries in percent of rating.
///
/// A loading lands in Normal below `caution_pct`, Caution up to
/// `critical_pct`, Critical up to and including `overload_pct`, and
/// Overloaded strictly above it. Exactly 100% of rating is Critical, not
/// Overloaded: the conductor is at its limit, not past it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadingBands {
    pub caution_pct: f64,
    pub critical_pct: f64,
    pub overload_pct: f64,
}

impl Default for LoadingBands {
    fn default() -> Self {
        Self {
            caution_pct: 60.0,
            critical_pct: 90.0,
            overload_pct: 100.0,
        }
    }
}

impl LoadingBands {
    pub fn categorize(&self, loading_pct: f64) -> RiskCategory {
        if loading_pct > self.overload_pct {
            RiskCategory::Overloaded
        } else if loading_pct >= self.critical_pct {
            RiskCategory::Critical
        } else if loading_pct >= self.caution_pct {
            RiskCategory::Caution
        } else {
            RiskCategory::Normal
        }
    }
}

/// One line's classified loading under one operating point.
#[derive(Debug, Clone, Serialize)]
pub struct LoadingResult {
    pub line: LineId,
    pub branch_name: String,
    pub conductor: String,
    pub conductor_display: String,
    pub voltage: Kilovolts,
    pub flow: Megawatts,
    pub rating: MegavoltAmperes,
    pub loading_pct: Percent,
    pub category: RiskCategory,
}

/// A line the rating model could not produce a limit for.
///
/// An unrated line carries unknown risk. It is reported as such, never
/// folded into the classified set with a zero or infinite rating.
#[derive(Debug, Clone, Serialize)]
pub struct UnratedLine {
    pub line: LineId,
    pub branch_name: String,
    pub reason: String,
}

/// Flow magnitude over rating, in percent.
///
/// Direction does not matter for thermal stress, so the flow's sign is
/// dropped.
pub fn loading_percent(flow: Megawatts, rating: MegavoltAmperes) -> Percent {
    Percent(flow.abs().value() / rating.value() * 100.0)
}

/// Classify one line's loading at the given flow.
///
/// Returns `Err` when the line cannot be rated, with the reason the rating
/// model gave.
pub fn classify_line(
    grid: &GridModel,
    ctx: &RatingContext<'_>,
    line: &TransmissionLine,
    flow: Megawatts,
    bands: &LoadingBands,
) -> Result<LoadingResult, UnratedLine> {
    let unrated = |reason: String| UnratedLine {
        line: line.id.clone(),
        branch_name: line.branch_name.clone(),
        reason,
    };

    let conductor = grid
        .conductor_for(line)
        .ok_or_else(|| unrated(format!("conductor '{}' not in library", line.conductor)))?;
    let voltage = grid
        .line_voltage(line)
        .ok_or_else(|| unrated(format!("no voltage for bus '{}'", line.from_bus)))?;

    let rated = ctx
        .rating_for(conductor, line.max_operating_temp, voltage)
        .map_err(|e| unrated(e.to_string()))?;
    if !(rated.rating.value() > 0.0 && rated.rating.value().is_finite()) {
        return Err(unrated(format!("non-positive rating {}", rated.rating)));
    }

    let loading_pct = loading_percent(flow, rated.rating);
    Ok(LoadingResult {
        line: line.id.clone(),
        branch_name: line.branch_name.clone(),
        conductor: conductor.name.clone(),
        conductor_display: conductor.display_name(),
        voltage,
        flow,
        rating: rated.rating,
        loading_pct,
        category: bands.categorize(loading_pct.value()),
    })
}

/// Classify every line at its nominal flow.
///
/// Rated lines come back ranked by loading descending, ties broken by line
/// id, so the head of the list is always the most stressed circuit.
pub fn classify_base_case(
    grid: &GridModel,
    ctx: &RatingContext<'_>,
    bands: &LoadingBands,
) -> (Vec<LoadingResult>, Vec<UnratedLine>) {
    let mut rated = Vec::new();
    let mut unrated = Vec::new();
    for line in grid.lines() {
        match classify_line(grid, ctx, line, line.nominal_flow, bands) {
            Ok(result) => rated.push(result),
            Err(missing) => unrated.push(missing),
        }
    }
    sort_by_loading(&mut rated);
    (rated, unrated)
}

/// Rank loadings descending, line id ascending on ties.
pub(crate) fn sort_by_loading(results: &mut [LoadingResult]) {
    results.sort_by(|a, b| {
        b.loading_pct
            .value()
            .total_cmp(&a.loading_pct.value())
            .then_with(|| a.line.cmp(&b.line))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_grid, FixedRatingProvider};
    use dlr_core::AmbientConditions;

    #[test]
    fn test_band_edges() {
        let bands = LoadingBands::default();
        assert_eq!(bands.categorize(0.0), RiskCategory::Normal);
        assert_eq!(bands.categorize(59.9), RiskCategory::Normal);
        assert_eq!(bands.categorize(60.0), RiskCategory::Caution);
        assert_eq!(bands.categorize(89.9), RiskCategory::Caution);
        assert_eq!(bands.categorize(90.0), RiskCategory::Critical);
        assert_eq!(bands.categorize(100.0), RiskCategory::Critical);
        assert_eq!(bands.categorize(100.1), RiskCategory::Overloaded);
        assert_eq!(bands.categorize(250.0), RiskCategory::Overloaded);
    }

    #[test]
    fn test_custom_bands() {
        let bands = LoadingBands {
            caution_pct: 50.0,
            critical_pct: 75.0,
            overload_pct: 95.0,
        };
        assert_eq!(bands.categorize(55.0), RiskCategory::Caution);
        assert_eq!(bands.categorize(80.0), RiskCategory::Critical);
        assert_eq!(bands.categorize(96.0), RiskCategory::Overloaded);
    }

    #[test]
    fn test_loading_ignores_flow_direction() {
        let forward = loading_percent(Megawatts(80.0), MegavoltAmperes(100.0));
        let reverse = loading_percent(Megawatts(-80.0), MegavoltAmperes(100.0));
        assert_eq!(forward, reverse);
        assert!((forward.value() - 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let grid = create_test_grid();
        let provider = FixedRatingProvider::with_mva(100.0, 138.0);
        let ambient = AmbientConditions::default();
        let ctx = RatingContext::new(&provider, &ambient);
        let bands = LoadingBands::default();
        let line = grid.line(&LineId::new("L0")).unwrap();

        let first = classify_line(&grid, &ctx, line, Megawatts(50.0), &bands).unwrap();
        let second = classify_line(&grid, &ctx, line, Megawatts(50.0), &bands).unwrap();
        assert_eq!(first.loading_pct, second.loading_pct);
        assert_eq!(first.category, second.category);
        assert_eq!(first.rating, second.rating);
    }

    #[test]
    fn test_base_case_ranked_descending() {
        let grid = create_test_grid();
        let provider = FixedRatingProvider::with_mva(100.0, 138.0);
        let ambient = AmbientConditions::default();
        let ctx = RatingContext::new(&provider, &ambient);

        let (rated, unrated) = classify_base_case(&grid, &ctx, &LoadingBands::default());
        assert!(unrated.is_empty());
        assert_eq!(rated.len(), 3);
        // nominal flows 50 / 30 / 20 against a flat 100 MVA rating
        assert_eq!(rated[0].line, LineId::new("L0"));
        assert!((rated[0].loading_pct.value() - 50.0).abs() < 1e-9);
        assert_eq!(rated[1].line, LineId::new("L1"));
        assert_eq!(rated[2].line, LineId::new("L2"));
        assert!(rated.windows(2).all(|w| {
            w[0].loading_pct.value() >= w[1].loading_pct.value()
        }));
    }

    #[test]
    fn test_unavailable_rating_is_reported_not_classified() {
        let grid = create_test_grid();
        let provider = crate::test_utils::UnavailableProvider;
        let ambient = AmbientConditions::default();
        let ctx = RatingContext::new(&provider, &ambient);

        let (rated, unrated) = classify_base_case(&grid, &ctx, &LoadingBands::default());
        assert!(rated.is_empty());
        assert_eq!(unrated.len(), 3);
        assert!(unrated[0].reason.contains("rating unavailable"));
    }

    #[test]
    fn test_conductor_display_carried_through() {
        let grid = create_test_grid();
        let provider = FixedRatingProvider::with_mva(100.0, 138.0);
        let ambient = AmbientConditions::default();
        let ctx = RatingContext::new(&provider, &ambient);

        let (rated, _) = classify_base_case(&grid, &ctx, &LoadingBands::default());
        let pigeon = rated
            .iter()
            .find(|r| r.conductor.contains("PIGEON"))
            .unwrap();
        assert_eq!(pigeon.conductor_display, "3/0 PIGEON");
    }
}
