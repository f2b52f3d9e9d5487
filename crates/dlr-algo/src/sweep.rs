//! Weather sweeps and critical temperature search.
//!
//! Planning studies ask "at what ambient temperature does this system
//! start overloading" and "how does loading relax as the wind picks up".
//! Both walk the base case across a weather axis, one rating context per
//! point so every point gets ratings for exactly its own weather.

use serde::Serialize;

use dlr_core::units::{Celsius, FeetPerSecond};
use dlr_core::{AmbientConditions, GridModel};
use dlr_rating::{RatingContext, ThermalRatingProvider};

use crate::classify::{classify_base_case, LoadingBands, LoadingResult, RiskCategory};

/// Half-open sweep axis `[start, end)` walked in `step` increments.
///
/// Values are generated by index multiplication rather than repeated
/// addition, so long sweeps do not accumulate float drift. A non-positive
/// step yields no values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl SweepRange {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        Self { start, end, step }
    }

    /// Default ambient temperature axis for curve generation.
    pub fn temperature() -> Self {
        Self::new(25.0, 60.0, 5.0)
    }

    /// Fine-grained axis for the critical temperature search.
    pub fn critical_scan() -> Self {
        Self::new(25.0, 70.0, 1.0)
    }

    /// Default wind speed axis, from still air upward.
    pub fn wind() -> Self {
        Self::new(0.0, 10.0, 2.0)
    }

    fn value_at(&self, index: usize) -> Option<f64> {
        if self.step <= 0.0 {
            return None;
        }
        let value = self.start + index as f64 * self.step;
        (value < self.end).then_some(value)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..).map_while(|i| self.value_at(i))
    }
}

/// Base-case stress at one sweep point.
#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub temperature: Celsius,
    /// Worst loading across rated lines; `None` when nothing could be
    /// rated at this point.
    pub max_loading_pct: Option<f64>,
    /// Lines loaded past their rating.
    pub overloaded: usize,
}

/// Base-case stress at one wind speed.
#[derive(Debug, Clone, Serialize)]
pub struct WindSweepPoint {
    pub wind_speed: FeetPerSecond,
    pub max_loading_pct: Option<f64>,
    pub overloaded: usize,
}

/// First temperature at which the base case overloads.
#[derive(Debug, Clone, Serialize)]
pub struct CriticalTemperature {
    pub temperature: Celsius,
    /// The most loaded line at that temperature.
    pub first_overload: LoadingResult,
}

/// Lazy iterator over base-case stress as ambient temperature rises.
///
/// Points are computed on demand, so a consumer that stops early never
/// pays for the rest of the axis.
pub struct TemperatureSweep<'a> {
    grid: &'a GridModel,
    provider: &'a dyn ThermalRatingProvider,
    ambient: &'a AmbientConditions,
    bands: LoadingBands,
    range: SweepRange,
    index: usize,
}

impl<'a> TemperatureSweep<'a> {
    pub fn new(
        grid: &'a GridModel,
        provider: &'a dyn ThermalRatingProvider,
        ambient: &'a AmbientConditions,
        bands: LoadingBands,
        range: SweepRange,
    ) -> Self {
        Self {
            grid,
            provider,
            ambient,
            bands,
            range,
            index: 0,
        }
    }
}

impl Iterator for TemperatureSweep<'_> {
    type Item = SweepPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let temperature = Celsius(self.range.value_at(self.index)?);
        self.index += 1;

        let at_point = self.ambient.clone().with_temperature(temperature);
        let (max_loading_pct, overloaded) =
            stress_at(self.grid, self.provider, &at_point, &self.bands);
        Some(SweepPoint {
            temperature,
            max_loading_pct,
            overloaded,
        })
    }
}

/// Lazy iterator over base-case stress as wind speed rises.
pub struct WindSweep<'a> {
    grid: &'a GridModel,
    provider: &'a dyn ThermalRatingProvider,
    ambient: &'a AmbientConditions,
    bands: LoadingBands,
    range: SweepRange,
    index: usize,
}

impl<'a> WindSweep<'a> {
    pub fn new(
        grid: &'a GridModel,
        provider: &'a dyn ThermalRatingProvider,
        ambient: &'a AmbientConditions,
        bands: LoadingBands,
        range: SweepRange,
    ) -> Self {
        Self {
            grid,
            provider,
            ambient,
            bands,
            range,
            index: 0,
        }
    }
}

impl Iterator for WindSweep<'_> {
    type Item = WindSweepPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let wind_speed = FeetPerSecond(self.range.value_at(self.index)?);
        self.index += 1;

        let at_point = self.ambient.clone().with_wind_speed(wind_speed);
        let (max_loading_pct, overloaded) =
            stress_at(self.grid, self.provider, &at_point, &self.bands);
        Some(WindSweepPoint {
            wind_speed,
            max_loading_pct,
            overloaded,
        })
    }
}

/// Scan ascending temperatures and return the first one where any line's
/// loading crosses the overload boundary.
///
/// The scan stops at the first qualifying temperature rather than looking
/// for the worst one, so a system that overloads at 40 °C reports 40 even
/// if 55 °C would be more severe.
pub fn find_critical_temperature(
    grid: &GridModel,
    provider: &dyn ThermalRatingProvider,
    ambient: &AmbientConditions,
    bands: &LoadingBands,
    range: SweepRange,
) -> Option<CriticalTemperature> {
    for value in range.values() {
        let temperature = Celsius(value);
        let at_point = ambient.clone().with_temperature(temperature);
        let ctx = RatingContext::new(provider, &at_point);
        let (rated, _) = classify_base_case(grid, &ctx, bands);
        if let Some(worst) = rated.first() {
            if worst.category == RiskCategory::Overloaded {
                return Some(CriticalTemperature {
                    temperature,
                    first_overload: worst.clone(),
                });
            }
        }
    }
    None
}

/// Worst loading and overload count for the base case under one weather
/// snapshot.
fn stress_at(
    grid: &GridModel,
    provider: &dyn ThermalRatingProvider,
    ambient: &AmbientConditions,
    bands: &LoadingBands,
) -> (Option<f64>, usize) {
    let ctx = RatingContext::new(provider, ambient);
    let (rated, _) = classify_base_case(grid, &ctx, bands);
    let max = rated.first().map(|r| r.loading_pct.value());
    let overloaded = rated
        .iter()
        .filter(|r| r.category == RiskCategory::Overloaded)
        .count();
    (max, overloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_grid, FixedRatingProvider};
    use dlr_rating::{HeatBalanceProvider, RatingUnavailable};
    use dlr_core::units::Amperes;
    use dlr_core::ConductorSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Ampacity shrinks linearly as ambient temperature rises.
    struct DecayProvider;

    impl ThermalRatingProvider for DecayProvider {
        fn rate(
            &self,
            _conductor: &ConductorSpec,
            ambient: &AmbientConditions,
            _max_operating_temp: Celsius,
        ) -> Result<Amperes, RatingUnavailable> {
            Ok(Amperes(1000.0 - 5.0 * ambient.temperature.value()))
        }
    }

    /// Overloads the grid from 40 °C on, and much harder from 55 °C on.
    struct SteppedProvider;

    impl ThermalRatingProvider for SteppedProvider {
        fn rate(
            &self,
            _conductor: &ConductorSpec,
            ambient: &AmbientConditions,
            _max_operating_temp: Celsius,
        ) -> Result<Amperes, RatingUnavailable> {
            let temp = ambient.temperature.value();
            let amps = if temp >= 55.0 {
                40.0
            } else if temp >= 40.0 {
                195.0
            } else {
                900.0
            };
            Ok(Amperes(amps))
        }
    }

    #[test]
    fn test_range_values_are_half_open() {
        let temps: Vec<f64> = SweepRange::temperature().values().collect();
        assert_eq!(temps, vec![25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0]);

        let scan: Vec<f64> = SweepRange::critical_scan().values().collect();
        assert_eq!(scan.len(), 45);
        assert_eq!(scan[0], 25.0);
        assert_eq!(scan[44], 69.0);

        assert_eq!(SweepRange::new(10.0, 20.0, 0.0).values().count(), 0);
        assert_eq!(SweepRange::new(10.0, 10.0, 1.0).values().count(), 0);
    }

    #[test]
    fn test_sweep_is_lazy() {
        struct Counting(AtomicUsize);
        impl ThermalRatingProvider for Counting {
            fn rate(
                &self,
                _conductor: &ConductorSpec,
                _ambient: &AmbientConditions,
                _max_operating_temp: Celsius,
            ) -> Result<Amperes, RatingUnavailable> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(Amperes(500.0))
            }
        }

        let grid = create_test_grid();
        let provider = Counting(AtomicUsize::new(0));
        let ambient = AmbientConditions::default();
        let sweep = TemperatureSweep::new(
            &grid,
            &provider,
            &ambient,
            LoadingBands::default(),
            SweepRange::temperature(),
        );

        let points: Vec<_> = sweep.take(2).collect();
        assert_eq!(points.len(), 2);
        // three distinct (conductor, limit) pairs per point, two points
        assert_eq!(provider.0.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_loading_grows_with_temperature() {
        let grid = create_test_grid();
        let provider = DecayProvider;
        let ambient = AmbientConditions::default();
        let points: Vec<SweepPoint> = TemperatureSweep::new(
            &grid,
            &provider,
            &ambient,
            LoadingBands::default(),
            SweepRange::temperature(),
        )
        .collect();

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].temperature, Celsius(25.0));
        let maxes: Vec<f64> = points.iter().map(|p| p.max_loading_pct.unwrap()).collect();
        assert!(maxes.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_critical_temperature_is_first_not_worst() {
        let grid = create_test_grid();
        let provider = SteppedProvider;
        let ambient = AmbientConditions::default();

        // sanity: 195 A at 138 kV is about 46.6 MVA, so the 50 MW line
        // sits just past 107% once the step provider kicks in
        let critical = find_critical_temperature(
            &grid,
            &provider,
            &ambient,
            &LoadingBands::default(),
            SweepRange::critical_scan(),
        )
        .unwrap();
        assert_eq!(critical.temperature, Celsius(40.0));
        assert!(critical.first_overload.loading_pct.value() > 100.0);
    }

    #[test]
    fn test_critical_temperature_absent_when_headroom_holds() {
        let grid = create_test_grid();
        let provider = FixedRatingProvider::with_mva(500.0, 138.0);
        let ambient = AmbientConditions::default();

        let critical = find_critical_temperature(
            &grid,
            &provider,
            &ambient,
            &LoadingBands::default(),
            SweepRange::critical_scan(),
        );
        assert!(critical.is_none());
    }

    #[test]
    fn test_wind_relaxes_loading() {
        let grid = create_test_grid();
        let provider = HeatBalanceProvider;
        let ambient = AmbientConditions::default().with_temperature(Celsius(35.0));
        let points: Vec<WindSweepPoint> = WindSweep::new(
            &grid,
            &provider,
            &ambient,
            LoadingBands::default(),
            SweepRange::wind(),
        )
        .collect();

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].wind_speed, FeetPerSecond(0.0));
        let maxes: Vec<f64> = points.iter().map(|p| p.max_loading_pct.unwrap()).collect();
        assert!(maxes.windows(2).all(|w| w[1] <= w[0]));
    }
}
