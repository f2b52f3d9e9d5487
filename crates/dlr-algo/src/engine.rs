//! The screening engine.
//!
//! One owner for the pieces every query needs: the immutable grid, the
//! rating model, the power-flow solver, and the run configuration. Each
//! query takes the weather as an argument and builds its own request-scoped
//! rating context, so there is no ambient state to reset between calls and
//! two queries with different weather can run back to back or in parallel.

use std::sync::Arc;

use dlr_core::{AmbientConditions, GridModel, LineId};
use dlr_rating::{RatingContext, ThermalRatingProvider};

use crate::classify::classify_base_case;
use crate::power_flow::{DcFlowSolver, PowerFlowSolver};
use crate::report::{BaseCaseReport, ScreeningReport};
use crate::screening::{screen_all, CancelToken, ContingencyResult, ScreenerConfig};
use crate::sweep::{
    find_critical_temperature, CriticalTemperature, SweepRange, TemperatureSweep, WindSweep,
};

pub struct ScreeningEngine {
    grid: Arc<GridModel>,
    provider: Arc<dyn ThermalRatingProvider>,
    solver: Arc<dyn PowerFlowSolver>,
    config: ScreenerConfig,
}

impl ScreeningEngine {
    /// Engine with the DC solver and default configuration.
    pub fn new(grid: Arc<GridModel>, provider: Arc<dyn ThermalRatingProvider>) -> Self {
        Self {
            grid,
            provider,
            solver: Arc::new(DcFlowSolver::with_default_backend()),
            config: ScreenerConfig::default(),
        }
    }

    pub fn with_solver(mut self, solver: Arc<dyn PowerFlowSolver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_config(mut self, config: ScreenerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Classify every line at its nominal flow under the given weather.
    pub fn analyze_base_case(&self, ambient: &AmbientConditions) -> BaseCaseReport {
        let ctx = RatingContext::new(self.provider.as_ref(), ambient);
        let (loadings, unrated) = classify_base_case(&self.grid, &ctx, &self.config.bands);
        BaseCaseReport::new(loadings, unrated)
    }

    /// Screen line outages under the given weather.
    ///
    /// `outages` of `None` means every line in canonical id order;
    /// `max_outages` then truncates that list.
    pub fn screen_contingencies(
        &self,
        ambient: &AmbientConditions,
        outages: Option<&[LineId]>,
    ) -> Vec<ContingencyResult> {
        self.screen_with(ambient, outages, None)
    }

    /// Same as [`screen_contingencies`](Self::screen_contingencies) but
    /// stoppable through `cancel`.
    pub fn screen_contingencies_with_cancel(
        &self,
        ambient: &AmbientConditions,
        outages: Option<&[LineId]>,
        cancel: &CancelToken,
    ) -> Vec<ContingencyResult> {
        self.screen_with(ambient, outages, Some(cancel))
    }

    fn screen_with(
        &self,
        ambient: &AmbientConditions,
        outages: Option<&[LineId]>,
        cancel: Option<&CancelToken>,
    ) -> Vec<ContingencyResult> {
        let mut selected = match outages {
            Some(ids) => ids.to_vec(),
            None => self.grid.line_ids(),
        };
        if let Some(cap) = self.config.max_outages {
            selected.truncate(cap);
        }
        let ctx = RatingContext::new(self.provider.as_ref(), ambient);
        screen_all(
            &self.grid,
            &self.solver,
            &ctx,
            &self.config,
            &selected,
            cancel,
        )
    }

    /// Lazy base-case stress curve over an ambient temperature axis.
    pub fn temperature_sweep<'a>(
        &'a self,
        ambient: &'a AmbientConditions,
        range: SweepRange,
    ) -> TemperatureSweep<'a> {
        TemperatureSweep::new(
            &self.grid,
            self.provider.as_ref(),
            ambient,
            self.config.bands,
            range,
        )
    }

    /// Lazy base-case stress curve over a wind speed axis.
    pub fn wind_sweep<'a>(
        &'a self,
        ambient: &'a AmbientConditions,
        range: SweepRange,
    ) -> WindSweep<'a> {
        WindSweep::new(
            &self.grid,
            self.provider.as_ref(),
            ambient,
            self.config.bands,
            range,
        )
    }

    /// First ambient temperature at which the base case overloads.
    pub fn find_critical_temperature(
        &self,
        ambient: &AmbientConditions,
        range: SweepRange,
    ) -> Option<CriticalTemperature> {
        find_critical_temperature(
            &self.grid,
            self.provider.as_ref(),
            ambient,
            &self.config.bands,
            range,
        )
    }

    /// Base case, full N-1 screen, and optionally the temperature curve,
    /// in one report.
    pub fn full_report(&self, ambient: &AmbientConditions, include_sweep: bool) -> ScreeningReport {
        let base_case = self.analyze_base_case(ambient);
        let contingencies = self.screen_contingencies(ambient, None);
        let sweep = include_sweep.then(|| {
            self.temperature_sweep(ambient, SweepRange::temperature())
                .collect()
        });
        ScreeningReport::new(ambient.clone(), base_case, contingencies, sweep)
    }
}
