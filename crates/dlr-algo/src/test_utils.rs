//! Shared fixtures for the analysis tests.

use std::time::Duration;

use dlr_core::units::{Amperes, Celsius, Kilovolts, Megawatts};
use dlr_core::{AmbientConditions, Bus, ConductorSpec, GridModel, LineId, TransmissionLine};
use dlr_rating::{RatingUnavailable, ThermalRatingProvider};

use crate::power_flow::{DcFlowSolver, FlowSolution, PowerFlowSolver, SolveError};

pub fn pigeon() -> ConductorSpec {
    ConductorSpec::new("3/0 ACSR 6/1 PIGEON", 0.560, 0.616, 0.251).unwrap()
}

pub fn linnet() -> ConductorSpec {
    ConductorSpec::new("336.4 ACSR 26/7 LINNET", 0.294, 0.322, 0.360).unwrap()
}

/// Three buses in a triangle, mixed conductors and limits.
///
/// Nominal flows 50/30/20 MW, every from-bus at 138 kV.
pub fn create_test_grid() -> GridModel {
    let buses = vec![
        Bus::new("ALPHA138", Kilovolts(138.0)),
        Bus::new("BRAVO138", Kilovolts(138.0)),
        Bus::new("CHARLIE69", Kilovolts(69.0)),
    ];
    let lines = vec![
        TransmissionLine::new(
            "L0",
            "Alpha - Bravo 138kV",
            "ALPHA138",
            "BRAVO138",
            "3/0 ACSR 6/1 PIGEON",
            Celsius(75.0),
        )
        .with_nominal_flow(Megawatts(50.0)),
        TransmissionLine::new(
            "L1",
            "Bravo - Charlie 138kV",
            "BRAVO138",
            "CHARLIE69",
            "336.4 ACSR 26/7 LINNET",
            Celsius(75.0),
        )
        .with_nominal_flow(Megawatts(30.0)),
        TransmissionLine::new(
            "L2",
            "Alpha - Charlie 138kV",
            "ALPHA138",
            "CHARLIE69",
            "3/0 ACSR 6/1 PIGEON",
            Celsius(100.0),
        )
        .with_nominal_flow(Megawatts(20.0)),
    ];
    GridModel::new(buses, lines, vec![pigeon(), linnet()]).unwrap()
}

/// Two buses joined by two parallel circuits carrying `flow_a` and
/// `flow_b` MW. Losing either circuit pushes the whole transfer onto the
/// survivor.
pub fn create_two_line_grid(flow_a: f64, flow_b: f64) -> GridModel {
    let buses = vec![
        Bus::new("NORTH138", Kilovolts(138.0)),
        Bus::new("SOUTH138", Kilovolts(138.0)),
    ];
    let lines = vec![
        TransmissionLine::new(
            "LA",
            "North - South ckt 1",
            "NORTH138",
            "SOUTH138",
            "3/0 ACSR 6/1 PIGEON",
            Celsius(75.0),
        )
        .with_nominal_flow(Megawatts(flow_a)),
        TransmissionLine::new(
            "LB",
            "North - South ckt 2",
            "NORTH138",
            "SOUTH138",
            "3/0 ACSR 6/1 PIGEON",
            Celsius(75.0),
        )
        .with_nominal_flow(Megawatts(flow_b)),
    ];
    GridModel::new(buses, lines, vec![pigeon()]).unwrap()
}

/// Three buses in a line; the outage of either circuit islands a bus.
pub fn create_chain_grid() -> GridModel {
    let buses = vec![
        Bus::new("ALPHA138", Kilovolts(138.0)),
        Bus::new("BRAVO138", Kilovolts(138.0)),
        Bus::new("CHARLIE138", Kilovolts(138.0)),
    ];
    let lines = vec![
        TransmissionLine::new(
            "C0",
            "Alpha - Bravo",
            "ALPHA138",
            "BRAVO138",
            "3/0 ACSR 6/1 PIGEON",
            Celsius(75.0),
        )
        .with_nominal_flow(Megawatts(30.0)),
        TransmissionLine::new(
            "C1",
            "Bravo - Charlie",
            "BRAVO138",
            "CHARLIE138",
            "3/0 ACSR 6/1 PIGEON",
            Celsius(75.0),
        )
        .with_nominal_flow(Megawatts(30.0)),
    ];
    GridModel::new(buses, lines, vec![pigeon()]).unwrap()
}

/// Same ampacity for every conductor and every weather.
pub struct FixedRatingProvider {
    pub amps: Amperes,
}

impl FixedRatingProvider {
    pub fn new(amps: Amperes) -> Self {
        Self { amps }
    }

    /// Ampacity chosen so the MVA rating at `kv` comes out to exactly
    /// `mva`.
    pub fn with_mva(mva: f64, kv: f64) -> Self {
        Self::new(Amperes(mva * 1000.0 / (3f64.sqrt() * kv)))
    }
}

impl ThermalRatingProvider for FixedRatingProvider {
    fn rate(
        &self,
        _conductor: &ConductorSpec,
        _ambient: &AmbientConditions,
        _max_operating_temp: Celsius,
    ) -> Result<Amperes, RatingUnavailable> {
        Ok(self.amps)
    }
}

/// Declines every rating request.
pub struct UnavailableProvider;

impl ThermalRatingProvider for UnavailableProvider {
    fn rate(
        &self,
        _conductor: &ConductorSpec,
        _ambient: &AmbientConditions,
        _max_operating_temp: Celsius,
    ) -> Result<Amperes, RatingUnavailable> {
        Err(RatingUnavailable::new("conductor data incomplete"))
    }
}

/// Blocks for `delay` before answering with an empty solution.
pub struct SleepySolver {
    pub delay: Duration,
}

impl PowerFlowSolver for SleepySolver {
    fn solve(
        &self,
        _grid: &GridModel,
        _outage: Option<&LineId>,
    ) -> Result<FlowSolution, SolveError> {
        std::thread::sleep(self.delay);
        Ok(FlowSolution::new())
    }
}

/// Fails one designated outage, delegates the rest to the DC solver.
pub struct FailForOutage {
    pub outage: LineId,
    pub inner: DcFlowSolver,
}

impl PowerFlowSolver for FailForOutage {
    fn solve(&self, grid: &GridModel, outage: Option<&LineId>) -> Result<FlowSolution, SolveError> {
        if outage == Some(&self.outage) {
            return Err(SolveError::NonConvergent(
                "injected failure for this outage".to_string(),
            ));
        }
        self.inner.solve(grid, outage)
    }
}
