//! DC power flow over the transmission graph.
//!
//! Contingency screening needs post-outage flows. This module provides the
//! [`PowerFlowSolver`] seam the screener calls through, a linearized DC
//! implementation of it, and a timeout wrapper that keeps a stuck solve
//! from stalling a batch. Tests substitute stub solvers through the same
//! trait.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use dlr_core::solver::{LinearSystemBackend, SolverKind};
use dlr_core::units::Megawatts;
use dlr_core::{BusId, GridModel, LineId};

/// Why a power-flow scenario could not be solved.
///
/// Distinct from "solved with violations": a violation is an answer, these
/// are the absence of one.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SolveError {
    #[error("solver failed to converge: {0}")]
    NonConvergent(String),
    #[error("network splits into islands: {0}")]
    Islanded(String),
    #[error("solve exceeded the {}ms limit", .0.as_millis())]
    Timeout(Duration),
}

/// Per-line active power flows for one solved operating point.
#[derive(Debug, Clone, Default)]
pub struct FlowSolution {
    flows: HashMap<LineId, Megawatts>,
}

impl FlowSolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, line: LineId, flow: Megawatts) {
        self.flows.insert(line, flow);
    }

    pub fn flow(&self, line: &LineId) -> Option<Megawatts> {
        self.flows.get(line).copied()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LineId, Megawatts)> {
        self.flows.iter().map(|(id, flow)| (id, *flow))
    }
}

impl FromIterator<(LineId, Megawatts)> for FlowSolution {
    fn from_iter<T: IntoIterator<Item = (LineId, Megawatts)>>(iter: T) -> Self {
        Self {
            flows: iter.into_iter().collect(),
        }
    }
}

/// Solves the network operating point, optionally with one line removed.
///
/// Implementations must treat the grid as read-only so independent outage
/// scenarios can be evaluated concurrently.
pub trait PowerFlowSolver: Send + Sync {
    fn solve(&self, grid: &GridModel, outage: Option<&LineId>) -> Result<FlowSolution, SolveError>;
}

/// Linearized DC power flow.
///
/// **Algorithm:** classic B'θ = P formulation
/// (doi:10.1109/TPWRS.2009.2021235). Nodal injections are derived from the
/// nominal line flows, the susceptance matrix is assembled from branch
/// reactances with the outaged line removed, the first bus in id order is
/// the slack, and post-outage flows are read back from angle differences.
pub struct DcFlowSolver {
    backend: Arc<dyn LinearSystemBackend>,
}

impl DcFlowSolver {
    pub fn new(backend: Arc<dyn LinearSystemBackend>) -> Self {
        Self { backend }
    }

    pub fn with_default_backend() -> Self {
        Self::new(SolverKind::default().build())
    }
}

impl Default for DcFlowSolver {
    fn default() -> Self {
        Self::with_default_backend()
    }
}

impl PowerFlowSolver for DcFlowSolver {
    fn solve(&self, grid: &GridModel, outage: Option<&LineId>) -> Result<FlowSolution, SolveError> {
        check_connected(grid, outage)?;

        let angles = compute_angles(grid, outage, self.backend.as_ref())?;

        let mut solution = FlowSolution::new();
        for edge in grid.graph.edge_references() {
            let line = edge.weight();
            if outage == Some(&line.id) {
                continue;
            }
            let theta_from = *angles.get(&line.from_bus).unwrap_or(&0.0);
            let theta_to = *angles.get(&line.to_bus).unwrap_or(&0.0);
            let flow = (theta_from - theta_to) / effective_reactance(line.reactance);
            solution.insert(line.id.clone(), Megawatts(flow));
        }
        Ok(solution)
    }
}

/// Run a solve on its own thread and give up after `timeout`.
///
/// The worker is detached: if the solver hangs past the deadline the result
/// is discarded whenever the thread eventually finishes, and the caller
/// moves on immediately with [`SolveError::Timeout`].
pub fn solve_with_timeout(
    solver: Arc<dyn PowerFlowSolver>,
    grid: Arc<GridModel>,
    outage: Option<LineId>,
    timeout: Duration,
) -> Result<FlowSolution, SolveError> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = solver.solve(&grid, outage.as_ref());
        let _ = tx.send(result);
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(SolveError::Timeout(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolveError::NonConvergent(
            "solver worker terminated before producing a result".to_string(),
        )),
    }
}

/// Floor on reactance so a zero-impedance branch cannot blow up the
/// susceptance matrix.
fn effective_reactance(reactance: f64) -> f64 {
    reactance.abs().max(1e-6)
}

/// Reject topologies the reduced susceptance system cannot represent.
///
/// Breadth-first search from the first bus, skipping the outaged line. Any
/// unreachable bus means the matrix is singular, so the failure is reported
/// up front with the bus that came loose instead of as a numeric error.
fn check_connected(grid: &GridModel, outage: Option<&LineId>) -> Result<(), SolveError> {
    let bus_ids = sorted_bus_ids(grid);
    if bus_ids.len() <= 1 {
        return Ok(());
    }

    let mut adjacency: HashMap<&BusId, Vec<&BusId>> = HashMap::new();
    for edge in grid.graph.edge_references() {
        let line = edge.weight();
        if outage == Some(&line.id) {
            continue;
        }
        adjacency.entry(&line.from_bus).or_default().push(&line.to_bus);
        adjacency.entry(&line.to_bus).or_default().push(&line.from_bus);
    }

    let mut seen: HashSet<&BusId> = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(&bus_ids[0]);
    queue.push_back(&bus_ids[0]);
    while let Some(bus) = queue.pop_front() {
        if let Some(neighbors) = adjacency.get(bus) {
            for &next in neighbors {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    if let Some(stranded) = bus_ids.iter().find(|id| !seen.contains(id)) {
        let detail = match outage {
            Some(line) => format!("outage of '{}' strands bus '{}'", line, stranded),
            None => format!("bus '{}' is unreachable from '{}'", stranded, bus_ids[0]),
        };
        return Err(SolveError::Islanded(detail));
    }
    Ok(())
}

fn sorted_bus_ids(grid: &GridModel) -> Vec<BusId> {
    let mut ids: Vec<BusId> = grid.buses().iter().map(|b| b.id.clone()).collect();
    ids.sort();
    ids
}

/// Net MW injection at each bus implied by the nominal line flows.
///
/// Every line pushes its nominal flow out of its from-bus and into its
/// to-bus. The outaged line still contributes: generation and load do not
/// move when a circuit trips, only the paths between them do.
fn nominal_injections(grid: &GridModel) -> HashMap<BusId, f64> {
    let mut injections: HashMap<BusId, f64> = HashMap::new();
    for line in grid.lines() {
        let p = line.nominal_flow.value();
        *injections.entry(line.from_bus.clone()).or_insert(0.0) += p;
        *injections.entry(line.to_bus.clone()).or_insert(0.0) -= p;
    }
    injections
}

/// Assemble B' with the outaged line skipped.
///
/// Each surviving branch adds +1/x on its two diagonal entries and -1/x on
/// the off-diagonals.
fn build_susceptance(grid: &GridModel, outage: Option<&LineId>) -> (Vec<BusId>, Vec<Vec<f64>>) {
    let bus_ids = sorted_bus_ids(grid);
    let mut id_to_index = HashMap::with_capacity(bus_ids.len());
    for (idx, bus_id) in bus_ids.iter().enumerate() {
        id_to_index.insert(bus_id.clone(), idx);
    }

    let mut susceptance = vec![vec![0.0; bus_ids.len()]; bus_ids.len()];
    for edge in grid.graph.edge_references() {
        let line = edge.weight();
        if outage == Some(&line.id) {
            continue;
        }
        if let (Some(&i), Some(&j)) = (
            id_to_index.get(&line.from_bus),
            id_to_index.get(&line.to_bus),
        ) {
            let b = 1.0 / effective_reactance(line.reactance);
            susceptance[i][j] -= b;
            susceptance[j][i] -= b;
            susceptance[i][i] += b;
            susceptance[j][j] += b;
        }
    }
    (bus_ids, susceptance)
}

/// Solve B'θ = P for bus voltage angles.
///
/// The first bus in id order is the slack with angle zero; its row and
/// column are dropped so the reduced system is non-singular on a connected
/// network.
fn compute_angles(
    grid: &GridModel,
    outage: Option<&LineId>,
    backend: &dyn LinearSystemBackend,
) -> Result<HashMap<BusId, f64>, SolveError> {
    let (bus_ids, susceptance) = build_susceptance(grid, outage);
    let n = bus_ids.len();
    if n == 0 {
        return Ok(HashMap::new());
    }
    if n == 1 {
        return Ok(HashMap::from([(bus_ids[0].clone(), 0.0)]));
    }

    let injections = nominal_injections(grid);
    let mut reduced = vec![vec![0.0; n - 1]; n - 1];
    let mut rhs = vec![0.0; n - 1];
    for i in 1..n {
        for j in 1..n {
            reduced[i - 1][j - 1] = susceptance[i][j];
        }
        rhs[i - 1] = *injections.get(&bus_ids[i]).unwrap_or(&0.0);
    }

    let solution = backend
        .solve(&reduced, &rhs)
        .map_err(|e| SolveError::NonConvergent(e.to_string()))?;

    let mut angles = HashMap::with_capacity(n);
    angles.insert(bus_ids[0].clone(), 0.0);
    for (i, bus_id) in bus_ids.iter().enumerate().skip(1) {
        angles.insert(bus_id.clone(), solution[i - 1]);
    }
    Ok(angles)
}
