//! Core grid model for thermal-aware contingency screening.
//!
//! This crate holds the shared vocabulary of the workspace: buses,
//! transmission lines, conductor specifications, ambient weather
//! conditions, and the graph-backed [`GridModel`] that ties them together.
//!
//! ## Structure
//!
//! - [`GridModel`]: petgraph-backed network of buses (nodes) and
//!   transmission lines (edges), plus a conductor library keyed by name
//! - [`units`]: newtype wrappers for physical quantities (MW, MVA, °C, ft/s)
//! - [`diagnostics`]: warning/error collection for imports and validation
//! - [`solver`]: dense linear system backends for flow redistribution
//! - [`error`]: unified [`DlrError`] type
//!
//! ## Conventions
//!
//! A line's operating voltage is taken from its from-bus nominal voltage,
//! matching how planning exports join line tables against bus tables.
//! Referential integrity (every line resolving both endpoint buses and its
//! conductor) is enforced at construction; a [`GridModel`] that exists is
//! structurally sound. Softer data-quality concerns are reported through
//! [`diagnostics::Diagnostics`] instead of failing construction.
//!
//! ## Quick Start
//!
//! ```
//! use dlr_core::units::{Celsius, Kilovolts, Megawatts};
//! use dlr_core::{Bus, ConductorSpec, GridModel, TransmissionLine};
//!
//! let buses = vec![
//!     Bus::new("NORTH138", Kilovolts(138.0)),
//!     Bus::new("SOUTH138", Kilovolts(138.0)),
//! ];
//! let conductors = vec![ConductorSpec::new("3/0 ACSR 6/1 PIGEON", 0.560, 0.616, 0.251)?];
//! let lines = vec![TransmissionLine::new(
//!     "L0",
//!     "NORTH TO SOUTH CKT 1",
//!     "NORTH138",
//!     "SOUTH138",
//!     "3/0 ACSR 6/1 PIGEON",
//!     Celsius(75.0),
//! )
//! .with_nominal_flow(Megawatts(42.0))];
//!
//! let grid = GridModel::new(buses, lines, conductors)?;
//! assert_eq!(grid.stats().lines, 1);
//! # Ok::<(), dlr_core::DlrError>(())
//! ```

pub mod diagnostics;
pub mod error;
pub mod solver;
pub mod units;

pub use error::{DlrError, DlrResult};

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::Undirected;
use serde::{Deserialize, Serialize};

use diagnostics::Diagnostics;
use units::{Celsius, Degrees, Feet, FeetPerSecond, Kilovolts, Megawatts};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique bus identifier (e.g., "HONOLULU138").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(pub String);

impl BusId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BusId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Unique transmission line identifier (e.g., "L17").
///
/// `Ord` follows the lexicographic order of the underlying string, which is
/// what ranking ties and outage enumeration sort by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub String);

impl LineId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// =============================================================================
// Conductors
// =============================================================================

/// Physical parameters of a conductor type.
///
/// Resistances are AC resistance in ohms per mile at the two datasheet
/// reference temperatures (25 °C and 50 °C). Resistance at the operating
/// temperature is interpolated linearly between the references and
/// extrapolated linearly above the upper one, which is the standard
/// treatment for ACSR in thermal rating work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductorSpec {
    /// Full catalog name (e.g., "3/0 ACSR 6/1 PIGEON")
    pub name: String,
    /// AC resistance at 25 °C, ohms per mile
    pub resistance_25c: f64,
    /// AC resistance at 50 °C, ohms per mile
    pub resistance_50c: f64,
    /// Conductor radius in inches
    pub core_radius: f64,
}

impl ConductorSpec {
    /// Lower resistance reference temperature.
    pub const LOW_REF: Celsius = Celsius(25.0);
    /// Upper resistance reference temperature.
    pub const HIGH_REF: Celsius = Celsius(50.0);

    /// Create a validated conductor spec.
    pub fn new(
        name: impl Into<String>,
        resistance_25c: f64,
        resistance_50c: f64,
        core_radius: f64,
    ) -> DlrResult<Self> {
        let spec = Self {
            name: name.into(),
            resistance_25c,
            resistance_50c,
            core_radius,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the physical invariants of this spec.
    ///
    /// Metallic resistance rises with temperature, so the 50 °C value must
    /// be at least the 25 °C value; both must be positive, as must the
    /// radius.
    pub fn validate(&self) -> DlrResult<()> {
        if !(self.resistance_25c > 0.0 && self.resistance_25c.is_finite()) {
            return Err(DlrError::Validation(format!(
                "conductor '{}': resistance at 25 °C must be positive, got {}",
                self.name, self.resistance_25c
            )));
        }
        if !(self.resistance_50c.is_finite() && self.resistance_50c >= self.resistance_25c) {
            return Err(DlrError::Validation(format!(
                "conductor '{}': resistance at 50 °C ({}) must not be below the 25 °C value ({})",
                self.name, self.resistance_50c, self.resistance_25c
            )));
        }
        if !(self.core_radius > 0.0 && self.core_radius.is_finite()) {
            return Err(DlrError::Validation(format!(
                "conductor '{}': radius must be positive, got {}",
                self.name, self.core_radius
            )));
        }
        Ok(())
    }

    /// AC resistance in ohms per mile at the given conductor temperature.
    pub fn resistance_at(&self, temp: Celsius) -> f64 {
        let span = Self::HIGH_REF.value() - Self::LOW_REF.value();
        let fraction = (temp.value() - Self::LOW_REF.value()) / span;
        self.resistance_25c + (self.resistance_50c - self.resistance_25c) * fraction
    }

    /// Outside diameter in inches.
    #[inline]
    pub fn diameter(&self) -> f64 {
        self.core_radius * 2.0
    }

    /// Shortened name for tables: ACSR catalog names carry a stranding code
    /// between the size and the code word ("3/0 ACSR 6/1 PIGEON"), which
    /// operators read as just "3/0 PIGEON".
    pub fn display_name(&self) -> String {
        if !self.name.contains("ACSR") {
            return self.name.clone();
        }
        let parts: Vec<&str> = self.name.split_whitespace().collect();
        match parts.as_slice() {
            [] | [_] => self.name.clone(),
            [first, .., last] => format!("{} {}", first, last),
        }
    }
}

// =============================================================================
// Ambient Conditions
// =============================================================================

/// Sky condition used by the solar heat gain model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Atmosphere {
    #[default]
    Clear,
    Industrial,
}

/// Weather and solar inputs shared by every rating evaluated in a request.
///
/// Defaults follow the conservative summer-noon planning assumption: light
/// 2 ft/s wind perpendicular to the conductor, June 12 at solar noon,
/// clear sky at 27° latitude and 1000 ft elevation.
///
/// Deserialization fills missing fields from these defaults, so a partial
/// TOML override file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConditions {
    /// Ambient air temperature
    pub temperature: Celsius,
    /// Wind speed at conductor height
    pub wind_speed: FeetPerSecond,
    /// Angle between wind and conductor axis (90° = perpendicular)
    pub wind_angle: Degrees,
    /// Local solar hour (12.0 = solar noon)
    pub hour_of_day: f64,
    /// Day of year, 1..=365 (163 = June 12)
    pub day_of_year: u32,
    /// Conductor surface emissivity, 0..=1
    pub emissivity: f64,
    /// Conductor solar absorptivity, 0..=1
    pub absorptivity: f64,
    /// Sky condition for solar flux
    pub atmosphere: Atmosphere,
    /// Elevation above sea level
    pub elevation: Feet,
    /// Site latitude
    pub latitude: Degrees,
}

impl Default for AmbientConditions {
    fn default() -> Self {
        Self {
            temperature: Celsius(25.0),
            wind_speed: FeetPerSecond(2.0),
            wind_angle: Degrees(90.0),
            hour_of_day: 12.0,
            day_of_year: 163,
            emissivity: 0.8,
            absorptivity: 0.8,
            atmosphere: Atmosphere::Clear,
            elevation: Feet(1000.0),
            latitude: Degrees(27.0),
        }
    }
}

impl AmbientConditions {
    /// Same conditions at a different air temperature.
    pub fn with_temperature(mut self, temperature: Celsius) -> Self {
        self.temperature = temperature;
        self
    }

    /// Same conditions at a different wind speed.
    pub fn with_wind_speed(mut self, wind_speed: FeetPerSecond) -> Self {
        self.wind_speed = wind_speed;
        self
    }

    /// Same conditions with a different wind attack angle.
    pub fn with_wind_angle(mut self, wind_angle: Degrees) -> Self {
        self.wind_angle = wind_angle;
        self
    }
}

// =============================================================================
// Network Elements
// =============================================================================

/// A substation bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    /// Nominal operating voltage
    pub nominal_voltage: Kilovolts,
}

impl Bus {
    pub fn new(id: impl Into<String>, nominal_voltage: Kilovolts) -> Self {
        Self {
            id: BusId::new(id),
            nominal_voltage,
        }
    }
}

/// Series reactance assumed when the data omits one.
pub const DEFAULT_REACTANCE_PU: f64 = 0.05;

/// An overhead transmission line between two buses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionLine {
    pub id: LineId,
    /// Human-readable branch name (e.g., "HONOLULU TO KAHE CKT 1")
    pub branch_name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// Conductor catalog name, resolved against the grid's conductor library
    pub conductor: String,
    /// Maximum allowed conductor temperature
    pub max_operating_temp: Celsius,
    /// Signed active power at the nominal operating point (from-bus side)
    pub nominal_flow: Megawatts,
    /// Per-unit series reactance, used when redistributing flows
    pub reactance: f64,
}

impl TransmissionLine {
    pub fn new(
        id: impl Into<String>,
        branch_name: impl Into<String>,
        from_bus: impl Into<String>,
        to_bus: impl Into<String>,
        conductor: impl Into<String>,
        max_operating_temp: Celsius,
    ) -> Self {
        Self {
            id: LineId::new(id),
            branch_name: branch_name.into(),
            from_bus: BusId::new(from_bus),
            to_bus: BusId::new(to_bus),
            conductor: conductor.into(),
            max_operating_temp,
            nominal_flow: Megawatts(0.0),
            reactance: DEFAULT_REACTANCE_PU,
        }
    }

    /// Set the nominal operating-point flow.
    pub fn with_nominal_flow(mut self, flow: Megawatts) -> Self {
        self.nominal_flow = flow;
        self
    }

    /// Set the per-unit series reactance.
    pub fn with_reactance(mut self, reactance: f64) -> Self {
        self.reactance = reactance;
        self
    }
}

// =============================================================================
// Grid Model
// =============================================================================

/// Graph-backed transmission network with its conductor library.
///
/// Buses are nodes and transmission lines are edges of an undirected
/// multigraph (parallel circuits between the same pair of buses are
/// ordinary). Construction enforces referential integrity; the model is
/// immutable afterwards, which is what lets screening requests share it
/// across worker threads.
#[derive(Debug, Clone)]
pub struct GridModel {
    /// Underlying graph; exposed for topology work (islanding checks,
    /// susceptance assembly)
    pub graph: Graph<Bus, TransmissionLine, Undirected>,
    conductors: HashMap<String, ConductorSpec>,
    bus_index: HashMap<BusId, NodeIndex>,
    line_index: HashMap<LineId, EdgeIndex>,
}

impl GridModel {
    /// Build a grid from its parts, validating referential integrity.
    ///
    /// Fails when ids are duplicated, a line references an unknown bus or
    /// conductor, a line closes on itself, or a conductor spec violates its
    /// physical invariants.
    pub fn new(
        buses: Vec<Bus>,
        lines: Vec<TransmissionLine>,
        conductors: Vec<ConductorSpec>,
    ) -> DlrResult<Self> {
        let mut conductor_map = HashMap::with_capacity(conductors.len());
        for spec in conductors {
            spec.validate()?;
            if conductor_map.insert(spec.name.clone(), spec.clone()).is_some() {
                return Err(DlrError::Validation(format!(
                    "duplicate conductor '{}'",
                    spec.name
                )));
            }
        }

        let mut graph = Graph::new_undirected();
        let mut bus_index = HashMap::with_capacity(buses.len());
        for bus in buses {
            let id = bus.id.clone();
            if bus_index.contains_key(&id) {
                return Err(DlrError::Validation(format!("duplicate bus '{}'", id)));
            }
            let node = graph.add_node(bus);
            bus_index.insert(id, node);
        }

        let mut line_index = HashMap::with_capacity(lines.len());
        for line in lines {
            let id = line.id.clone();
            if line_index.contains_key(&id) {
                return Err(DlrError::Validation(format!("duplicate line '{}'", id)));
            }
            let from = *bus_index.get(&line.from_bus).ok_or_else(|| {
                DlrError::Network(format!(
                    "line '{}' references unknown bus '{}'",
                    id, line.from_bus
                ))
            })?;
            let to = *bus_index.get(&line.to_bus).ok_or_else(|| {
                DlrError::Network(format!(
                    "line '{}' references unknown bus '{}'",
                    id, line.to_bus
                ))
            })?;
            if from == to {
                return Err(DlrError::Network(format!(
                    "line '{}' connects bus '{}' to itself",
                    id, line.from_bus
                )));
            }
            if !conductor_map.contains_key(&line.conductor) {
                return Err(DlrError::Network(format!(
                    "line '{}' references unknown conductor '{}'",
                    id, line.conductor
                )));
            }
            let edge = graph.add_edge(from, to, line);
            line_index.insert(id, edge);
        }

        Ok(Self {
            graph,
            conductors: conductor_map,
            bus_index,
            line_index,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Look up a bus by id.
    pub fn bus(&self, id: &BusId) -> Option<&Bus> {
        self.bus_index.get(id).map(|node| &self.graph[*node])
    }

    /// Look up a line by id.
    pub fn line(&self, id: &LineId) -> Option<&TransmissionLine> {
        self.line_index
            .get(id)
            .and_then(|edge| self.graph.edge_weight(*edge))
    }

    /// Look up a conductor spec by catalog name.
    pub fn conductor(&self, name: &str) -> Option<&ConductorSpec> {
        self.conductors.get(name)
    }

    /// Conductor spec assigned to a line.
    ///
    /// Always `Some` for lines that came through [`GridModel::new`].
    pub fn conductor_for(&self, line: &TransmissionLine) -> Option<&ConductorSpec> {
        self.conductors.get(&line.conductor)
    }

    /// Operating voltage of a line, taken from its from-bus.
    pub fn line_voltage(&self, line: &TransmissionLine) -> Option<Kilovolts> {
        self.bus(&line.from_bus).map(|bus| bus.nominal_voltage)
    }

    /// All buses, in insertion order.
    pub fn buses(&self) -> Vec<&Bus> {
        self.graph.node_weights().collect()
    }

    /// All lines, in insertion order.
    pub fn lines(&self) -> Vec<&TransmissionLine> {
        self.graph.edge_weights().collect()
    }

    /// All conductor specs, sorted by name.
    pub fn conductors(&self) -> Vec<&ConductorSpec> {
        let mut specs: Vec<&ConductorSpec> = self.conductors.values().collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// All line ids in ascending order.
    ///
    /// This is the canonical enumeration order for outage batches, which
    /// keeps screening output deterministic regardless of file order or
    /// parallel scheduling.
    pub fn line_ids(&self) -> Vec<LineId> {
        let mut ids: Vec<LineId> = self.line_index.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of buses.
    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the intact network forms a single island.
    pub fn is_connected(&self) -> bool {
        self.graph.node_count() == 0 || petgraph::algo::connected_components(&self.graph) == 1
    }

    /// Summary statistics for display and logging.
    pub fn stats(&self) -> GridStats {
        let mut voltage_levels: Vec<f64> = self
            .graph
            .node_weights()
            .map(|bus| bus.nominal_voltage.value())
            .collect();
        voltage_levels.sort_by(f64::total_cmp);
        voltage_levels.dedup();

        let total_nominal_mw: Megawatts = self
            .graph
            .edge_weights()
            .map(|line| line.nominal_flow.abs())
            .sum();

        GridStats {
            buses: self.graph.node_count(),
            lines: self.graph.edge_count(),
            conductors: self.conductors.len(),
            voltage_levels,
            total_nominal_mw,
            connected: self.is_connected(),
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Run soft data-quality checks, appending findings to `diag`.
    ///
    /// Hard referential problems never get this far; construction rejects
    /// them. These checks flag data that will degrade results: lines whose
    /// ratings can never be computed, non-finite flows, isolated buses.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        if self.graph.edge_count() == 0 {
            diag.add_warning("validation", "grid has no transmission lines");
        }

        for node in self.graph.node_indices() {
            if self.graph.edges(node).next().is_none() {
                diag.add_validation_warning(
                    self.graph[node].id.as_str(),
                    "bus has no connected lines",
                );
            }
        }

        for line in self.graph.edge_weights() {
            if !line.nominal_flow.is_finite() {
                diag.add_error_with_entity(
                    "validation",
                    "nominal flow is not finite",
                    line.id.as_str(),
                );
            }
            if line.max_operating_temp < ConductorSpec::LOW_REF {
                diag.add_validation_warning(
                    line.id.as_str(),
                    "max operating temperature is below the resistance reference range; \
                     ratings will be unavailable",
                );
            }
            if line.reactance == 0.0 {
                diag.add_validation_warning(
                    line.id.as_str(),
                    "zero series reactance will be clamped during redistribution solves",
                );
            }
        }
    }

    /// Convenience wrapper around [`GridModel::validate_into`].
    pub fn validate(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();
        self.validate_into(&mut diag);
        diag
    }
}

/// Headline numbers describing a grid model.
#[derive(Debug, Clone, Serialize)]
pub struct GridStats {
    pub buses: usize,
    pub lines: usize,
    pub conductors: usize,
    /// Distinct bus nominal voltages, ascending, in kV
    pub voltage_levels: Vec<f64>,
    /// Sum of absolute nominal flows
    pub total_nominal_mw: Megawatts,
    pub connected: bool,
}

impl std::fmt::Display for GridStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} buses, {} lines, {} conductor types | {} voltage level{} | {:.1} MW nominal | {}",
            self.buses,
            self.lines,
            self.conductors,
            self.voltage_levels.len(),
            if self.voltage_levels.len() == 1 { "" } else { "s" },
            self.total_nominal_mw.value(),
            if self.connected { "connected" } else { "islanded" }
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
