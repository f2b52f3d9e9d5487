//! # dlr-io: Grid Dataset Import
//!
//! Loads a [`dlr_core::GridModel`] from a directory of CSV tables, the
//! layout produced by planning-tool exports.
//!
//! ## Expected Directory Layout
//!
//! | File | Contents | Required columns |
//! |------|----------|------------------|
//! | `buses.csv` | Substation buses | `name`, `v_nom` |
//! | `lines.csv` | Transmission lines | `name`, `branch_name`, `bus0`, `bus1`, `conductor`, `MOT`, `x` |
//! | `conductors.csv` | Conductor catalog | `ConductorName`, `RES_25C`, `RES_50C`, `CDRAD_in` |
//! | `flows.csv` | Nominal operating point | `name`, `p0_nominal` |
//!
//! Extra columns are ignored, so raw planning exports load without
//! trimming.
//!
//! ## Error Policy
//!
//! Structural problems are fatal: unreadable files, malformed rows, and
//! lines referencing unknown buses or conductors all return an error.
//! Recoverable gaps (a line without a flow record or reactance) are
//! defaulted and reported through [`dlr_core::diagnostics::ImportDiagnostics`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dlr_io::load_grid;
//!
//! fn main() -> dlr_core::DlrResult<()> {
//!     let (grid, diagnostics) = load_grid("data/hawaii40")?;
//!     println!("{}", diagnostics.summary());
//!     println!("{}", grid.stats());
//!     Ok(())
//! }
//! ```

pub mod loader;
pub mod tables;

pub use loader::{load_grid, BUSES_FILE, CONDUCTORS_FILE, FLOWS_FILE, LINES_FILE};
pub use tables::{BusRow, ConductorRow, FlowRow, LineRow};
