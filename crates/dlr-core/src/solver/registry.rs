use std::sync::Arc;

use anyhow::{anyhow, Result};

use super::backend::{FaerSolver, GaussSolver, LinearSystemBackend};

/// Selectable linear system backends.
///
/// The CLI exposes this through `--backend`; library callers can construct
/// backends directly if they need something custom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// Gauss-Jordan elimination (no external dependencies)
    #[default]
    Gauss,
    /// Dense LU via faer
    Faer,
}

impl SolverKind {
    /// Parse a solver name as given on the command line.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gauss" | "default" => Ok(SolverKind::Gauss),
            "faer" => Ok(SolverKind::Faer),
            other => Err(anyhow!(
                "unknown solver '{}' (supported: {})",
                other,
                SolverKind::available().join(", ")
            )),
        }
    }

    /// Instantiate the backend behind a shared handle.
    pub fn build(self) -> Arc<dyn LinearSystemBackend> {
        match self {
            SolverKind::Gauss => Arc::new(GaussSolver),
            SolverKind::Faer => Arc::new(FaerSolver),
        }
    }

    /// Names accepted by [`SolverKind::parse`].
    pub fn available() -> Vec<&'static str> {
        vec!["gauss", "faer"]
    }

    /// Canonical name for display.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverKind::Gauss => "gauss",
            SolverKind::Faer => "faer",
        }
    }
}

impl std::fmt::Display for SolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
