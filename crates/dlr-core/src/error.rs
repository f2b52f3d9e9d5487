use thiserror::Error;

/// Unified error type for thermal screening operations.
///
/// Fatal conditions (broken input files, unresolved references, solver
/// misconfiguration) surface through this type. Per-scenario and per-line
/// failures that the engine is expected to survive are modelled separately
/// as values, not errors.
#[derive(Error, Debug)]
pub enum DlrError {
    /// I/O errors from file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors parsing input data (CSV, JSON, TOML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Power-flow solver errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Grid topology errors (unknown buses, dangling lines)
    #[error("Network error: {0}")]
    Network(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Convenience result alias used throughout the workspace.
pub type DlrResult<T> = Result<T, DlrError>;

impl From<anyhow::Error> for DlrError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain, not just the outermost message
        DlrError::Other(format!("{:#}", err))
    }
}

impl From<String> for DlrError {
    fn from(msg: String) -> Self {
        DlrError::Other(msg)
    }
}

impl From<&str> for DlrError {
    fn from(msg: &str) -> Self {
        DlrError::Other(msg.to_string())
    }
}

impl From<serde_json::Error> for DlrError {
    fn from(err: serde_json::Error) -> Self {
        DlrError::Parse(err.to_string())
    }
}
