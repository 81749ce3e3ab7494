//! Error types for the verification harness.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that abort a generation or verification run.
///
/// Mismatching determinants are not errors: they are reported as failing
/// [`crate::VerificationResult`] values.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A configuration value is out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A numeric kind token was not recognized.
    #[error("Unknown numeric kind '{token}'. Expected one of: int, float, double")]
    UnknownKind { token: String },

    /// Rows of different lengths, or a row count different from the column count.
    #[error("Matrix is not square: {rows} rows, row {row} has {len} elements")]
    NotSquare { rows: usize, row: usize, len: usize },

    /// Matrices must have at least one element.
    #[error("Matrix has no elements")]
    EmptyMatrix,

    /// Driver executable could not be located.
    #[error("Driver executable not found: {}", path.display())]
    DriverNotFound { path: PathBuf },

    /// Driver executable exists but could not be started.
    #[error("Failed to launch driver {}: {source}", program.display())]
    LaunchFailed {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tolerance configuration could not be parsed.
    #[error("Failed to parse tolerance config: {0}")]
    ToleranceConfig(#[source] serde_json::Error),

    /// IO error outside of a driver exchange.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Stable identifier for this error, suitable for scripting.
    pub fn code(&self) -> &'static str {
        match self {
            HarnessError::InvalidArgument { .. } => "HWMX_001",
            HarnessError::UnknownKind { .. } => "HWMX_002",
            HarnessError::NotSquare { .. } => "HWMX_003",
            HarnessError::EmptyMatrix => "HWMX_004",
            HarnessError::DriverNotFound { .. } => "HWMX_005",
            HarnessError::LaunchFailed { .. } => "HWMX_006",
            HarnessError::ToleranceConfig(_) => "HWMX_007",
            HarnessError::Io(_) => "HWMX_008",
        }
    }

    /// True for errors caused by bad user-supplied configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HarnessError::InvalidArgument { .. }
                | HarnessError::UnknownKind { .. }
                | HarnessError::ToleranceConfig(_)
        )
    }
}
