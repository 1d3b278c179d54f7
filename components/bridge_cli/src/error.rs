//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading the input failed
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),

    /// The trace text could not be converted
    #[error(transparent)]
    Trace(#[from] core_types::Error),

    /// Serializing the report failed
    #[error("could not serialize frames: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Trace(core_types::Error::ParseInconsistency { .. }) => 2,
            _ => 1,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
