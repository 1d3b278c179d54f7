//! Stack trace conversion CLI library
//!
//! Provides the argument definition and the trace-to-JSON conversion used
//! by the `bridge-trace` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod trace;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use trace::{read_input, TraceReport};
