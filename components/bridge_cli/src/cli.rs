//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

/// Convert script engine stack trace text into JSON frames
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "bridge-trace")]
#[command(version, long_about = None)]
pub struct Cli {
    /// File holding the trace text; standard input when omitted
    pub file: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pub pretty: bool,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter matching the verbosity flag
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
