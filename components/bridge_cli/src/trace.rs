//! Trace text to JSON conversion

use std::io::Read;
use std::path::Path;

use core_types::{StackFrame, StackTraceParser};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CliResult;

/// Parsed form of one stack trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceReport {
    /// The leading error message line
    pub message: String,
    /// Frames, innermost first
    pub frames: Vec<StackFrame>,
}

impl TraceReport {
    /// Parse trace text.
    ///
    /// ```
    /// use bridge_cli::TraceReport;
    ///
    /// let report = TraceReport::parse("Error: boom\n    at foo (bar.js:10:5)").unwrap();
    /// assert_eq!(report.message, "Error: boom");
    /// assert_eq!(report.frames[0].line, Some(10));
    /// ```
    pub fn parse(text: &str) -> CliResult<Self> {
        let message = text
            .lines()
            .next()
            .unwrap_or_default()
            .trim_end_matches('\r')
            .to_string();
        let frames = StackTraceParser::parse(text)?;
        debug!(frames = frames.len(), "parsed stack trace");
        Ok(Self { message, frames })
    }

    /// Render as JSON
    pub fn to_json(&self, pretty: bool) -> CliResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Read trace text from `file`, or from standard input when absent
pub fn read_input(file: Option<&Path>) -> CliResult<String> {
    match file {
        Some(path) => {
            info!(path = %path.display(), "reading trace file");
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            info!("reading trace from standard input");
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
