//! Conversion of engine stack trace text into [`StackFrame`]s.
//!
//! The engine renders a failure as one message line followed by one
//! `    at ...` line per frame. Each frame line is tried against an ordered
//! list of grammars and the first match wins:
//!
//! 1. `at [new ]FUNC (FILE[:ROW[:COL]])`
//! 2. `at [new ]FUNC (FILE)`
//! 3. `at FILE[:ROW[:COL]]`
//!
//! A non-empty line that matches none of them aborts the conversion with
//! [`Error::ParseInconsistency`]. So does a row or column too large for a
//! `u64`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::source::StackFrame;

static FRAME_WITH_POSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+at\s(?:new\s)?(?P<func>.+)\s\((?P<file>[^:]+):?(?P<row>\d+)?:?(?P<col>\d+)?\)")
        .expect("frame-with-position pattern is valid")
});

static FRAME_WITH_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+at\s(?:new\s)?(?P<func>.+)\s\((?P<file>[^\)]+)\)")
        .expect("frame-with-file pattern is valid")
});

static FILE_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+at\s(?P<file>[^:]+):?(?P<row>\d+)?:?(?P<col>\d+)?")
        .expect("file-only pattern is valid")
});

/// Which parts of a frame a grammar captures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameShape {
    /// Function, file and optional position
    FunctionAndPosition,
    /// Function and file, never a position
    FunctionAndFile,
    /// File and optional position, no function
    FileAndPosition,
}

/// Ordered, first-match-wins grammar list
static GRAMMARS: [(&LazyLock<Regex>, FrameShape); 3] = [
    (&FRAME_WITH_POSITION, FrameShape::FunctionAndPosition),
    (&FRAME_WITH_FILE, FrameShape::FunctionAndFile),
    (&FILE_ONLY, FrameShape::FileAndPosition),
];

/// Parser for engine-rendered stack trace text.
///
/// # Examples
///
/// ```
/// use core_types::{StackFrame, StackTraceParser};
///
/// let frames = StackTraceParser::parse("Error: boom\n    at foo (bar.js:10:5)").unwrap();
/// assert_eq!(frames, vec![StackFrame::new(Some("foo"), Some("bar.js"), Some(10), Some(5))]);
/// ```
pub struct StackTraceParser;

impl StackTraceParser {
    /// Parse a full trace. The first line is the error message and is
    /// discarded; empty lines are skipped.
    pub fn parse(text: &str) -> Result<Vec<StackFrame>> {
        let mut frames = Vec::new();

        for (index, raw) in text.split('\n').enumerate().skip(1) {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                continue;
            }

            match Self::parse_line(line, index + 1)? {
                Some(frame) => frames.push(frame),
                None => {
                    return Err(Error::ParseInconsistency {
                        line_number: index + 1,
                        line: line.to_string(),
                    })
                }
            }
        }

        Ok(frames)
    }

    /// Parse a single frame line. `Ok(None)` means no grammar matched.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Option<StackFrame>> {
        for (grammar, shape) in GRAMMARS.iter() {
            if let Some(caps) = grammar.captures(line) {
                return build_frame(&caps, *shape, line, line_number).map(Some);
            }
        }
        Ok(None)
    }
}

fn build_frame(
    caps: &Captures<'_>,
    shape: FrameShape,
    line: &str,
    line_number: usize,
) -> Result<StackFrame> {
    let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
    let number = |name: &str| -> Result<Option<u64>> {
        match caps.name(name) {
            None => Ok(None),
            Some(m) => m
                .as_str()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| Error::ParseInconsistency {
                    line_number,
                    line: line.to_string(),
                }),
        }
    };

    let frame = match shape {
        FrameShape::FunctionAndPosition => StackFrame {
            function_name: text("func"),
            file_name: text("file"),
            line: number("row")?,
            column: number("col")?,
        },
        FrameShape::FunctionAndFile => StackFrame {
            function_name: text("func"),
            file_name: text("file"),
            line: None,
            column: None,
        },
        FrameShape::FileAndPosition => StackFrame {
            function_name: None,
            file_name: text("file"),
            line: number("row")?,
            column: number("col")?,
        },
    };

    Ok(frame)
}
