//! Customer-count trace files
//!
//! A trace is plain text with one non-negative integer per line: the number
//! of customers in the system recorded at each simulation step. Traces are
//! written for downstream rate-estimation tools.
//!
//! Parsing is strict. Each line is trimmed, and any line that is not a
//! non-negative integer (blank lines included) fails the whole parse.
//!
//! # Example
//!
//! ```
//! use queue_simulator_core_rs::trace::{format_trace, parse_trace, TraceError};
//!
//! let text = format_trace(&[1, 2, 1, 0]);
//! assert_eq!(text, "1\n2\n1\n0\n");
//! assert_eq!(parse_trace(" 3 \n4\n").unwrap(), vec![3, 4]);
//!
//! assert!(matches!(
//!     parse_trace("1\n-2\n"),
//!     Err(TraceError::Parse { line: 2, .. })
//! ));
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors from reading or writing trace files
#[derive(Debug, Error)]
pub enum TraceError {
    /// A line was not a non-negative integer (1-based line number)
    #[error("Malformed trace line {line}: {content:?}")]
    Parse { line: usize, content: String },

    #[error("Trace I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Parse trace text into customer counts
pub fn parse_trace(text: &str) -> Result<Vec<u64>, TraceError> {
    text.lines()
        .enumerate()
        .map(|(index, raw)| {
            raw.trim().parse::<u64>().map_err(|_| TraceError::Parse {
                line: index + 1,
                content: raw.to_string(),
            })
        })
        .collect()
}

/// Render customer counts as trace text, one per line
pub fn format_trace(counts: &[u64]) -> String {
    let mut text = String::with_capacity(counts.len() * 3);
    for count in counts {
        // Writing to a String cannot fail
        let _ = writeln!(text, "{}", count);
    }
    text
}

/// Read and parse a trace file
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<u64>, TraceError> {
    let text = fs::read_to_string(path)?;
    parse_trace(&text)
}

/// Write customer counts to a trace file, replacing any existing file
pub fn write_trace(path: impl AsRef<Path>, counts: &[u64]) -> Result<(), TraceError> {
    fs::write(path, format_trace(counts))?;
    Ok(())
}
